use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::handlers::catalog::{list_categories, list_locations};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/locations", get(list_locations))
}
