use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::profile::{get_profile, update_profile};
use crate::presentation::middleware::auth::require_login;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/profile/{username}", get(get_profile));

    let protected = Router::new()
        .route("/profile/edit", post(update_profile))
        .route_layer(middleware::from_fn_with_state(state, require_login));

    public.merge(protected)
}
