use axum::Router;

use super::AppState;

pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod posts;
pub(crate) mod profile;

/// Protected routes keep their full paths (no `nest`) so the login redirect
/// can point back at the original request path.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(posts::router(state.clone()))
        .merge(profile::router(state))
        .merge(catalog::router())
}
