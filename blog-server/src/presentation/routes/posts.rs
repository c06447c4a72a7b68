use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{add_comment, delete_comment, update_comment};
use crate::presentation::handlers::posts::{
    category_feed, create_post, delete_post, get_post, home_feed, update_post,
};
use crate::presentation::middleware::auth::require_login;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(home_feed))
        .route("/posts/{id}", get(get_post))
        .route("/category/{slug}", get(category_feed));

    let protected = Router::new()
        .route("/posts/create", post(create_post))
        .route("/posts/{id}/edit", post(update_post))
        .route("/posts/{id}/delete", post(delete_post))
        .route("/posts/{id}/comment", post(add_comment))
        .route("/posts/{id}/edit_comment/{comment_id}", post(update_comment))
        .route(
            "/posts/{id}/delete_comment/{comment_id}",
            post(delete_comment),
        )
        .route_layer(middleware::from_fn_with_state(state, require_login));

    public.merge(protected)
}
