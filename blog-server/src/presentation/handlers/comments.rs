use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::comment::{Comment, CommentForm};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppError, AppResult, JsonBody};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CommentFormDto {
    #[serde(default)]
    pub(crate) text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) text: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            author_username: comment.author_username,
            text: comment.text,
            created_at: comment.created_at,
        }
    }
}

impl From<CommentFormDto> for CommentForm {
    fn from(dto: CommentFormDto) -> Self {
        Self { text: dto.text }
    }
}

#[utoipa::path(
    post,
    path = "/posts/{id}/comment",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 201, description = "Comment added", body = CommentDto),
        (status = 303, description = "Login required"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Post missing or not visible"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    JsonBody(dto): JsonBody<CommentFormDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = state
        .comment_service
        .add_comment(auth.viewer(), post_id, dto.into())
        .await?;
    Ok((StatusCode::CREATED, Json(comment.into())))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/edit_comment/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    request_body = CommentFormDto,
    responses(
        (status = 200, description = "Comment updated", body = CommentDto),
        (status = 303, description = "Not the author (to post detail) or login required"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Comment not found on this post"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    body: Result<JsonBody<CommentFormDto>, AppError>,
) -> AppResult<Json<CommentDto>> {
    let dto = match body {
        Ok(JsonBody(dto)) => dto,
        Err(rejection) => {
            state
                .comment_service
                .ensure_author(auth.viewer(), post_id, comment_id)
                .await?;
            return Err(rejection);
        }
    };

    let comment = state
        .comment_service
        .update_comment(auth.viewer(), post_id, comment_id, dto.into())
        .await?;
    Ok(Json(comment.into()))
}

#[utoipa::path(
    post,
    path = "/posts/{id}/delete_comment/{comment_id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id"),
        ("comment_id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 303, description = "Not the author (to post detail) or login required"),
        (status = 404, description = "Comment not found on this post"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete_comment(auth.viewer(), post_id, comment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
