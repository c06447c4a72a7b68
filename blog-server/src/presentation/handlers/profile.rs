use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::auth::UserDto;
use super::posts::{FeedDto, PageQuery};
use crate::application::profile_service::ProfilePage;
use crate::domain::user::{ProfileForm, User};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, JsonBody};
use crate::presentation::middleware::auth::{AuthenticatedUser, CurrentViewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct ProfileFormDto {
    #[serde(default)]
    #[validate(length(min = 3, max = 150))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) last_name: String,
    #[serde(default)]
    #[validate(email)]
    pub(crate) email: String,
}

/// Public part of an account.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileUserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) user: ProfileUserDto,
    pub(crate) feed: FeedDto,
}

impl From<User> for ProfileUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

impl From<ProfilePage> for ProfileDto {
    fn from(page: ProfilePage) -> Self {
        Self {
            user: page.user.into(),
            feed: page.posts.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/profile/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<String>, Query, description = "Page number")
    ),
    responses(
        (status = 200, description = "Profile with the posts visible to the viewer", body = ProfileDto),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ProfileDto>> {
    let page = state
        .profile_service
        .profile(viewer, &username, query.request())
        .await?;
    Ok(Json(page.into()))
}

#[utoipa::path(
    post,
    path = "/profile/edit",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = ProfileFormDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 303, description = "Login required"),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<ProfileFormDto>,
) -> AppResult<Json<UserDto>> {
    dto.validate()?;

    let form = ProfileForm {
        username: dto.username,
        first_name: dto.first_name,
        last_name: dto.last_name,
        email: dto.email,
    };
    let user = state
        .profile_service
        .update_profile(auth.viewer(), form)
        .await?;
    Ok(Json(user.into()))
}
