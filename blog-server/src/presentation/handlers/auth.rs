use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::{AppResult, JsonBody};

/// Missing fields read as empty, so they are reported by the field checks.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[serde(default)]
    #[validate(length(min = 3, max = 150))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(email)]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[serde(default)]
    #[validate(length(min = 1, max = 150))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub(crate) password: String,
    /// Path the login redirect was issued for.
    #[serde(default)]
    pub(crate) next: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct NextQuery {
    pub(crate) next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LoginPromptDto {
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) access_token: String,
    pub(crate) user: UserDto,
    /// Local path to continue at after logging in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) next: Option<String>,
}

impl AuthResponseDto {
    fn new(result: AuthResult, next: Option<String>) -> Self {
        Self {
            access_token: result.access_token,
            user: result.user.into(),
            next: local_path(next),
        }
    }
}

/// Keeps `next` only when it stays on this server: an absolute path, not a
/// scheme-relative `//host` one.
fn local_path(next: Option<String>) -> Option<String> {
    next.filter(|path| {
        path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
    })
}

/// Account as seen by its owner.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<RegisterDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(AuthResponseDto::new(result, None))))
}

#[utoipa::path(
    get,
    path = "/auth/login",
    tag = "auth",
    params(
        ("next" = Option<String>, Query, description = "Path that required the login")
    ),
    responses(
        (status = 200, description = "Where to send credentials", body = LoginPromptDto)
    )
)]
pub(crate) async fn login_prompt(Query(query): Query<NextQuery>) -> Json<LoginPromptDto> {
    Json(LoginPromptDto {
        message: "POST username and password to /auth/login".to_string(),
        next: local_path(query.next),
    })
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<LoginDto>,
) -> AppResult<Json<AuthResponseDto>> {
    dto.validate()?;

    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok(Json(AuthResponseDto::new(result, dto.next)))
}
