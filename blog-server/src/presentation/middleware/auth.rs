//! Bearer-token identity. Read routes take [`CurrentViewer`], which falls back
//! to an anonymous viewer; mutation routes sit behind [`require_login`].

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domain::visibility::Viewer;
use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
}

impl AuthenticatedUser {
    pub(crate) fn viewer(&self) -> Viewer {
        Viewer::Authenticated {
            user_id: self.user_id,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::LoginRequired {
                next: Some(parts.uri.path().to_string()),
            })
    }
}

/// Viewer of a read route. A missing, malformed or expired token is an
/// anonymous viewer, never an error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CurrentViewer(pub(crate) Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(CurrentViewer(user.viewer()));
        }

        let viewer = match bearer_token(&parts.headers) {
            Some(token) => match authenticate(&state.jwt, token) {
                Some(user) => user.viewer(),
                None => {
                    debug!("ignoring unusable bearer token on read route");
                    Viewer::Anonymous
                }
            },
            None => Viewer::Anonymous,
        };
        Ok(CurrentViewer(viewer))
    }
}

pub(crate) async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = bearer_token(request.headers())
        .and_then(|token| authenticate(&state.jwt, token))
        .ok_or_else(|| AppError::LoginRequired {
            next: Some(request.uri().path().to_string()),
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn authenticate(jwt: &JwtService, token: &str) -> Option<AuthenticatedUser> {
    let claims = jwt.verify_token(token).ok()?;
    Some(AuthenticatedUser {
        user_id: claims.user_id,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
