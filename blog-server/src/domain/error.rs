use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    /// Authenticated viewer is not the author. Carries the post whose detail
    /// view the viewer is sent back to.
    #[error("only the author may change this resource (post id: {post_id})")]
    NotAuthor { post_id: i64 },

    #[error("authentication required")]
    LoginRequired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
