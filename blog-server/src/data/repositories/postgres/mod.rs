pub(crate) mod catalog_repository;
pub(crate) mod comment_repository;
pub(crate) mod post_repository;
pub(crate) mod user_repository;


/// Postgres SQLSTATE for `foreign_key_violation`.
pub(crate) const FOREIGN_KEY_VIOLATION: &str = "23503";
/// Postgres SQLSTATE for `unique_violation`.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
