use crate::directory::{AuthedUser, Directory, DirectoryError};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// Extracts the bearer token from the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

/// Resolves the calling session to its user.
///
/// An absent or invalid token resolves to `None`; only a directory failure
/// is an error.
pub async fn resolve_session(
    directory: &dyn Directory,
    token: Option<&str>,
) -> Result<Option<AuthedUser>, DirectoryError> {
    match token {
        Some(token) => directory.user_from_token(token).await,
        None => Ok(None),
    }
}
