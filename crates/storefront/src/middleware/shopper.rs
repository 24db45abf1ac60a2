//! Shopper identity extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use easy_kart_core::UserId;

use crate::error::{AppError, set_sentry_user};

/// The HTTP header carrying the shopper's user id.
pub const SHOPPER_HEADER: &str = "x-user-id";

/// Extractor that requires an identified shopper.
///
/// Rejects with `401 Unauthorized` when the `x-user-id` header is missing,
/// blank or not valid UTF-8.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(Shopper(user): Shopper) -> impl IntoResponse {
///     format!("Hello, {user}!")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Shopper(pub UserId);

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(SHOPPER_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::new)
            .ok_or_else(|| AppError::Unauthorized("missing shopper id".to_string()))?;

        tracing::Span::current().record("user_id", user.as_str());
        set_sentry_user(&user);

        Ok(Self(user))
    }
}
