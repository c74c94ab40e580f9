/// Requesting-user extraction
///
/// Token issuance and verification happen upstream; by the time a request
/// reaches this server the authenticated user ID travels in `X-User-Id`.
use crate::error::ServerError;
use axum::{extract::FromRequestParts, http::request::Parts};
use cadence_core::UserId;

/// Header carrying the authenticated user ID
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user, usable as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ServerError::Auth("Missing X-User-Id header".to_string()))?;

        Ok(AuthenticatedUser(UserId::new(user_id)))
    }
}
