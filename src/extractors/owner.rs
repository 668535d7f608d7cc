//! Extract the owner id from the `X-User-ID` header.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const OWNER_ID_HEADER: &str = "X-User-ID";

/// Opaque owner id; every store call is scoped by it. Requests without the
/// header are rejected rather than served as some default user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(OWNER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s.len() <= 128)
            .map(OwnerId)
            .ok_or_else(|| AppError::BadRequest(format!("missing or invalid {} header", OWNER_ID_HEADER)))
    }
}
