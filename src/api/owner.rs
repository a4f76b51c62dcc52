use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

pub const OWNER_HEADER: &str = "x-owner-id";

/// Timetable owner, supplied by the authentication layer in front of the
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner(pub String);

impl<S> FromRequestParts<S> for Owner
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let owner = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", OWNER_HEADER)))?;
        Ok(Owner(owner.to_string()))
    }
}
