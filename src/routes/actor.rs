use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::constants::ACTOR_HEADER;
use crate::error::AppError;

/// Authenticated caller, taken from the header set by the upstream auth layer
///
/// Rejects the request with 401 when the header is missing or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub u64);

/// Caller identity for endpoints that also serve anonymous users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeActor(pub Option<u64>);

fn actor_from_parts(parts: &Parts) -> Result<Option<u64>, AppError> {
    let Some(value) = parts.headers.get(ACTOR_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| {
            tracing::warn!("Malformed {} header", ACTOR_HEADER);
            AppError::Unauthorized
        })
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_parts(parts)?
            .map(Actor)
            .ok_or(AppError::Unauthorized)
    }
}

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeActor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(actor_from_parts(parts)?))
    }
}
