//! Bearer-token authentication extractor.

use super::{ApiError, AppState, TaskStorage};
use crate::identity::AuthenticatedCaller;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// Authenticated caller extracted from the `Authorization` header.
///
/// Requests without a known bearer token are rejected with `401` before
/// any handler runs.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub AuthenticatedCaller);

impl<R: TaskStorage> FromRequestParts<AppState<R>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("authentication credentials were not provided"))?;
        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("expected a bearer token"))?;

        state
            .identity()
            .authenticate(token)
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("invalid token"))
    }
}
