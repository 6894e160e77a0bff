//! Caller identity
//!
//! Authentication happens in the gateway in front of this service, which
//! forwards the authenticated user id in the `x-user-id` header. Reads work
//! anonymously; mutations take [`CurrentUser`] and are refused with 401 when
//! the header is absent.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::error::ApiError;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

fn header_user_id(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Authenticated caller; rejects the request when missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_user_id(parts)
            .map(CurrentUser)
            .ok_or_else(|| ApiError::Unauthorized("Sign in required".to_string()))
    }
}

/// Caller if known; used by reads that personalise their answer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaybeUser(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(header_user_id(parts)))
    }
}

impl MaybeUser {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}
