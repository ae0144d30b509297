//! Shared primitives for all Rust crates in Eventdesk.

#![forbid(unsafe_code)]

/// Caller identity primitives shared across services.
pub mod auth;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::CallerIdentity;

/// Result type used across Eventdesk crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Externally addressable event identifier.
///
/// Twenty characters drawn from the URL-safe base64 alphabet. The internal
/// database id never leaves the persistence layer; every API operation
/// addresses events by this key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey(String);

/// Required length of an [`EventKey`].
pub const EVENT_KEY_LENGTH: usize = 20;

impl EventKey {
    /// Creates a validated event key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.len() != EVENT_KEY_LENGTH {
            return Err(AppError::Validation(format!(
                "event key must be exactly {EVENT_KEY_LENGTH} characters"
            )));
        }

        if !value
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
        {
            return Err(AppError::Validation(
                "event key must use the URL-safe base64 alphabet".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EventKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist (or is not visible to the caller).
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated or lacks a required permission.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Bearer token payload could not be decoded into a claim set.
    #[error("claim decoding error: {0}")]
    ClaimDecoding(String),

    /// Identity provider call failed; the gated request must fail closed.
    #[error("upstream authority error: {0}")]
    UpstreamAuthority(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
