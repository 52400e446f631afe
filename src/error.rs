//! Error types for the presence analyzer
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::cache::EncodeError;
use crate::data::UserId;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache layer itself.
///
/// Producer failures are never wrapped in this type; they travel through the
/// cache in the producer's own error type.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend does not implement the named operation
    #[error("Operation not implemented by this cache backend: {0}")]
    NotImplemented(&'static str),

    /// Call arguments could not be encoded into a cache key
    #[error("Failed to encode cache key: {0}")]
    KeyEncoding(#[source] EncodeError),
}

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// == Presence Error Enum ==
/// Application error type, returned by loaders and HTTP handlers.
#[derive(Error, Debug)]
pub enum PresenceError {
    /// No presence data for the requested user
    #[error("User not found")]
    UserNotFound(UserId),

    /// Input file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Presence CSV could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Users XML is malformed or incomplete
    #[error("Invalid user data: {0}")]
    InvalidUserData(String),

    /// Cache layer failure
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PresenceError {
    /// HTTP status matching this error.
    pub fn status(&self) -> StatusCode {
        match self {
            PresenceError::UserNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to clients. Server errors only get a generic message,
    /// since their details name local files.
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for PresenceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the presence analyzer.
pub type Result<T> = std::result::Result<T, PresenceError>;
