//! Gateway error types and their classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::endpoint::Endpoint;

/// Server error message for an exhausted split-hand queue.
pub const NO_MORE_SPLIT_HANDS: &str = "No more split hands.";

/// Message substituted when an error body is not JSON.
pub const NON_JSON_ERROR_MESSAGE: &str = "Unknown API response format (not JSON).";

/// Error payload as sent by the server. Every field is optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
    pub code: Option<Value>,
    pub details: Option<Value>,
    pub game_state_hint: Option<String>,
}

impl ErrorBody {
    /// Parses a raw error body, falling back to a generic message.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_else(|_| Self {
            message: Some(NON_JSON_ERROR_MESSAGE.to_string()),
            ..Self::default()
        })
    }
}

/// A non-2xx response, normalized to `{status, status_text, data}`.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub data: ErrorBody,
}

impl ApiError {
    #[must_use]
    pub fn new(status: u16, status_text: impl Into<String>, data: ErrorBody) -> Self {
        let status_text = status_text.into();
        Self {
            status,
            status_text: if status_text.is_empty() {
                "Unknown error".to_string()
            } else {
                status_text
            },
            data,
        }
    }

    /// The server's message, or one built from the status line.
    #[must_use]
    pub fn message(&self) -> String {
        self.data.message.clone().unwrap_or_else(|| {
            format!("HTTP error! Status: {} {}.", self.status, self.status_text)
        })
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.status == 401
    }

    /// The split queue is empty. Expected during split play, never logged.
    ///
    /// The server reports it under `error` or, when raised as a value error,
    /// under `message`.
    #[must_use]
    pub fn is_no_more_split_hands(&self) -> bool {
        self.status == 400
            && [&self.data.error, &self.data.message]
                .into_iter()
                .any(|text| text.as_deref() == Some(NO_MORE_SPLIT_HANDS))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.status)
    }
}

/// How the controller should react to a gateway failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// 4xx other than 401: the user may retry, the phase stays.
    Recoverable,
    /// 401 that survived the gateway's single re-initialization.
    SessionExpired,
    /// The split queue is empty.
    Benign,
    /// 5xx, network failure, malformed payload: the flow cannot continue.
    Fatal,
}

/// Errors returned by a gateway call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The server answered with a non-2xx status
    #[error("{endpoint}: {error}")]
    Http { endpoint: Endpoint, error: ApiError },

    /// The request never produced a response
    #[error("{endpoint}: network error: {message}")]
    Network { endpoint: Endpoint, message: String },

    /// The response did not match the expected schema
    #[error("{endpoint}: malformed response: {reason}")]
    Malformed { endpoint: Endpoint, reason: String },

    /// The local client identity could not be read or written
    #[error("client identity unavailable: {0}")]
    Identity(String),
}

impl GatewayError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Http { error, .. } if error.is_no_more_split_hands() => ErrorClass::Benign,
            Self::Http { error, .. } if error.is_session_expired() => ErrorClass::SessionExpired,
            Self::Http { error, .. } if (400..500).contains(&error.status) => {
                ErrorClass::Recoverable
            }
            _ => ErrorClass::Fatal,
        }
    }

    /// The HTTP status, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { error, .. } => Some(error.status),
            _ => None,
        }
    }
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;
