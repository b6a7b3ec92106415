use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Characters of an unparseable body kept for diagnostics.
const SNIPPET_CHARS: usize = 100;

const TRANSPORT_MESSAGE: &str = "Unable to reach the CV service. Please try again.";

/// Failure of a single remote call.
///
/// Transport failures carry only a generic user message; the other variants
/// carry a message suitable for display.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("request rejected: {message}")]
    Rejected { message: String },

    #[error("malformed response: {snippet}")]
    Malformed { snippet: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

impl ApiError {
    /// Builds a `Malformed` error from the raw body text.
    pub fn malformed(raw: &str) -> Self {
        ApiError::Malformed {
            snippet: snippet(raw),
        }
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => TRANSPORT_MESSAGE.to_string(),
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Rejected { message } => message.clone(),
            ApiError::Malformed { snippet } => {
                format!("Failed to parse server response: {snippet}")
            }
            ApiError::InvalidRequest(message) => message.clone(),
        }
    }
}

fn snippet(raw: &str) -> String {
    let head: String = raw.chars().take(SNIPPET_CHARS).collect();
    format!("{head}...")
}

/// Result shape handed to views and browser clients.
/// Remote failures never escape as errors; they become `success: false`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActionResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResult<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Converts a remote outcome, logging the failure at the call site.
    pub fn from_result(result: Result<T, ApiError>, success_message: &str, action: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data, success_message),
            Err(e) => {
                warn!("{action} failed: {e}");
                Self::failed(e.user_message())
            }
        }
    }
}
