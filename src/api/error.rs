use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the server supplied `detail` when
    /// present, otherwise a generic message with the status code.
    #[error("{message}")]
    Status {
        status: StatusCode,
        message: String,
        detail: Option<String>,
    },

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Builds the error for a failed response from its status and raw body.
    ///
    /// The body is read as JSON (an empty object when that fails); the
    /// message is taken from `detail`, then `error`, then a generic fallback.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let parsed: Value =
            serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Default::default()));
        let detail = parsed
            .get("detail")
            .and_then(Value::as_str)
            .or_else(|| parsed.get("error").and_then(Value::as_str))
            .map(str::to_string);
        let message = detail
            .clone()
            .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
        ApiError::Status {
            status,
            message,
            detail,
        }
    }

    /// The message the server sent, if the failure carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
