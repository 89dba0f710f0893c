// Error model shared by the HTTP client, the auth flow and the action
// dispatcher. Nothing here triggers recovery: every variant is surfaced
// to the operator as a printed message.

use thiserror::Error;

/// Everything that can go wrong while talking to Scratch.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// No response was received (DNS, connect, TLS, body read).
    #[error("network error: {message}")]
    Network { message: String },

    /// A response arrived with a non-2xx status. The caller decides what
    /// it means.
    #[error("server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("CSRF token cookie was not set by the server")]
    CsrfMissing,

    #[error("login rejected: {}", .message.as_deref().unwrap_or("no token in response"))]
    InvalidCredentials { message: Option<String> },

    #[error("token rejected: {reason}")]
    InvalidToken { reason: String },

    /// Operator input was empty or malformed. Raised before any request.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The response parsed but lacked fields we need.
    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ScratchError {
    pub fn validation(message: impl Into<String>) -> Self {
        ScratchError::Validation(message.into())
    }

    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScratchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// True for failures that end the auth flow rather than a single action.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ScratchError::CsrfMissing
                | ScratchError::InvalidCredentials { .. }
                | ScratchError::InvalidToken { .. }
        )
    }
}

impl From<reqwest::Error> for ScratchError {
    fn from(error: reqwest::Error) -> Self {
        ScratchError::Network {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ScratchError {
    fn from(error: serde_json::Error) -> Self {
        ScratchError::Decode(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScratchError>;
