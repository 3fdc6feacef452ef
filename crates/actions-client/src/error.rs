//! Error types for actions-client

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error.
pub const MAX_ERROR_BODY_CHARS: usize = 1000;

/// Errors that can occur while talking to the Actions API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No bearer token was supplied
    #[error("GitHub token is not configured (set GITHUB_TOKEN)")]
    MissingToken,

    /// Base URL could not be parsed or cannot carry path segments
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// Owner or repository name that cannot be used as a path segment
    #[error("invalid repository identifier: {0:?}")]
    InvalidIdentifier(String),

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    /// Network failure, timeout, non-2xx response or undecodable payload
    #[error("{}", transport_message(.status, .body))]
    Transport { status: Option<u16>, body: String },
}

impl ClientError {
    /// Build a transport error, truncating the body.
    pub fn transport(status: Option<u16>, body: impl AsRef<str>) -> Self {
        ClientError::Transport {
            status,
            body: truncate_body(body.as_ref(), MAX_ERROR_BODY_CHARS),
        }
    }
}

fn transport_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("API request failed with HTTP {}: {}", code, body),
        None => format!("API request failed: {}", body),
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        let body = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        ClientError::transport(status, body)
    }
}

/// Truncate `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_body(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
