//! Request-level error taxonomy for triage.

use actions_client::{truncate_body, ClientError, MAX_ERROR_BODY_CHARS};

/// Triage errors.
///
/// "No failed runs" is not here: it is a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriageError {
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("{}", transport_message(.status, .body))]
    Transport { status: Option<u16>, body: String },

    #[error("only {found} failed run(s) found, but #{requested} was requested")]
    InsufficientRuns { found: usize, requested: u32 },

    #[error("log archive is empty, nothing to analyze")]
    EmptyArchive,

    #[error("log archive could not be read: {0}")]
    CorruptArchive(String),

    #[error("invalid run selector: {0}")]
    InvalidSelector(String),

    #[error("internal error: {0}")]
    Internal(String),
}

fn transport_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("GitHub API error (HTTP {}): {}", code, body),
        None => format!("GitHub API unreachable: {}", body),
    }
}

impl TriageError {
    /// Build an internal error with a bounded message.
    pub fn internal(message: impl AsRef<str>) -> Self {
        TriageError::Internal(truncate_body(message.as_ref(), MAX_ERROR_BODY_CHARS))
    }

    /// Conditions that mean "nothing to analyze" rather than a failure to reach GitHub.
    pub fn is_nothing_to_analyze(&self) -> bool {
        matches!(self, TriageError::EmptyArchive | TriageError::CorruptArchive(_))
    }
}

impl From<ClientError> for TriageError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::MissingToken => {
                TriageError::MissingConfiguration("GitHub token (GITHUB_TOKEN)".to_string())
            }
            ClientError::InvalidBaseUrl(url) => {
                TriageError::MissingConfiguration(format!("valid API base URL ({})", url))
            }
            ClientError::InvalidIdentifier(ident) => TriageError::MissingConfiguration(format!(
                "usable repository owner and name (got {:?})",
                ident
            )),
            ClientError::Setup(msg) => TriageError::internal(msg),
            ClientError::Transport { status, body } => TriageError::Transport { status, body },
        }
    }
}

/// Result type for triage operations.
pub type Result<T> = std::result::Result<T, TriageError>;
