//! The one failure type every async boundary hands back to the UI.

use thiserror::Error;

use crate::query::ValidationError;

/// Result of any gateway or coordinator fetch.
pub type FetchResult<T> = Result<T, FetchError>;

/// Coarse classification of a failure, used for choosing how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input. Shown inline, never sent to the network.
    Validation,
    /// Connectivity or timeout. Worth a retry affordance.
    Transport,
    /// Non-2xx response from the API.
    Api,
    /// Valid request, absent resource.
    NotFound,
    /// Unreadable persisted payload. Internal only; degraded to absent.
    StorageCorruption,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("network error: {0}")]
    Transport(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Api { .. } => ErrorKind::Api,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Transport failures and server-side 5xx are worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
