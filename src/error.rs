//! Solver error types

use thiserror::Error;

/// Result type for solver operations
pub type SolverResult<T> = Result<T, SolverError>;

/// Errors returned from `Present`, `CleanUp` and `Initialize`.
///
/// Every failure in a challenge request path is surfaced through this type;
/// the webhook front end turns it into an unsuccessful challenge response.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The per-request solver configuration could not be decoded
    #[error("error decoding solver config: {0}")]
    ConfigDecode(#[from] serde_json::Error),

    /// A referenced secret, or a field within it, does not exist
    #[error("error getting secret {which}: {reason}")]
    SecretNotFound { which: String, reason: String },

    /// The secret store could not be queried
    #[error("secret store request failed: {0}")]
    SecretStore(String),

    /// An outbound request could not be built
    #[error("error building {method} request: {message}")]
    RequestBuild {
        method: &'static str,
        message: String,
    },

    /// The request could not be sent or its body could not be read
    #[error("{context}: {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The TXT record listing did not have the expected shape
    #[error("unexpected TXT record listing (HTTP {status}): {message}")]
    ResponseParse { status: u16, message: String },

    /// One or more DELETE calls failed during cleanup
    #[error("failed to delete {} of {total} TXT records: {}", .failed.len(), .failed.join(", "))]
    CleanupIncomplete { failed: Vec<String>, total: usize },

    /// `Present`/`CleanUp` was called before `Initialize`
    #[error("solver has not been initialized")]
    NotInitialized,

    /// `Initialize` was called twice
    #[error("solver is already initialized")]
    AlreadyInitialized,

    /// The cluster connection descriptor is unusable
    #[error("invalid cluster config: {0}")]
    InvalidClusterConfig(String),
}

impl SolverError {
    pub(crate) fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        SolverError::Network {
            context: context.into(),
            source,
        }
    }
}
