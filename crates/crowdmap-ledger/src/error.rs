//! Error types for the ledger.

use crowdmap_types::SubmissionError;

/// Errors returned by ledger operations and ledger stores.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Both an include list and an exclude list were supplied.
    #[error("include and exclude filters are mutually exclusive")]
    ConflictingFilters,

    /// A submission failed validation.
    #[error("invalid submission: {0}")]
    Invalid(#[from] SubmissionError),

    /// A payload could not be encoded for identity matching or storage.
    #[error("change encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The persistence backend failed.
    #[error("ledger backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Wrap a backend-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    /// Whether this error was caused by the caller rather than the backend.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ConflictingFilters | Self::Invalid(_))
    }
}
