//! Error types for the `scholar-rag` crate.

use thiserror::Error;

/// Errors that can occur during retrieval, analysis, and corpus ingestion.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding provider could not produce a vector for the input.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The similarity index or the corpus behind it could not be queried.
    #[error("Index unavailable ({backend}): {message}")]
    IndexUnavailable {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration value is out of range or two components disagree.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An analysis was canceled before every chunk was evaluated.
    #[error("Analysis canceled after {completed} of {total} chunks")]
    Canceled {
        /// Chunks whose evaluation finished before cancellation.
        completed: usize,
        /// Chunks the document produced.
        total: usize,
    },

    /// Source records could not be decoded.
    #[error("Invalid source data: {0}")]
    SourceData(#[from] serde_json::Error),

    /// Source records could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Shorthand for [`RagError::EmbeddingUnavailable`].
    pub fn embedding(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable { provider: provider.into(), message: message.into() }
    }

    /// Shorthand for [`RagError::IndexUnavailable`].
    pub fn index(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IndexUnavailable { backend: backend.into(), message: message.into() }
    }

    /// Returns `true` for [`RagError::EmbeddingUnavailable`].
    pub fn is_embedding_unavailable(&self) -> bool {
        matches!(self, Self::EmbeddingUnavailable { .. })
    }

    /// Returns `true` for [`RagError::IndexUnavailable`].
    pub fn is_index_unavailable(&self) -> bool {
        matches!(self, Self::IndexUnavailable { .. })
    }
}

/// A convenience result type for retrieval and analysis operations.
pub type Result<T> = std::result::Result<T, RagError>;
