//! Embedding provider trait for turning text into vectors.

use async_trait::async_trait;

use crate::error::Result;
use crate::source::EmbeddingVector;

/// A provider that maps text to a fixed-length [`EmbeddingVector`].
///
/// Implementations wrap specific embedding backends (OpenAI, a local hashing
/// model, test doubles) behind a unified async interface. Failures are
/// reported as [`RagError::EmbeddingUnavailable`](crate::RagError::EmbeddingUnavailable).
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::EmbeddingProvider;
///
/// let provider = HashingEmbeddingProvider::new(256)?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.dimensions(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &str {
        "embedding"
    }
}
