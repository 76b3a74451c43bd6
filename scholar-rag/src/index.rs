//! Similarity index and corpus access traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::source::{EmbeddingVector, Source, SourceId, SourceRecord};

/// One hit returned by a [`SimilarityIndex`]: a source and its raw similarity.
///
/// The similarity is not clamped; callers map it into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHit {
    pub source_id: SourceId,
    pub similarity: f32,
}

/// Ranks stored source embeddings against a query vector.
///
/// Only sources with a stored embedding take part. Results are ordered by
/// descending similarity; ties keep a deterministic order for a fixed corpus.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{InMemoryCorpus, SimilarityIndex};
///
/// let corpus = InMemoryCorpus::new(256);
/// let hits = corpus.nearest(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Return at most `k` sources closest to `query`, best first.
    async fn nearest(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<IndexHit>>;

    /// Dimensionality of the stored embeddings.
    fn dimensions(&self) -> usize;

    /// Short backend name used in logs and errors.
    fn name(&self) -> &str {
        "index"
    }
}

/// Read access to source records by id.
#[async_trait]
pub trait Corpus: Send + Sync {
    /// Fetch one source. `Ok(None)` if no source has that id.
    async fn source(&self, id: SourceId) -> Result<Option<Source>>;

    /// Fetch several sources, preserving the order of `ids` and skipping
    /// unknown ids.
    async fn sources(&self, ids: &[SourceId]) -> Result<Vec<Source>> {
        let mut found = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(source) = self.source(*id).await? {
                found.push(source);
            }
        }
        Ok(found)
    }
}

/// A corpus that accepts new sources during ingestion.
#[async_trait]
pub trait CorpusStore: Corpus {
    /// Store a source, returning its assigned id.
    async fn insert(
        &self,
        record: SourceRecord,
        embedding: Option<EmbeddingVector>,
    ) -> Result<SourceId>;

    /// Number of stored sources, embedded or not.
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
