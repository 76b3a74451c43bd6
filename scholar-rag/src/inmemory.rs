//! In-memory corpus and similarity index using cosine similarity.
//!
//! This module provides [`InMemoryCorpus`], a zero-dependency corpus backed by
//! a `Vec` protected by a `tokio::sync::RwLock`. It implements [`Corpus`],
//! [`CorpusStore`] and [`SimilarityIndex`], and is suitable for development,
//! testing, and small reference collections.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{RagError, Result};
use crate::index::{Corpus, CorpusStore, IndexHit, SimilarityIndex};
use crate::source::{EmbeddingVector, Source, SourceId, SourceRecord};

const BACKEND: &str = "InMemory";

/// An in-memory corpus that ranks sources by cosine similarity.
///
/// Sources are kept in insertion order and receive ids `1, 2, 3, ...`.
/// Ranking uses a stable sort, so sources with equal similarity come back in
/// insertion order.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::{CorpusStore, InMemoryCorpus, SimilarityIndex};
///
/// let corpus = InMemoryCorpus::new(256);
/// let id = corpus.insert(record, Some(embedding)).await?;
/// let hits = corpus.nearest(&query, 3).await?;
/// ```
#[derive(Debug)]
pub struct InMemoryCorpus {
    dimensions: usize,
    sources: RwLock<Vec<Source>>,
}

impl InMemoryCorpus {
    /// Create an empty corpus whose embeddings have `dimensions` components.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, sources: RwLock::new(Vec::new()) }
    }

    fn check_dimensions(&self, embedding: &EmbeddingVector) -> Result<()> {
        if embedding.dimensions() != self.dimensions {
            return Err(RagError::InvalidConfiguration(format!(
                "embedding has {} dimensions, corpus expects {}",
                embedding.dimensions(),
                self.dimensions
            )));
        }
        Ok(())
    }

    fn check_finite(embedding: &EmbeddingVector) -> Result<()> {
        if let Some(position) = embedding.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(RagError::InvalidConfiguration(format!(
                "embedding component {position} is not a finite number"
            )));
        }
        Ok(())
    }
}

/// NaN ranks below every real similarity.
fn rank_key(hit: &IndexHit) -> f32 {
    if hit.similarity.is_nan() { f32::NEG_INFINITY } else { hit.similarity }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl SimilarityIndex for InMemoryCorpus {
    async fn nearest(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<IndexHit>> {
        self.check_dimensions(query)?;

        let sources = self.sources.read().await;
        let mut scored: Vec<IndexHit> = sources
            .iter()
            .filter_map(|source| {
                let embedding = source.embedding.as_ref().filter(|e| !e.is_empty())?;
                let similarity = cosine_similarity(embedding.as_slice(), query.as_slice());
                Some(IndexHit { source_id: source.id, similarity })
            })
            .collect();

        scored.sort_by(|a, b| rank_key(b).total_cmp(&rank_key(a)));
        scored.truncate(k);
        Ok(scored)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        BACKEND
    }
}

#[async_trait]
impl Corpus for InMemoryCorpus {
    async fn source(&self, id: SourceId) -> Result<Option<Source>> {
        let sources = self.sources.read().await;
        let position = id.0.checked_sub(1).and_then(|p| usize::try_from(p).ok());
        Ok(position.and_then(|p| sources.get(p)).cloned())
    }
}

#[async_trait]
impl CorpusStore for InMemoryCorpus {
    async fn insert(
        &self,
        record: SourceRecord,
        embedding: Option<EmbeddingVector>,
    ) -> Result<SourceId> {
        if let Some(embedding) = &embedding {
            self.check_dimensions(embedding)?;
            Self::check_finite(embedding)?;
        }

        let mut sources = self.sources.write().await;
        let id = SourceId(sources.len() as i64 + 1);
        debug!(source.id = %id, title = %record.title, embedded = embedding.is_some(), "stored source");
        sources.push(Source { id, record, embedding });
        Ok(id)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.sources.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> SourceRecord {
        SourceRecord {
            title: title.to_string(),
            authors: String::new(),
            publication_year: None,
            abstract_text: String::new(),
            full_text: String::new(),
            source_type: Default::default(),
        }
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[2.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn unembedded_sources_are_never_ranked() {
        let corpus = InMemoryCorpus::new(2);
        corpus.insert(record("bare"), None).await.unwrap();
        let embedded = corpus.insert(record("embedded"), Some(vec![1.0, 0.0].into())).await.unwrap();

        let hits = corpus.nearest(&vec![1.0, 0.0].into(), 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_id, embedded);
        assert_eq!(corpus.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn ties_keep_insertion_order() {
        let corpus = InMemoryCorpus::new(2);
        let first = corpus.insert(record("a"), Some(vec![0.0, 1.0].into())).await.unwrap();
        let second = corpus.insert(record("b"), Some(vec![0.0, 2.0].into())).await.unwrap();

        let hits = corpus.nearest(&vec![0.0, 1.0].into(), 2).await.unwrap();
        let ids: Vec<SourceId> = hits.iter().map(|h| h.source_id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions() {
        let corpus = InMemoryCorpus::new(3);
        let err = corpus.insert(record("x"), Some(vec![1.0].into())).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidConfiguration(_)));
    }

    #[tokio::test]
    async fn rejects_non_finite_components() {
        let corpus = InMemoryCorpus::new(2);
        for bad in [vec![f32::NAN, 1.0], vec![0.5, f32::INFINITY], vec![f32::NEG_INFINITY, 0.0]] {
            let err = corpus.insert(record("bad"), Some(bad.into())).await.unwrap_err();
            assert!(matches!(err, RagError::InvalidConfiguration(_)));
        }
        assert!(corpus.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn nan_similarities_rank_last_without_panicking() {
        let corpus = InMemoryCorpus::new(2);
        for i in 0..64 {
            let x = (i % 7) as f32 - 3.0;
            let y = (i % 5) as f32 + 0.5;
            corpus.insert(record("s"), Some(vec![x, y].into())).await.unwrap();
        }

        // A NaN query makes every similarity NaN.
        let hits = corpus.nearest(&vec![f32::NAN, 0.5].into(), 5).await.unwrap();
        assert_eq!(hits.len(), 5);
        let ids: Vec<i64> = hits.iter().map(|h| h.source_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        // An infinite component yields NaN for some sources and not others.
        let hits = corpus.nearest(&vec![f32::INFINITY, 1.0].into(), 64).await.unwrap();
        assert_eq!(hits.len(), 64);
        let first_nan = hits.iter().position(|h| h.similarity.is_nan()).unwrap_or(hits.len());
        assert!(hits[first_nan..].iter().all(|h| h.similarity.is_nan()));
    }

    #[test]
    fn rank_key_orders_nan_below_negative_similarities() {
        let nan = IndexHit { source_id: SourceId(1), similarity: f32::NAN };
        let negative = IndexHit { source_id: SourceId(2), similarity: -1.0 };
        assert!(rank_key(&nan) < rank_key(&negative));
    }

    #[tokio::test]
    async fn looks_up_sources_by_id() {
        let corpus = InMemoryCorpus::new(1);
        let id = corpus.insert(record("only"), None).await.unwrap();
        assert_eq!(corpus.source(id).await.unwrap().unwrap().record.title, "only");
        assert!(corpus.source(SourceId(0)).await.unwrap().is_none());
        assert!(corpus.source(SourceId(7)).await.unwrap().is_none());
    }
}
