//! Source retrieval: embed a query, rank the corpus, enrich the hits.
//!
//! The [`Retriever`] composes an [`EmbeddingProvider`], a [`SimilarityIndex`]
//! and a [`Corpus`]. It answers "which sources are most similar to this
//! text", both for plain source search and for each chunk the
//! [`PlagiarismAnalyzer`](crate::PlagiarismAnalyzer) evaluates.
//!
//! # Example
//!
//! ```rust,ignore
//! use scholar_rag::{HashingEmbeddingProvider, InMemoryCorpus, Retriever};
//!
//! let corpus = Arc::new(InMemoryCorpus::new(512));
//! let retriever = Retriever::builder()
//!     .embedding_provider(Arc::new(HashingEmbeddingProvider::default()))
//!     .index(corpus.clone())
//!     .corpus(corpus)
//!     .build()?;
//!
//! let matches = retriever.search("machine learning ethics", 3).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{Corpus, SimilarityIndex};
use crate::source::SimilarityMatch;

/// Ranks corpus sources against free text.
///
/// Construct one via [`Retriever::builder()`].
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SimilarityIndex>,
    corpus: Arc<dyn Corpus>,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return the `top_k` sources most similar to `query`, best first.
    ///
    /// If the query cannot be embedded the result is empty rather than an
    /// error: a missing embedding only means this text cannot be compared.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidConfiguration`] if `top_k` is zero.
    /// - [`RagError::IndexUnavailable`] if the index or corpus cannot be read,
    ///   so callers can tell "nothing similar" from "could not check".
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SimilarityMatch>> {
        match self.lookup(query, top_k).await {
            Err(e) if e.is_embedding_unavailable() => {
                warn!(error = %e, "query embedding failed, returning no matches");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Like [`search`](Self::search), but reports embedding failures as
    /// [`RagError::EmbeddingUnavailable`] so they can be tallied.
    pub(crate) async fn lookup(&self, query: &str, top_k: usize) -> Result<Vec<SimilarityMatch>> {
        if top_k == 0 {
            return Err(RagError::InvalidConfiguration("top_k must be greater than zero".into()));
        }

        // 1. Embed the query
        let provider = self.embedding_provider.name();
        let embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            if e.is_embedding_unavailable() { e } else { RagError::embedding(provider, e.to_string()) }
        })?;
        if embedding.is_empty() {
            return Err(RagError::embedding(provider, "provider returned an empty vector"));
        }
        if embedding.dimensions() != self.index.dimensions() {
            return Err(RagError::embedding(
                provider,
                format!(
                    "provider returned {} dimensions, index expects {}",
                    embedding.dimensions(),
                    self.index.dimensions()
                ),
            ));
        }

        // 2. Rank stored embeddings
        let hits = self.index.nearest(&embedding, top_k).await.map_err(|e| {
            error!(backend = self.index.name(), error = %e, "similarity search failed");
            into_index_error(self.index.name(), e)
        })?;

        // 3. Enrich with source metadata, keeping index order
        let ids: Vec<_> = hits.iter().map(|h| h.source_id).collect();
        let sources = self.corpus.sources(&ids).await.map_err(|e| {
            error!(error = %e, "corpus lookup failed");
            into_index_error(self.index.name(), e)
        })?;

        let matches: Vec<SimilarityMatch> = hits
            .iter()
            .filter_map(|hit| match sources.iter().find(|s| s.id == hit.source_id) {
                Some(source) if source.is_searchable() => {
                    Some(SimilarityMatch::new(source, hit.similarity))
                }
                Some(_) => None,
                None => {
                    warn!(source.id = %hit.source_id, "index returned a source missing from the corpus");
                    None
                }
            })
            .take(top_k)
            .collect();

        debug!(top_k, result_count = matches.len(), "search completed");
        Ok(matches)
    }
}

/// Any failure reading the index or corpus means the corpus could not be
/// checked. Configuration errors keep their kind.
fn into_index_error(backend: &str, e: RagError) -> RagError {
    match e {
        RagError::IndexUnavailable { .. } | RagError::InvalidConfiguration(_) => e,
        other => RagError::index(backend, other.to_string()),
    }
}

/// Builder for constructing a [`Retriever`].
///
/// All fields are required. [`build()`](RetrieverBuilder::build) also checks
/// that the provider and the index agree on dimensionality.
///
/// # Example
///
/// ```rust,ignore
/// let retriever = Retriever::builder()
///     .embedding_provider(Arc::new(embedder))
///     .index(index)
///     .corpus(corpus)
///     .build()?;
/// ```
#[derive(Default)]
pub struct RetrieverBuilder {
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn SimilarityIndex>>,
    corpus: Option<Arc<dyn Corpus>>,
}

impl RetrieverBuilder {
    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the similarity index.
    pub fn index(mut self, index: Arc<dyn SimilarityIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the corpus used to enrich index hits.
    pub fn corpus(mut self, corpus: Arc<dyn Corpus>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Build the [`Retriever`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if a field is missing or the
    /// provider's dimensionality differs from the index's.
    pub fn build(self) -> Result<Retriever> {
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::InvalidConfiguration("embedding_provider is required".to_string())
        })?;
        let index = self
            .index
            .ok_or_else(|| RagError::InvalidConfiguration("index is required".to_string()))?;
        let corpus = self
            .corpus
            .ok_or_else(|| RagError::InvalidConfiguration("corpus is required".to_string()))?;

        if embedding_provider.dimensions() != index.dimensions() {
            return Err(RagError::InvalidConfiguration(format!(
                "embedding provider '{}' produces {} dimensions but index '{}' stores {}",
                embedding_provider.name(),
                embedding_provider.dimensions(),
                index.name(),
                index.dimensions()
            )));
        }

        Ok(Retriever { embedding_provider, index, corpus })
    }
}
