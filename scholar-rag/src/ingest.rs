//! Corpus ingestion: load source records, embed them, store them.
//!
//! With an embedding provider configured, every stored source is embedded
//! from its abstract (or its full text when the abstract is blank), and a
//! record that cannot be embedded is skipped. Without a provider, records are
//! stored unembedded: they exist in the corpus but are not searchable.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::CorpusStore;
use crate::source::SourceRecord;

/// Read a JSON array of [`SourceRecord`]s from `path`.
///
/// # Errors
///
/// Returns [`RagError::Io`](crate::RagError::Io) if the file cannot be read
/// and [`RagError::SourceData`](crate::RagError::SourceData) if it is not a
/// valid record array.
pub fn load_source_records(path: impl AsRef<Path>) -> Result<Vec<SourceRecord>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub added: usize,
    pub skipped: usize,
}

/// Stores source records in a [`CorpusStore`], embedding them on the way in.
pub struct Ingestor {
    store: Arc<dyn CorpusStore>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl Ingestor {
    /// Create an ingestor that stores records without embeddings.
    pub fn new(store: Arc<dyn CorpusStore>) -> Self {
        Self { store, embedding_provider: None }
    }

    /// Embed every record with `provider` before storing it.
    pub fn with_embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Store every record, skipping those that cannot be embedded.
    ///
    /// # Errors
    ///
    /// Fails only if the store rejects an insert. Embedding failures are
    /// logged and counted in [`IngestReport::skipped`].
    pub async fn ingest(&self, records: Vec<SourceRecord>) -> Result<IngestReport> {
        let total = records.len();
        let mut report = IngestReport::default();

        for (position, record) in records.into_iter().enumerate() {
            let embedding = match &self.embedding_provider {
                None => None,
                Some(provider) => {
                    let embedded = match record.embedding_text() {
                        Some(text) => provider.embed(text).await,
                        None => {
                            warn!(title = %record.title, "source has no abstract or full text, skipping");
                            report.skipped += 1;
                            continue;
                        }
                    };
                    match embedded {
                        Ok(vector) if !vector.is_empty() => Some(vector),
                        Ok(_) => {
                            warn!(title = %record.title, "empty embedding returned, skipping source");
                            report.skipped += 1;
                            continue;
                        }
                        Err(e) => {
                            warn!(title = %record.title, error = %e, "failed to embed source, skipping");
                            report.skipped += 1;
                            continue;
                        }
                    }
                }
            };

            let title = record.title.clone();
            let id = self.store.insert(record, embedding).await?;
            info!(progress = %format!("{}/{total}", position + 1), source.id = %id, %title, "added source");
            report.added += 1;
        }

        info!(added = report.added, skipped = report.skipped, "ingestion finished");
        Ok(report)
    }

    /// Ingest `records` only if the store is empty.
    ///
    /// # Errors
    ///
    /// Same as [`ingest`](Self::ingest).
    pub async fn seed_if_empty(&self, records: Vec<SourceRecord>) -> Result<IngestReport> {
        let existing = self.store.len().await?;
        if existing > 0 {
            info!(existing, "corpus already populated, skipping seed");
            return Ok(IngestReport::default());
        }
        self.ingest(records).await
    }
}
