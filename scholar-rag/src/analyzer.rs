//! Chunk-level plagiarism analysis.
//!
//! [`PlagiarismAnalyzer`] chunks a document, looks up the best-matching
//! source for every chunk through the [`Retriever`], and aggregates the
//! matches that meet the threshold into a [`PlagiarismVerdict`].
//!
//! Chunks are evaluated concurrently, at most `max_concurrency` at a time.
//! Outcomes are stored by chunk position, so the evidence list is always in
//! document order whatever order lookups complete in.
//!
//! # Example
//!
//! ```rust,ignore
//! use scholar_rag::{AnalyzerConfig, PlagiarismAnalyzer};
//!
//! let analyzer = PlagiarismAnalyzer::new(Arc::new(retriever), AnalyzerConfig::default())?;
//! let verdict = analyzer.analyze(&essay).await?;
//! println!("{:.0}% of paragraphs matched", verdict.score * 100.0);
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::chunking::{Chunker, ParagraphChunker};
use crate::config::{AnalyzerConfig, CancelPolicy, validate_threshold};
use crate::error::{RagError, Result};
use crate::retriever::Retriever;
use crate::source::{
    Chunk, ChunkMatch, FailureTally, MatchedSource, PlagiarismVerdict, SimilarityMatch,
};

/// Marker appended to truncated excerpts.
const TRUNCATION_MARKER: &str = "...";

/// What happened to one chunk.
#[derive(Debug)]
enum ChunkOutcome {
    Matched(ChunkMatch),
    Clean,
    EmbeddingFailed,
    IndexFailed,
}

/// A verdict together with the sources most similar to the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub verdict: PlagiarismVerdict,
    pub suggested_sources: Vec<SimilarityMatch>,
}

/// Scores documents for plagiarism against the retriever's corpus.
pub struct PlagiarismAnalyzer {
    retriever: Arc<Retriever>,
    chunker: Arc<dyn Chunker>,
    config: AnalyzerConfig,
}

impl PlagiarismAnalyzer {
    /// Create an analyzer that splits documents with a [`ParagraphChunker`]
    /// using `config.min_chunk_chars`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `config` is invalid.
    pub fn new(retriever: Arc<Retriever>, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let chunker = Arc::new(ParagraphChunker::new(config.min_chunk_chars));
        Ok(Self { retriever, chunker, config })
    }

    /// Replace the chunking strategy.
    pub fn with_chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = chunker;
        self
    }

    /// Return a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Plain source search, no threshold and no aggregation.
    ///
    /// See [`Retriever::search`].
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SimilarityMatch>> {
        self.retriever.search(query, top_k).await
    }

    /// Analyze `text` with the configured threshold.
    pub async fn analyze(&self, text: &str) -> Result<PlagiarismVerdict> {
        self.analyze_with_threshold(text, self.config.threshold).await
    }

    /// Analyze `text`, counting a chunk as matched when its best source has
    /// similarity `>= threshold`.
    ///
    /// Per-chunk retrieval failures never fail the call; they are counted in
    /// [`PlagiarismVerdict::failures`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `threshold` is outside `[0, 1]`.
    pub async fn analyze_with_threshold(
        &self,
        text: &str,
        threshold: f32,
    ) -> Result<PlagiarismVerdict> {
        self.analyze_until(text, threshold, std::future::pending()).await
    }

    /// Analyze `text`, abandoning in-flight lookups once `cancel` resolves.
    ///
    /// A deadline is `tokio::time::sleep(timeout)`. What a canceled call
    /// returns depends on [`AnalyzerConfig::cancel_policy`]: an error, or a
    /// verdict with `complete == false` that counts only the chunks whose
    /// evaluation finished.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidConfiguration`] if `threshold` is outside `[0, 1]`.
    /// - [`RagError::Canceled`] if canceled under [`CancelPolicy::Fail`].
    pub async fn analyze_until<F>(
        &self,
        text: &str,
        threshold: f32,
        cancel: F,
    ) -> Result<PlagiarismVerdict>
    where
        F: Future<Output = ()>,
    {
        validate_threshold(threshold)?;

        // 1. Chunk the document
        let chunks = self.chunker.chunk(text);
        let total = chunks.len();
        if total == 0 {
            info!(total_count = 0, "no evaluable chunks");
            return Ok(PlagiarismVerdict::empty());
        }

        // 2. Evaluate chunks with bounded concurrency, indexed by position
        let mut outcomes: Vec<Option<ChunkOutcome>> =
            std::iter::repeat_with(|| None).take(total).collect();
        let mut completed = 0;
        let mut canceled = false;
        {
            let mut pending = stream::iter(chunks.iter().enumerate())
                .map(move |(position, chunk)| async move {
                    (position, self.evaluate(chunk, threshold).await)
                })
                .buffer_unordered(self.config.max_concurrency);
            tokio::pin!(cancel);

            loop {
                tokio::select! {
                    biased;
                    () = &mut cancel => {
                        canceled = true;
                        break;
                    }
                    next = pending.next() => match next {
                        Some((position, outcome)) => {
                            outcomes[position] = Some(outcome);
                            completed += 1;
                        }
                        None => break,
                    },
                }
            }
        }

        if canceled {
            warn!(completed, total, policy = ?self.config.cancel_policy, "analysis canceled");
            if self.config.cancel_policy == CancelPolicy::Fail {
                return Err(RagError::Canceled { completed, total });
            }
        }

        // 3. Aggregate in document order
        let mut matches = Vec::new();
        let mut failures = FailureTally::default();
        for outcome in outcomes.into_iter().flatten() {
            match outcome {
                ChunkOutcome::Matched(m) => matches.push(m),
                ChunkOutcome::Clean => {}
                ChunkOutcome::EmbeddingFailed => failures.embedding += 1,
                ChunkOutcome::IndexFailed => failures.index += 1,
            }
        }

        let verdict = PlagiarismVerdict::new(completed, matches, failures, !canceled);
        if failures.total() > 0 {
            warn!(
                total_count = verdict.total_count,
                embedding_failures = failures.embedding,
                index_failures = failures.index,
                "chunks could not be checked against the corpus"
            );
        }
        info!(
            total_count = verdict.total_count,
            matched_count = verdict.matched_count,
            score = verdict.score,
            complete = verdict.complete,
            "plagiarism analysis completed"
        );

        Ok(verdict)
    }

    /// Analyze `text` and suggest the sources most similar to all of it.
    ///
    /// A failed suggestion lookup leaves `suggested_sources` empty.
    ///
    /// # Errors
    ///
    /// Same as [`analyze`](Self::analyze).
    pub async fn report(&self, text: &str) -> Result<AnalysisReport> {
        let verdict = self.analyze(text).await?;
        let suggested_sources =
            match self.retriever.search(text, self.config.suggestion_top_k).await {
                Ok(sources) => sources,
                Err(e) => {
                    warn!(error = %e, "source suggestions unavailable");
                    Vec::new()
                }
            };
        Ok(AnalysisReport { verdict, suggested_sources })
    }

    async fn evaluate(&self, chunk: &Chunk, threshold: f32) -> ChunkOutcome {
        match self.retriever.lookup(&chunk.text, 1).await {
            Ok(found) => match found.into_iter().next() {
                Some(best) if best.similarity >= threshold => {
                    debug!(chunk_index = chunk.index, source.id = %best.id, similarity = best.similarity, "chunk matched");
                    ChunkOutcome::Matched(ChunkMatch {
                        chunk_index: chunk.index,
                        offset: chunk.offset,
                        excerpt: excerpt(&chunk.text, self.config.preview_chars),
                        similarity: best.similarity,
                        source: MatchedSource { id: best.id, title: best.title, authors: best.authors },
                    })
                }
                _ => ChunkOutcome::Clean,
            },
            Err(e) if e.is_embedding_unavailable() => {
                debug!(chunk_index = chunk.index, error = %e, "chunk embedding failed");
                ChunkOutcome::EmbeddingFailed
            }
            Err(e) => {
                debug!(chunk_index = chunk.index, error = %e, "chunk lookup failed");
                ChunkOutcome::IndexFailed
            }
        }
    }
}

/// The first `max_chars` characters of `text`, with a marker when cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}
