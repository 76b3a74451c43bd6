//! Source retrieval and chunk-level plagiarism scoring for academic corpora.
//!
//! This crate provides:
//! - [`Retriever`]: top-K source search over an embedded corpus
//! - [`PlagiarismAnalyzer`]: paragraph-level matching aggregated into a
//!   [`PlagiarismVerdict`] with document-ordered evidence
//! - [`Ingestor`]: loading and embedding reference sources
//! - Backends: [`InMemoryCorpus`], [`HashingEmbeddingProvider`], and behind
//!   features, `openai::OpenAIEmbeddingProvider` and `pgvector::PgVectorCorpus`
//!
//! The embedding model and the similarity index are injected through the
//! [`EmbeddingProvider`] and [`SimilarityIndex`] traits.

pub mod analyzer;
pub mod chunking;
pub mod config;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod index;
pub mod ingest;
pub mod inmemory;
pub mod retriever;
pub mod source;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use analyzer::{AnalysisReport, PlagiarismAnalyzer};
pub use chunking::{Chunker, DEFAULT_MIN_CHUNK_CHARS, ParagraphChunker};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, CancelPolicy, DEFAULT_THRESHOLD};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use hashing::{DEFAULT_HASHING_DIMENSIONS, HashingEmbeddingProvider};
pub use index::{Corpus, CorpusStore, IndexHit, SimilarityIndex};
pub use ingest::{IngestReport, Ingestor, load_source_records};
pub use inmemory::InMemoryCorpus;
pub use retriever::{Retriever, RetrieverBuilder};
pub use source::{
    Chunk, ChunkMatch, EmbeddingVector, FailureTally, MatchedSource, PlagiarismVerdict,
    SimilarityMatch, Source, SourceId, SourceRecord, SourceType,
};
