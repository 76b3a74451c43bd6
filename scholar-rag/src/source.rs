//! Data types for corpus sources, document chunks, matches, and verdicts.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A fixed-length embedding vector. Cheap to clone and immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f32>", into = "Vec<f32>")]
pub struct EmbeddingVector(Arc<[f32]>);

impl EmbeddingVector {
    /// The vector components.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of components.
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the vector has no components.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values.into())
    }
}

impl From<EmbeddingVector> for Vec<f32> {
    fn from(vector: EmbeddingVector) -> Self {
        vector.0.to_vec()
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

/// Identifier of a [`Source`] within a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub i64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of reference material a [`Source`] is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    #[default]
    Paper,
    Textbook,
    CourseMaterial,
    #[serde(other)]
    Other,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paper => "paper",
            Self::Textbook => "textbook",
            Self::CourseMaterial => "course_material",
            Self::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "paper" => Self::Paper,
            "textbook" => Self::Textbook,
            "course_material" => Self::CourseMaterial,
            _ => Self::Other,
        }
    }
}

/// Bibliographic content of a reference source, as supplied by corpus ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub source_type: SourceType,
}

impl SourceRecord {
    /// The text a source is embedded from: its abstract, or its full text
    /// when the abstract is blank. `None` when both are blank.
    pub fn embedding_text(&self) -> Option<&str> {
        [self.abstract_text.as_str(), self.full_text.as_str()]
            .into_iter()
            .find(|text| !text.trim().is_empty())
    }
}

/// A reference document in the corpus.
///
/// A source without an embedding exists in the corpus but never appears in
/// similarity results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    #[serde(flatten)]
    pub record: SourceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<EmbeddingVector>,
}

impl Source {
    /// Returns `true` if the source can take part in similarity search.
    pub fn is_searchable(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Clamp a raw index similarity into `[0, 1]`. NaN maps to 0.
pub(crate) fn clamp_similarity(raw: f32) -> f32 {
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
}

/// One source ranked against a query, with its similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub id: SourceId,
    pub title: String,
    pub authors: String,
    pub publication_year: Option<i32>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub source_type: SourceType,
    pub similarity: f32,
}

impl SimilarityMatch {
    /// Build a match from a corpus source and a raw index similarity.
    pub fn new(source: &Source, raw_similarity: f32) -> Self {
        let record = &source.record;
        Self {
            id: source.id,
            title: record.title.clone(),
            authors: record.authors.clone(),
            publication_year: record.publication_year,
            abstract_text: record.abstract_text.clone(),
            source_type: record.source_type,
            similarity: clamp_similarity(raw_similarity),
        }
    }
}

/// A contiguous paragraph of a submitted document, evaluated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position among the chunks emitted for the document (0-based).
    pub index: usize,
    /// Byte offset of the trimmed text in the document.
    pub offset: usize,
    pub text: String,
}

/// Identifying metadata of the source a chunk matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSource {
    pub id: SourceId,
    pub title: String,
    pub authors: String,
}

/// A chunk whose best match met the plagiarism threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMatch {
    pub chunk_index: usize,
    pub offset: usize,
    /// The chunk text, truncated for display.
    pub excerpt: String,
    pub similarity: f32,
    pub source: MatchedSource,
}

/// Per-chunk retrieval failures observed while building a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureTally {
    pub embedding: usize,
    pub index: usize,
}

impl FailureTally {
    pub fn total(&self) -> usize {
        self.embedding + self.index
    }
}

/// The document-level plagiarism verdict.
///
/// `score` is `matched_count / total_count`, or 0 when no chunk was
/// considered. `matches` is in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlagiarismVerdict {
    pub total_count: usize,
    pub matched_count: usize,
    pub score: f64,
    pub matches: Vec<ChunkMatch>,
    pub failures: FailureTally,
    /// `false` when the analysis was canceled and only part of the document
    /// was evaluated.
    pub complete: bool,
}

impl PlagiarismVerdict {
    /// Assemble a verdict, deriving `matched_count` and `score`.
    pub fn new(
        total_count: usize,
        matches: Vec<ChunkMatch>,
        failures: FailureTally,
        complete: bool,
    ) -> Self {
        let matched_count = matches.len();
        let score =
            if total_count > 0 { matched_count as f64 / total_count as f64 } else { 0.0 };
        Self { total_count, matched_count, score, matches, failures, complete }
    }

    /// The verdict for a document with no evaluable chunks.
    pub fn empty() -> Self {
        Self::new(0, Vec::new(), FailureTally::default(), true)
    }
}
