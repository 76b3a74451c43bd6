//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// scholar - source search and plagiarism analysis over an academic corpus
///
/// The corpus is a JSON array of source records (`title`, `authors`,
/// `publication_year`, `abstract`, `full_text`, `source_type`). Results are
/// printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "scholar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file with the reference sources
    #[arg(long, global = true, env = "SCHOLAR_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Embedding backend used for the corpus and the input text
    #[arg(long, global = true, value_enum, default_value_t = EmbedderKind::Hashing, env = "SCHOLAR_EMBEDDER")]
    pub embedder: EmbedderKind,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Local feature hashing, no network access
    Hashing,
    /// OpenAI embeddings API (needs OPENAI_API_KEY and the `openai` feature)
    Openai,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the sources most similar to a query
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of sources to return
        #[arg(short = 'k', long, default_value_t = 10)]
        top_k: usize,
    },

    /// Score a document for paragraph-level plagiarism
    Analyze {
        /// Document to analyze ("-" reads stdin)
        file: PathBuf,

        /// Similarity at or above which a paragraph counts as copied
        #[arg(long, default_value_t = scholar_rag::DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Paragraphs evaluated concurrently
        #[arg(long, default_value_t = 4)]
        concurrency: usize,

        /// Give up after this many seconds
        #[arg(long)]
        deadline_secs: Option<u64>,

        /// On deadline, report the paragraphs checked so far instead of failing
        #[arg(long, requires = "deadline_secs")]
        partial: bool,

        /// Also suggest the sources most similar to the whole document
        #[arg(long, conflicts_with = "deadline_secs")]
        suggest: bool,
    },
}
