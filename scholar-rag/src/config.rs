//! Configuration for the plagiarism analyzer.

use serde::{Deserialize, Serialize};

use crate::chunking::DEFAULT_MIN_CHUNK_CHARS;
use crate::error::{RagError, Result};

/// Default similarity at or above which a chunk counts as matched.
pub const DEFAULT_THRESHOLD: f32 = 0.85;

/// What an analysis does when its cancellation signal fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Fail with [`RagError::Canceled`].
    #[default]
    Fail,
    /// Return the chunks evaluated so far as an incomplete verdict.
    Partial,
}

/// Configuration parameters for [`PlagiarismAnalyzer`](crate::PlagiarismAnalyzer).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Minimum similarity for a chunk to count as plagiarized, in `[0, 1]`.
    pub threshold: f32,
    /// Paragraphs shorter than this many characters are not evaluated.
    pub min_chunk_chars: usize,
    /// Length of the excerpt stored with each match.
    pub preview_chars: usize,
    /// Maximum number of chunks evaluated concurrently.
    pub max_concurrency: usize,
    /// Number of sources suggested for a whole document.
    pub suggestion_top_k: usize,
    pub cancel_policy: CancelPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_chunk_chars: DEFAULT_MIN_CHUNK_CHARS,
            preview_chars: 200,
            max_concurrency: 4,
            suggestion_top_k: 5,
            cancel_policy: CancelPolicy::Fail,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new builder for constructing an [`AnalyzerConfig`].
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }

    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if:
    /// - `threshold` is outside `[0, 1]`
    /// - `min_chunk_chars`, `preview_chars`, `max_concurrency` or
    ///   `suggestion_top_k` is zero
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        for (name, value) in [
            ("min_chunk_chars", self.min_chunk_chars),
            ("preview_chars", self.preview_chars),
            ("max_concurrency", self.max_concurrency),
            ("suggestion_top_k", self.suggestion_top_k),
        ] {
            if value == 0 {
                return Err(RagError::InvalidConfiguration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(RagError::InvalidConfiguration(format!(
            "threshold ({threshold}) must be within [0, 1]"
        )));
    }
    Ok(())
}

/// Builder for constructing a validated [`AnalyzerConfig`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    /// Set the plagiarism threshold.
    pub fn threshold(mut self, threshold: f32) -> Self {
        self.config.threshold = threshold;
        self
    }

    /// Set the minimum paragraph length in characters.
    pub fn min_chunk_chars(mut self, chars: usize) -> Self {
        self.config.min_chunk_chars = chars;
        self
    }

    /// Set the excerpt length in characters.
    pub fn preview_chars(mut self, chars: usize) -> Self {
        self.config.preview_chars = chars;
        self
    }

    /// Set the number of chunks evaluated concurrently.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// Set the number of suggested sources per report.
    pub fn suggestion_top_k(mut self, k: usize) -> Self {
        self.config.suggestion_top_k = k;
        self
    }

    /// Set the cancellation policy.
    pub fn cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.config.cancel_policy = policy;
        self
    }

    /// Build the [`AnalyzerConfig`], validating every parameter.
    ///
    /// # Errors
    ///
    /// See [`AnalyzerConfig::validate`].
    pub fn build(self) -> Result<AnalyzerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
