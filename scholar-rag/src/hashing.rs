//! Offline embedding provider based on feature hashing.
//!
//! [`HashingEmbeddingProvider`] needs no model or network access. Each
//! lowercased word is hashed into one of `dimensions` buckets with a signed
//! weight, and the result is L2-normalized, so texts that share vocabulary
//! point in similar directions and identical texts produce identical vectors.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::source::EmbeddingVector;

const PROVIDER: &str = "Hashing";

/// Default dimensionality for hashed embeddings.
pub const DEFAULT_HASHING_DIMENSIONS: usize = 512;

/// A deterministic bag-of-words [`EmbeddingProvider`].
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    /// Create a provider producing vectors with `dimensions` components.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::InvalidConfiguration(
                "hashing embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }
}

impl Default for HashingEmbeddingProvider {
    fn default() -> Self {
        Self { dimensions: DEFAULT_HASHING_DIMENSIONS }
    }
}

/// 64-bit FNV-1a. Stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let mut values = vec![0.0f32; self.dimensions];
        let mut tokens = 0usize;

        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            values[bucket] += sign;
            tokens += 1;
        }

        let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
        if tokens == 0 || norm == 0.0 {
            return Err(RagError::embedding(PROVIDER, "text contains no word tokens"));
        }
        values.iter_mut().for_each(|x| *x /= norm);
        Ok(values.into())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
