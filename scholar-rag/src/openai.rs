//! Embeddings from the OpenAI API.
//!
//! Only available with the `openai` feature. The analyzer embeds one chunk
//! per request, so each call sends a single input and expects exactly one
//! vector back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::source::EmbeddingVector;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

/// The model the reference corpus is embedded with.
pub const DEFAULT_MODEL: &str = "text-embedding-ada-002";

/// Output size of [`DEFAULT_MODEL`].
pub const DEFAULT_DIMENSIONS: usize = 1536;

const PROVIDER: &str = "OpenAI";

/// An [`EmbeddingProvider`] backed by the OpenAI embeddings endpoint.
///
/// Transport errors, non-success statuses and malformed bodies all surface
/// as [`RagError::EmbeddingUnavailable`], so the analyzer tallies them per
/// chunk instead of failing the document.
///
/// # Example
///
/// ```rust,ignore
/// use scholar_rag::openai::OpenAIEmbeddingProvider;
///
/// let provider = OpenAIEmbeddingProvider::from_env()?;
/// let corpus = InMemoryCorpus::new(provider.dimensions());
/// ```
pub struct OpenAIEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbeddingProvider {
    /// Create a provider for [`DEFAULT_MODEL`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidConfiguration`] if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::InvalidConfiguration(
                "OpenAI API key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint: OPENAI_EMBEDDINGS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Read the key from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            RagError::InvalidConfiguration("OPENAI_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Use another model. `dimensions` must match what it returns, since the
    /// corpus index is sized from it.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Send requests to an OpenAI-compatible endpoint instead.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn unavailable(message: String) -> RagError {
        RagError::embedding(PROVIDER, message)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// The single vector in `response`, checked against the expected size.
fn single_embedding(response: EmbeddingResponse, dimensions: usize) -> Result<EmbeddingVector> {
    let mut data = response.data.into_iter();
    let embedding = match (data.next(), data.next()) {
        (Some(first), None) => first.embedding,
        (None, _) => {
            return Err(OpenAIEmbeddingProvider::unavailable("response held no embedding".into()));
        }
        (Some(_), Some(_)) => {
            return Err(OpenAIEmbeddingProvider::unavailable(
                "response held more than one embedding for one input".into(),
            ));
        }
    };
    if embedding.len() != dimensions {
        return Err(OpenAIEmbeddingProvider::unavailable(format!(
            "expected {dimensions} dimensions, got {}",
            embedding.len()
        )));
    }
    Ok(embedding.into())
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        debug!(provider = PROVIDER, model = %self.model, text_len = text.len(), "requesting embedding");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: text })
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "embedding request failed");
                Self::unavailable(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ApiError>(&body).map(|e| e.error.message).unwrap_or(body);
            error!(provider = PROVIDER, %status, "embedding request rejected");
            return Err(Self::unavailable(format!("{status}: {detail}")));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("unreadable response: {e}")))?;
        single_embedding(body, self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}
