//! Shared fixtures and test doubles.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scholar_rag::{
    AnalyzerConfig, CorpusStore, EmbeddingProvider, EmbeddingVector, HashingEmbeddingProvider,
    InMemoryCorpus, IndexHit, PlagiarismAnalyzer, RagError, Retriever, SimilarityIndex,
    SourceRecord,
};

pub const DIMS: usize = 256;

/// Ten abstracts on unrelated topics, each well over the minimum chunk length.
pub const ABSTRACTS: [(&str, &str); 10] = [
    (
        "Fairness in Automated Decisions",
        "Machine learning ethics examines how automated classifiers can encode bias against protected groups and how auditing restores fairness.",
    ),
    (
        "Coral Reef Bleaching",
        "Rising ocean temperatures trigger coral bleaching events that expel symbiotic algae and threaten reef biodiversity worldwide.",
    ),
    (
        "Medieval Grain Markets",
        "Parish tithe records reveal how medieval grain prices responded to harvest failures, wars, and shifting feudal obligations.",
    ),
    (
        "Quantum Error Correction",
        "Surface codes protect fragile qubits by encoding logical information redundantly across lattices of physical superconducting circuits.",
    ),
    (
        "Urban Heat Islands",
        "Dense asphalt, scarce vegetation, and waste heat from buildings make city centers markedly warmer than surrounding countryside.",
    ),
    (
        "Sleep and Memory Consolidation",
        "Slow wave sleep replays hippocampal activity patterns that stabilise newly formed declarative memories in cortical networks.",
    ),
    (
        "Baroque Counterpoint",
        "Bach's fugues weave independent melodic voices through strict imitation, inversion, and stretto across shifting tonal centers.",
    ),
    (
        "Microfinance Outcomes",
        "Randomised trials of village lending programs find modest gains in small enterprise investment but little change in household consumption.",
    ),
    (
        "Glacier Mass Balance",
        "Satellite gravimetry shows alpine glaciers losing mass faster as summer melt outpaces winter snowfall accumulation.",
    ),
    (
        "Compiler Register Allocation",
        "Graph colouring assigns program variables to a limited set of processor registers, spilling the remainder to stack memory.",
    ),
];

pub fn record(title: &str, abstract_text: &str) -> SourceRecord {
    SourceRecord {
        title: title.to_string(),
        authors: format!("{title} Authors"),
        publication_year: Some(2020),
        abstract_text: abstract_text.to_string(),
        full_text: String::new(),
        source_type: Default::default(),
    }
}

pub fn hashing() -> Arc<HashingEmbeddingProvider> {
    Arc::new(HashingEmbeddingProvider::new(DIMS).unwrap())
}

/// A corpus holding `entries`, each embedded from its abstract.
pub async fn corpus_with(entries: &[(&str, &str)]) -> Arc<InMemoryCorpus> {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS));
    let provider = hashing();
    for (title, abstract_text) in entries {
        let embedding = provider.embed(abstract_text).await.unwrap();
        corpus.insert(record(title, abstract_text), Some(embedding)).await.unwrap();
    }
    corpus
}

pub fn retriever_over(
    provider: Arc<dyn EmbeddingProvider>,
    corpus: Arc<InMemoryCorpus>,
) -> Arc<Retriever> {
    Arc::new(
        Retriever::builder()
            .embedding_provider(provider)
            .index(corpus.clone())
            .corpus(corpus)
            .build()
            .unwrap(),
    )
}

pub fn analyzer_over(
    provider: Arc<dyn EmbeddingProvider>,
    corpus: Arc<InMemoryCorpus>,
    config: AnalyzerConfig,
) -> PlagiarismAnalyzer {
    PlagiarismAnalyzer::new(retriever_over(provider, corpus), config).unwrap()
}

/// Join paragraphs with blank lines.
pub fn document(paragraphs: &[&str]) -> String {
    paragraphs.join("\n\n")
}

/// Always fails, like an embedding API that is down.
pub struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _text: &str) -> scholar_rag::Result<EmbeddingVector> {
        Err(RagError::embedding("Failing", "service unavailable"))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Returns an empty vector for every input.
pub struct EmptyVectorProvider;

#[async_trait]
impl EmbeddingProvider for EmptyVectorProvider {
    async fn embed(&self, _text: &str) -> scholar_rag::Result<EmbeddingVector> {
        Ok(Vec::new().into())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Hashing embeddings after a per-text delay.
pub struct DelayedProvider {
    pub delays: HashMap<String, Duration>,
    pub default_delay: Duration,
}

#[async_trait]
impl EmbeddingProvider for DelayedProvider {
    async fn embed(&self, text: &str) -> scholar_rag::Result<EmbeddingVector> {
        let delay = self.delays.get(text).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;
        hashing().embed(text).await
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// Records the highest number of concurrent `embed` calls.
#[derive(Default)]
pub struct ConcurrencyTracker {
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for ConcurrencyTracker {
    async fn embed(&self, text: &str) -> scholar_rag::Result<EmbeddingVector> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        hashing().embed(text).await
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// An index whose backend cannot be reached.
pub struct UnavailableIndex;

#[async_trait]
impl SimilarityIndex for UnavailableIndex {
    async fn nearest(&self, _query: &EmbeddingVector, _k: usize) -> scholar_rag::Result<Vec<IndexHit>> {
        Err(RagError::index("Unavailable", "connection refused"))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}

/// An index that returns fixed hits regardless of the query.
pub struct FixedIndex(pub Vec<IndexHit>);

#[async_trait]
impl SimilarityIndex for FixedIndex {
    async fn nearest(&self, _query: &EmbeddingVector, k: usize) -> scholar_rag::Result<Vec<IndexHit>> {
        Ok(self.0.iter().copied().take(k).collect())
    }

    fn dimensions(&self) -> usize {
        DIMS
    }
}
