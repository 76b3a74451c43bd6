//! Loading and seeding the reference corpus.

mod common;

use std::io::Write;
use std::sync::Arc;

use common::*;
use scholar_rag::{
    Corpus, CorpusStore, InMemoryCorpus, Ingestor, RagError, SourceId, SourceType,
    load_source_records,
};

const SOURCES_JSON: &str = r#"[
    {
        "title": "Reef Resilience",
        "authors": "A. Diver, B. Snorkel",
        "publication_year": 2019,
        "abstract": "Coral reefs recover from bleaching when water temperatures fall quickly.",
        "source_type": "paper"
    },
    {
        "title": "Introductory Thermodynamics",
        "authors": "C. Carnot",
        "full_text": "Heat flows from hotter bodies to colder ones unless work is done.",
        "source_type": "textbook"
    },
    {
        "title": "Untitled Notes",
        "source_type": "lecture_notes"
    }
]"#;

fn sources_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SOURCES_JSON.as_bytes()).unwrap();
    file
}

#[test]
fn loads_records_with_defaults() {
    let file = sources_file();
    let records = load_source_records(file.path()).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].publication_year, Some(2019));
    assert_eq!(records[1].source_type, SourceType::Textbook);
    assert_eq!(records[1].abstract_text, "");
    assert_eq!(records[2].source_type, SourceType::Other);
    assert_eq!(records[2].authors, "");
    assert_eq!(records[2].embedding_text(), None);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_source_records("/nonexistent/sources.json").unwrap_err();
    assert!(matches!(err, RagError::Io(_)));
}

#[test]
fn malformed_file_is_a_source_data_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{\"title\": 3}").unwrap();
    let err = load_source_records(file.path()).unwrap_err();
    assert!(matches!(err, RagError::SourceData(_)));
}

#[tokio::test]
async fn embeds_and_skips_records_without_text() {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS));
    let ingestor = Ingestor::new(corpus.clone()).with_embedding_provider(hashing());

    let records = load_source_records(sources_file().path()).unwrap();
    let report = ingestor.ingest(records).await.unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(corpus.len().await.unwrap(), 2);

    let textbook = corpus.source(SourceId(2)).await.unwrap().unwrap();
    assert_eq!(textbook.record.title, "Introductory Thermodynamics");
    assert!(textbook.is_searchable());

    let retriever = retriever_over(hashing(), corpus);
    let results = retriever.search("heat flows from hotter bodies", 1).await.unwrap();
    assert_eq!(results[0].title, "Introductory Thermodynamics");
}

#[tokio::test]
async fn without_a_provider_records_are_stored_unsearchable() {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS));
    let ingestor = Ingestor::new(corpus.clone());

    let records = load_source_records(sources_file().path()).unwrap();
    let report = ingestor.ingest(records).await.unwrap();

    assert_eq!(report.added, 3);
    assert_eq!(report.skipped, 0);

    let retriever = retriever_over(hashing(), corpus);
    assert!(retriever.search("coral reefs", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn embedding_failures_skip_records() {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS));
    let ingestor = Ingestor::new(corpus.clone()).with_embedding_provider(Arc::new(FailingProvider));

    let records = load_source_records(sources_file().path()).unwrap();
    let report = ingestor.ingest(records).await.unwrap();

    assert_eq!(report.added, 0);
    assert_eq!(report.skipped, 3);
    assert!(corpus.is_empty().await.unwrap());
}

#[tokio::test]
async fn seeding_happens_only_once() {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS));
    let ingestor = Ingestor::new(corpus.clone()).with_embedding_provider(hashing());

    let first = ingestor.seed_if_empty(load_source_records(sources_file().path()).unwrap()).await;
    assert_eq!(first.unwrap().added, 2);

    let second = ingestor.seed_if_empty(load_source_records(sources_file().path()).unwrap()).await;
    assert_eq!(second.unwrap().added, 0);
    assert_eq!(corpus.len().await.unwrap(), 2);
}

#[tokio::test]
async fn mismatched_dimensions_abort_ingestion() {
    let corpus = Arc::new(InMemoryCorpus::new(DIMS * 2));
    let ingestor = Ingestor::new(corpus).with_embedding_provider(hashing());

    let err = ingestor.ingest(vec![record("Reef", ABSTRACTS[1].1)]).await.unwrap_err();
    assert!(matches!(err, RagError::InvalidConfiguration(_)));
}
