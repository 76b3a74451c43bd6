//! scholar - command-line front end for `scholar-rag`.

mod cli;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, EmbedderKind};
use scholar_rag::{
    AnalyzerConfig, CancelPolicy, EmbeddingProvider, HashingEmbeddingProvider, InMemoryCorpus,
    Ingestor, PlagiarismAnalyzer, Retriever, load_source_records,
};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // SCHOLAR_LOG=debug scholar analyze essay.txt --corpus sources.json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("SCHOLAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let corpus_path = cli.corpus.as_deref().context("--corpus <FILE> is required")?;
    let provider = embedding_provider(cli.embedder)?;
    let retriever = Arc::new(load_corpus(corpus_path, provider).await?);

    let output = match cli.command {
        Commands::Search { query, top_k } => {
            let matches = retriever.search(&query, top_k).await?;
            serde_json::to_value(matches)?
        }
        Commands::Analyze { file, threshold, concurrency, deadline_secs, partial, suggest } => {
            let text = read_document(&file)?;
            let config = AnalyzerConfig::builder()
                .threshold(threshold)
                .max_concurrency(concurrency)
                .cancel_policy(if partial { CancelPolicy::Partial } else { CancelPolicy::Fail })
                .build()?;
            let analyzer = PlagiarismAnalyzer::new(retriever, config)?;

            if suggest {
                serde_json::to_value(analyzer.report(&text).await?)?
            } else {
                let verdict = match deadline_secs {
                    Some(secs) => {
                        let deadline = tokio::time::sleep(Duration::from_secs(secs));
                        analyzer.analyze_until(&text, analyzer.config().threshold, deadline).await?
                    }
                    None => analyzer.analyze(&text).await?,
                };
                serde_json::to_value(verdict)?
            }
        }
    };

    print_json(&output, cli.compact)
}

fn embedding_provider(kind: EmbedderKind) -> Result<Arc<dyn EmbeddingProvider>> {
    match kind {
        EmbedderKind::Hashing => Ok(Arc::new(HashingEmbeddingProvider::default())),
        #[cfg(feature = "openai")]
        EmbedderKind::Openai => {
            Ok(Arc::new(scholar_rag::openai::OpenAIEmbeddingProvider::from_env()?))
        }
        #[cfg(not(feature = "openai"))]
        EmbedderKind::Openai => anyhow::bail!("scholar was built without the `openai` feature"),
    }
}

/// Embed every source in `path` into a fresh in-memory corpus.
async fn load_corpus(path: &Path, provider: Arc<dyn EmbeddingProvider>) -> Result<Retriever> {
    let records = load_source_records(path)
        .with_context(|| format!("failed to load corpus from {}", path.display()))?;

    let corpus = Arc::new(InMemoryCorpus::new(provider.dimensions()));
    let report = Ingestor::new(corpus.clone())
        .with_embedding_provider(provider.clone())
        .ingest(records)
        .await?;
    info!(added = report.added, skipped = report.skipped, path = %path.display(), "corpus loaded");

    let retriever =
        Retriever::builder().embedding_provider(provider).index(corpus.clone()).corpus(corpus).build()?;
    Ok(retriever)
}

fn read_document(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered =
        if compact { serde_json::to_string(value)? } else { serde_json::to_string_pretty(value)? };
    println!("{rendered}");
    Ok(())
}
