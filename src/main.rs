//! # ragline CLI
//!
//! Command-line entry point for the PDF question-answering pipeline.
//!
//! ```bash
//! # index a PDF (skipped if already indexed; --force re-indexes)
//! ragline --index report.pdf
//!
//! # interactive question/answer loop (type 'exit' to quit)
//! ragline --qa
//!
//! # connectivity self-test (store + provider credentials)
//! ragline --test
//! ```
//!
//! Configuration comes from environment variables (a `.env` file is
//! honored): `DATABASE_URL` (mandatory SQLite path), `LLM_PROVIDER`
//! (`GEMINI` default, or `OPENAI`), `GOOGLE_API_KEY` / `OPENAI_API_KEY`,
//! and optional `MIN_CHUNK_SIZE`, `MAX_CHUNK_SIZE`,
//! `REQUEST_TIMEOUT_SECS`.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ragline::answer::answer;
use ragline::config::Config;
use ragline::db;
use ragline::extract::PdfExtractor;
use ragline::ingest::{already_indexed, index_document, IndexOptions};
use ragline::provider::{create_provider, LlmProvider};
use ragline::sqlite_store::SqliteStore;
use ragline::store::VectorStore;

/// PDF question answering: index documents, then ask about them.
#[derive(Parser)]
#[command(
    name = "ragline",
    about = "Index PDF documents and answer questions about them with retrieval-augmented generation",
    version
)]
struct Cli {
    /// Path of a PDF file to index.
    #[arg(long, value_name = "PDF_PATH")]
    index: Option<std::path::PathBuf>,

    /// Start an interactive question/answer loop.
    #[arg(long)]
    qa: bool,

    /// Test store connectivity and provider credentials.
    #[arg(long)]
    test: bool,

    /// Delete existing records for the file before indexing it again.
    #[arg(long, requires = "index")]
    force: bool,

    /// Abort indexing on the first embedding failure instead of skipping
    /// the chunk.
    #[arg(long, requires = "index")]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if cli.index.is_none() && !cli.qa && !cli.test {
        Cli::command().print_help()?;
        return Ok(());
    }

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_path)
        .await
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let store = SqliteStore::new(pool);
    store.init_schema().await?;

    if cli.test {
        run_self_test(&store, &config).await;
    }

    if cli.index.is_some() || cli.qa {
        let provider = create_provider(&config).context("failed to construct LLM provider")?;

        if let Some(path) = &cli.index {
            run_index(&store, provider.as_ref(), &config, path, cli.force, cli.strict).await?;
        }

        if cli.qa {
            run_qa_loop(&store, provider.as_ref()).await?;
        }
    }

    store.close().await;
    Ok(())
}

/// Index one document, honoring the already-indexed guard and `--force`.
async fn run_index(
    store: &SqliteStore,
    provider: &dyn LlmProvider,
    config: &Config,
    path: &Path,
    force: bool,
    strict: bool,
) -> Result<()> {
    if already_indexed(store, path).await? {
        if !force {
            info!(path = %path.display(), "already indexed; use --force to re-index");
            return Ok(());
        }
        let removed = store.delete_for_source(&path.display().to_string()).await?;
        info!(path = %path.display(), removed, "removed existing records for re-index");
    }

    let options = IndexOptions {
        min_chunk_size: config.min_chunk_size,
        max_chunk_size: config.max_chunk_size,
        strict,
    };

    match index_document(&PdfExtractor, provider, store, path, &options).await {
        Ok(outcome) => {
            info!(
                stored = outcome.stored,
                skipped = outcome.skipped,
                total = outcome.total_chunks,
                "indexing complete"
            );
        }
        // A failed document is not fatal to the process; the caller can
        // fix the input or provider and retry.
        Err(e) => {
            error!(path = %path.display(), error = %e, "indexing aborted");
        }
    }
    Ok(())
}

/// Read questions from stdin until the `exit` sentinel.
async fn run_qa_loop(store: &SqliteStore, provider: &dyn LlmProvider) -> Result<()> {
    println!("--- Ready to answer questions! ---");
    let stdin = std::io::stdin();

    loop {
        print!("Ask a question about the document (or type 'exit'): ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = answer(provider, store, query).await;
        println!("\nAnswer:\n{}\n{}", reply, "-".repeat(20));
    }

    Ok(())
}

/// Connectivity self-test: store ping plus one authenticated provider
/// round-trip to validate the API key.
async fn run_self_test(store: &SqliteStore, config: &Config) {
    info!("testing store connectivity...");
    match store.ping().await {
        Ok(()) => info!("store connection successful"),
        Err(e) => error!(error = %e, "store connection failed"),
    }

    info!(provider = %config.provider, "testing provider credentials...");
    match create_provider(config) {
        Ok(provider) => match provider.health_check().await {
            Ok(()) => info!(provider = %config.provider, "provider API key is valid"),
            Err(e) => error!(provider = %config.provider, error = %e, "provider check failed"),
        },
        Err(e) => warn!(provider = %config.provider, error = %e, "provider not configured"),
    }
}
