//! Indexing orchestrator: extract → chunk → embed → store.
//!
//! Runs once per document at ingest time as a sequential, blocking
//! pipeline. Embedding failures are recovered per chunk by default
//! (skip and warn — a partial index is an accepted outcome); strict
//! mode turns the first embedding failure into an abort. Extraction
//! and store failures always abort the document. Records already
//! inserted are never rolled back.

use std::path::Path;
use tracing::{info, warn};

use crate::chunk::chunk_text;
use crate::error::{IndexError, StoreError};
use crate::extract::TextExtractor;
use crate::models::StoredRecord;
use crate::provider::LlmProvider;
use crate::store::VectorStore;

/// Indexing policy knobs, threaded from configuration and CLI flags.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
    /// When set, the first embedding failure aborts the document instead
    /// of skipping the chunk.
    pub strict: bool,
}

/// What indexing one document produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOutcome {
    pub total_chunks: usize,
    pub stored: usize,
    pub skipped: usize,
}

/// True when the store already holds records for this source path.
///
/// Callers check this before [`index_document`]; re-indexing without an
/// explicit force delete is a caller error, not silent deduplication.
pub async fn already_indexed(
    store: &dyn VectorStore,
    path: &Path,
) -> Result<bool, StoreError> {
    let count = store.count_for_source(&path.display().to_string()).await?;
    Ok(count > 0)
}

/// Index one document: extract its text, chunk it, embed each chunk in
/// order, and insert a record per successful embedding.
pub async fn index_document(
    extractor: &dyn TextExtractor,
    provider: &dyn LlmProvider,
    store: &dyn VectorStore,
    path: &Path,
    options: &IndexOptions,
) -> Result<IndexOutcome, IndexError> {
    let source_path = path.display().to_string();
    info!(path = %source_path, provider = provider.name(), "indexing document");

    let text = extractor.extract(path)?;
    let chunks = chunk_text(&text, options.min_chunk_size, options.max_chunk_size);
    let total_chunks = chunks.len();

    let mut stored = 0usize;
    let mut skipped = 0usize;

    for (index, chunk) in chunks.into_iter().enumerate() {
        let embedding = match provider.embed(&chunk).await {
            Ok(vec) => vec,
            Err(source) => {
                if options.strict {
                    return Err(IndexError::Embedding { index, source });
                }
                warn!(
                    path = %source_path,
                    chunk = index,
                    error = %source,
                    "skipping chunk: embedding failed"
                );
                skipped += 1;
                continue;
            }
        };

        let record = StoredRecord {
            source_path: source_path.clone(),
            chunk_index: index as i64,
            chunk_text: chunk,
            embedding,
        };
        store.insert(&record).await?;
        stored += 1;
        info!(path = %source_path, "stored chunk {}/{}", index + 1, total_chunks);
    }

    info!(
        path = %source_path,
        total = total_chunks,
        stored,
        skipped,
        "finished indexing"
    );

    Ok(IndexOutcome {
        total_chunks,
        stored,
        skipped,
    })
}
