//! End-to-end orchestrator tests with counting test doubles.
//!
//! The doubles implement the same traits the binary wires up, so these
//! tests exercise the real indexing and answering control flow without
//! a network or a database file.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use ragline::answer::{answer, APOLOGY, NO_CONTEXT, RETRIEVAL_FAILED};
use ragline::error::{ExtractError, IndexError, ProviderError, StoreError};
use ragline::extract::TextExtractor;
use ragline::ingest::{already_indexed, index_document, IndexOptions};
use ragline::models::{RetrievedChunk, StoredRecord};
use ragline::provider::LlmProvider;
use ragline::store::VectorStore;

struct FixedExtractor {
    text: Option<String>,
}

impl TextExtractor for FixedExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        match &self.text {
            Some(text) => Ok(text.clone()),
            None => Err(ExtractError::Empty {
                path: path.display().to_string(),
            }),
        }
    }
}

/// Provider double: fails `embed` for chosen call indices, records the
/// generation prompt, and counts every call.
#[derive(Default)]
struct FakeProvider {
    embed_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    fail_embed_calls: Vec<usize>,
    fail_all_embeds: bool,
    fail_generate: bool,
    last_prompt: Mutex<Option<String>>,
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &str {
        "FAKE"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let call = self.embed_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all_embeds || self.fail_embed_calls.contains(&call) {
            return Err(ProviderError::MalformedResponse("simulated".to_string()));
        }
        // Distinct but deterministic vector per text.
        Ok(vec![text.len() as f32, 1.0])
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generate {
            return Err(ProviderError::Api {
                status: 500,
                body: "quota exceeded".to_string(),
            });
        }
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        Ok("generated answer".to_string())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// In-memory store double with call counters and canned retrieval results.
#[derive(Default)]
struct FakeStore {
    records: Mutex<Vec<StoredRecord>>,
    nearest_calls: AtomicUsize,
    nearest_results: Vec<RetrievedChunk>,
    fail_nearest: bool,
}

#[async_trait]
impl VectorStore for FakeStore {
    async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn count_for_source(&self, source_path: &str) -> Result<u64, StoreError> {
        let count = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.source_path == source_path)
            .count();
        Ok(count as u64)
    }

    async fn delete_for_source(&self, source_path: &str) -> Result<u64, StoreError> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.source_path != source_path);
        Ok((before - records.len()) as u64)
    }

    async fn nearest(
        &self,
        _query_vec: &[f32],
        k: usize,
        _search_breadth: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        self.nearest_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_nearest {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        let mut results = self.nearest_results.clone();
        results.truncate(k);
        Ok(results)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn options() -> IndexOptions {
    IndexOptions {
        min_chunk_size: 5,
        max_chunk_size: 8000,
        strict: false,
    }
}

fn three_paragraphs() -> String {
    "first paragraph body\n\nsecond paragraph body\n\nthird paragraph body".to_string()
}

fn retrieved(text: &str, index: i64, score: f64) -> RetrievedChunk {
    RetrievedChunk {
        source_path: "doc.pdf".to_string(),
        chunk_index: index,
        text: text.to_string(),
        score,
    }
}

#[tokio::test]
async fn indexing_stores_one_record_per_chunk_in_order() {
    let extractor = FixedExtractor {
        text: Some(three_paragraphs()),
    };
    let provider = FakeProvider::default();
    let store = FakeStore::default();

    let outcome = index_document(&extractor, &provider, &store, Path::new("doc.pdf"), &options())
        .await
        .unwrap();

    assert_eq!(outcome.total_chunks, 3);
    assert_eq!(outcome.stored, 3);
    assert_eq!(outcome.skipped, 0);

    let records = store.records.lock().unwrap();
    let indices: Vec<i64> = records.iter().map(|r| r.chunk_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(records.iter().all(|r| r.source_path == "doc.pdf"));
    assert!(records.iter().all(|r| !r.embedding.is_empty()));
}

#[tokio::test]
async fn embedding_failure_skips_chunk_and_continues() {
    let extractor = FixedExtractor {
        text: Some(three_paragraphs()),
    };
    let provider = FakeProvider {
        fail_embed_calls: vec![1],
        ..Default::default()
    };
    let store = FakeStore::default();

    let outcome = index_document(&extractor, &provider, &store, Path::new("doc.pdf"), &options())
        .await
        .unwrap();

    assert_eq!(outcome.total_chunks, 3);
    assert_eq!(outcome.stored, 2);
    assert_eq!(outcome.skipped, 1);

    let records = store.records.lock().unwrap();
    assert_eq!(records.len(), 2);
    // The failed chunk left no record, partial or otherwise.
    assert!(records.iter().all(|r| r.chunk_index != 1));
}

#[tokio::test]
async fn strict_indexing_aborts_on_first_embedding_failure() {
    let extractor = FixedExtractor {
        text: Some(three_paragraphs()),
    };
    let provider = FakeProvider {
        fail_embed_calls: vec![1],
        ..Default::default()
    };
    let store = FakeStore::default();
    let opts = IndexOptions {
        strict: true,
        ..options()
    };

    let err = index_document(&extractor, &provider, &store, Path::new("doc.pdf"), &opts)
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::Embedding { index: 1, .. }));
    // The chunk before the failure stays stored; no rollback.
    assert_eq!(store.records.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_extraction_inserts_nothing() {
    let extractor = FixedExtractor { text: None };
    let provider = FakeProvider::default();
    let store = FakeStore::default();

    let err = index_document(&extractor, &provider, &store, Path::new("doc.pdf"), &options())
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::Extract(ExtractError::Empty { .. })));
    assert!(store.records.lock().unwrap().is_empty());
    assert_eq!(provider.embed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn already_indexed_verdict_is_stable() {
    let store = FakeStore::default();
    let path = Path::new("doc.pdf");

    assert!(!already_indexed(&store, path).await.unwrap());
    assert!(!already_indexed(&store, path).await.unwrap());

    store
        .insert(&StoredRecord {
            source_path: "doc.pdf".to_string(),
            chunk_index: 0,
            chunk_text: "body".to_string(),
            embedding: vec![1.0],
        })
        .await
        .unwrap();

    assert!(already_indexed(&store, path).await.unwrap());
    assert!(already_indexed(&store, path).await.unwrap());
}

#[tokio::test]
async fn failed_query_embedding_returns_apology_without_retrieval() {
    let provider = FakeProvider {
        fail_all_embeds: true,
        ..Default::default()
    };
    let store = FakeStore::default();

    let reply = answer(&provider, &store, "what is this about?").await;

    assert_eq!(reply, APOLOGY);
    assert_eq!(store.nearest_calls.load(Ordering::SeqCst), 0);
    assert_eq!(provider.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_retrieval_skips_generation() {
    let provider = FakeProvider::default();
    let store = FakeStore::default();

    let reply = answer(&provider, &store, "anything indexed?").await;

    assert_eq!(reply, NO_CONTEXT);
    assert_eq!(store.nearest_calls.load(Ordering::SeqCst), 1);
    assert_eq!(provider.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn answer_assembles_context_in_store_order() {
    let provider = FakeProvider::default();
    let store = FakeStore {
        nearest_results: vec![
            retrieved("most similar chunk", 3, 0.9),
            retrieved("second chunk", 0, 0.7),
        ],
        ..Default::default()
    };

    let reply = answer(&provider, &store, "what is this about?").await;
    assert_eq!(reply, "generated answer");

    let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("most similar chunk\n\nsecond chunk"));
    assert!(prompt.contains("Question: what is this about?"));
}

#[tokio::test]
async fn generation_failure_is_surfaced_in_the_reply() {
    let provider = FakeProvider {
        fail_generate: true,
        ..Default::default()
    };
    let store = FakeStore {
        nearest_results: vec![retrieved("some context", 0, 0.8)],
        ..Default::default()
    };

    let reply = answer(&provider, &store, "why?").await;

    assert!(reply.starts_with("Error generating answer:"));
    assert!(reply.contains("quota exceeded"));
}

#[tokio::test]
async fn store_outage_during_answering_returns_fixed_notice() {
    let provider = FakeProvider::default();
    let store = FakeStore {
        fail_nearest: true,
        ..Default::default()
    };

    let reply = answer(&provider, &store, "anything?").await;

    assert_eq!(reply, RETRIEVAL_FAILED);
    assert_eq!(provider.generate_calls.load(Ordering::SeqCst), 0);
}
