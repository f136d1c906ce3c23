//! Core data types that flow through the indexing and answering pipelines.

/// Persisted projection of a chunk whose embedding succeeded.
///
/// This is the only durable entity in the system: created during
/// indexing, never mutated, keyed by `(source_path, chunk_index)`.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    /// Path of the source document; unique key for the already-indexed check.
    pub source_path: String,
    /// Zero-based position of the chunk within its document.
    pub chunk_index: i64,
    /// The chunk's text as emitted by the chunker.
    pub chunk_text: String,
    /// Embedding vector produced by the configured provider.
    pub embedding: Vec<f32>,
}

/// A record returned from a nearest-neighbor query, with its similarity.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub source_path: String,
    pub chunk_index: i64,
    pub text: String,
    /// Cosine similarity to the query vector, in `[-1.0, 1.0]`.
    pub score: f64,
}
