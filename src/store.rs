//! Vector-store abstraction.
//!
//! The [`VectorStore`] trait defines the four operations the pipeline
//! needs from its persistence layer: record insertion, the
//! already-indexed count, nearest-neighbor retrieval, and a connectivity
//! check (plus deletion to support explicit re-indexing). Backends are
//! pluggable; the SQLite implementation lives in
//! [`sqlite_store`](crate::sqlite_store).
//!
//! Also hosts the pure vector helpers shared by backends: BLOB
//! encoding/decoding and cosine similarity.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{RetrievedChunk, StoredRecord};

/// Abstract persistence layer for embedded chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist one record. Records are never updated in place.
    async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError>;

    /// Number of records stored for a source path (already-indexed check).
    async fn count_for_source(&self, source_path: &str) -> Result<u64, StoreError>;

    /// Delete every record for a source path, returning how many were
    /// removed. Supports explicit force re-indexing.
    async fn delete_for_source(&self, source_path: &str) -> Result<u64, StoreError>;

    /// The `k` records most similar to `query_vec`, ordered by decreasing
    /// similarity among all stored records. `search_breadth` is an upper
    /// bound on the candidate pool an index-backed backend may consider;
    /// backends without an approximate index score everything and apply
    /// it as a result bound.
    async fn nearest(
        &self,
        query_vec: &[f32],
        k: usize,
        search_breadth: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError>;

    /// Connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
///
/// Reverses [`vec_to_blob`]: reads 4-byte little-endian `f32` values
/// from the byte slice.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` for empty vectors or vectors
/// of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
