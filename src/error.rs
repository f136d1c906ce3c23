//! Error taxonomy for the pipeline boundaries.
//!
//! Three failure domains exist: document extraction, provider calls
//! (embedding and generation), and the vector store. Indexing adds a
//! fourth enum that names which boundary aborted a document.

use thiserror::Error;

/// Failure to turn a source document into plain text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed for {path}: {message}")]
    Pdf { path: String, message: String },
    #[error("no extractable text in {path}")]
    Empty { path: String },
}

/// Failure of an embedding or generation call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing API key: {0} is not set")]
    MissingApiKey(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure of a vector-store read or write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Why indexing a single document aborted.
///
/// Per-chunk embedding failures are normally recovered by skipping the
/// chunk; `Embedding` only occurs under strict indexing.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("embedding failed for chunk {index}: {source}")]
    Embedding {
        index: usize,
        #[source]
        source: ProviderError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}
