//! PDF text extraction collaborator.
//!
//! The indexing pipeline only sees the [`TextExtractor`] trait, so tests
//! can substitute a deterministic double; [`PdfExtractor`] is the real
//! implementation backed by `pdf-extract`.

use std::path::Path;

use crate::error::ExtractError;

/// Turns a document path into plain text, or fails.
pub trait TextExtractor: Send + Sync {
    /// Extract the full text of the document at `path`.
    ///
    /// Extraction yielding no text at all is an error: a document that
    /// cannot contribute any chunk must abort indexing rather than
    /// silently produce an empty index.
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// PDF extraction via `pdf-extract`.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let display = path.display().to_string();

        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: display.clone(),
            source,
        })?;

        let text =
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf {
                path: display.clone(),
                message: e.to_string(),
            })?;

        if text.trim().is_empty() {
            return Err(ExtractError::Empty { path: display });
        }

        Ok(text)
    }
}
