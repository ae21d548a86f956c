//! PDF text extraction
//!
//! Wraps the pdf-extract crate. Encrypted or corrupted files surface as
//! `ParseFailed`; scanned image-only PDFs decode successfully but yield
//! little or no text, which the handler rejects downstream.

use super::IngestError;

/// Extract plain text from PDF bytes
pub fn extract(bytes: &[u8]) -> Result<String, IngestError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| IngestError::ParseFailed(e.to_string()))
}
