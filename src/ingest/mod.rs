//! Document ingestion: plain-text extraction from uploaded binaries
//!
//! Accepts PDF and Word-processing-XML documents, detected by declared MIME
//! type or filename extension. Extraction may legitimately yield empty text
//! (scanned PDFs, image-only documents); rejecting that is the handler's
//! job, not ingestion's.

pub mod docx;
pub mod pdf;

use tracing::debug;

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Document formats the service can extract text from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

/// Ingestion failures
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("仅支持 PDF 或 Word (.docx/.doc) 文件")]
    UnsupportedType,

    #[error("文档解析失败：{0}")]
    ParseFailed(String),
}

/// Detect the document format from MIME type or filename extension
pub fn detect_kind(mime: &str, filename: &str) -> Option<DocumentKind> {
    let name = filename.to_lowercase();

    if mime == PDF_MIME || name.ends_with(".pdf") {
        return Some(DocumentKind::Pdf);
    }
    if mime == DOCX_MIME || name.ends_with(".docx") || name.ends_with(".doc") {
        return Some(DocumentKind::Docx);
    }
    None
}

/// Extract plain text from an uploaded document.
///
/// Returns possibly-empty text; the caller must separately reject
/// empty-after-trim output.
pub fn extract_text(bytes: &[u8], mime: &str, filename: &str) -> Result<String, IngestError> {
    let kind = detect_kind(mime, filename).ok_or(IngestError::UnsupportedType)?;

    debug!(
        "Extracting text from {:?} upload '{}' ({} bytes)",
        kind,
        filename,
        bytes.len()
    );

    match kind {
        DocumentKind::Pdf => pdf::extract(bytes),
        DocumentKind::Docx => docx::extract(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf_by_mime() {
        assert_eq!(detect_kind(PDF_MIME, "report"), Some(DocumentKind::Pdf));
    }

    #[test]
    fn test_detect_pdf_by_extension() {
        assert_eq!(
            detect_kind("application/octet-stream", "Report.PDF"),
            Some(DocumentKind::Pdf)
        );
    }

    #[test]
    fn test_detect_docx_by_mime_and_extensions() {
        assert_eq!(detect_kind(DOCX_MIME, "draft"), Some(DocumentKind::Docx));
        assert_eq!(detect_kind("", "draft.docx"), Some(DocumentKind::Docx));
        assert_eq!(detect_kind("", "legacy.doc"), Some(DocumentKind::Docx));
    }

    #[test]
    fn test_detect_rejects_other_types() {
        assert_eq!(detect_kind("text/plain", "notes.txt"), None);
        assert_eq!(detect_kind("image/png", "scan.png"), None);
    }

    #[test]
    fn test_extract_unsupported_type_errors() {
        let err = extract_text(b"hello", "text/plain", "notes.txt").unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedType));
    }

    #[test]
    fn test_extract_undecodable_docx_is_parse_failed() {
        // .doc extension accepted by detection, but the bytes are not a ZIP
        let err = extract_text(b"\xd0\xcf\x11\xe0old-word-binary", "", "legacy.doc").unwrap_err();
        assert!(matches!(err, IngestError::ParseFailed(_)));
    }
}
