//! Resume text extraction. Picks a parser from the uploaded file's extension.

use std::path::Path;

use thiserror::Error;

mod docx;
mod ocr;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Document formats the matcher can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
    Image,
}

impl DocumentKind {
    /// Detects the format from the file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(file_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();

        match ext.as_str() {
            ".pdf" => Ok(DocumentKind::Pdf),
            ".docx" => Ok(DocumentKind::Docx),
            ".txt" => Ok(DocumentKind::PlainText),
            ".jpg" | ".jpeg" | ".png" => Ok(DocumentKind::Image),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Docx => ".docx",
            DocumentKind::PlainText => ".txt",
            DocumentKind::Image => ".png",
        }
    }
}

/// Extracts plain text from an uploaded resume.
///
/// Blocking: PDF parsing and OCR are CPU-bound and OCR spawns a process.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match DocumentKind::from_file_name(file_name)? {
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map(|text| text.trim().to_string())
            .map_err(|e| ExtractError::Pdf(e.to_string())),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
        DocumentKind::PlainText => Ok(decode_utf8_dropping_invalid(bytes)),
        kind @ DocumentKind::Image => ocr::extract_image_text(bytes, kind.extension()),
    }
}

/// UTF-8 decode that skips invalid byte sequences instead of substituting U+FFFD.
fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
