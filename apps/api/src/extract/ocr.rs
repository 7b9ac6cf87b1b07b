use std::io::Write;
use std::process::Command;

use tracing::debug;

use super::ExtractError;

const TESSERACT_BIN: &str = "tesseract";

/// Runs the `tesseract` CLI over an image and returns the recognized text.
/// The image is staged in a temp file that is removed when this returns.
pub fn extract_image_text(bytes: &[u8], extension: &str) -> Result<String, ExtractError> {
    let mut staged = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(extension)
        .tempfile()
        .map_err(|e| ExtractError::Ocr(format!("failed to stage image: {e}")))?;
    staged
        .write_all(bytes)
        .and_then(|_| staged.flush())
        .map_err(|e| ExtractError::Ocr(format!("failed to stage image: {e}")))?;

    debug!("Running OCR on {}", staged.path().display());
    let output = Command::new(TESSERACT_BIN)
        .arg(staged.path())
        .arg("stdout")
        .output()
        .map_err(|e| ExtractError::Ocr(format!("could not run {TESSERACT_BIN}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Ocr(format!(
            "{TESSERACT_BIN} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
