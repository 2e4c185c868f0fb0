//! Receive stage: turn an uploaded file into a validated [`Document`].
//!
//! Browsers and HTTP clients are inconsistent about the `Content-Type` they
//! attach to a multipart file part. Many send `application/octet-stream` for
//! everything, which the vision model cannot interpret. When that happens
//! we fall back to guessing from the filename extension.

use crate::error::ExtractError;
use std::path::Path;
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// An uploaded document ready to send to the model.
#[derive(Debug, Clone)]
pub struct Document {
    /// Client-supplied filename, never empty.
    pub filename: String,
    /// MIME type forwarded to the model, e.g. `image/jpeg`, `application/pdf`.
    pub mime_type: String,
    /// Raw file content.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Validate an upload.
    ///
    /// `filename` is `None` when the request had no file part at all.
    pub fn from_upload(
        filename: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<Self, ExtractError> {
        let filename = filename.ok_or(ExtractError::NoFileUploaded)?;
        if filename.is_empty() {
            return Err(ExtractError::EmptyFilename);
        }

        let mime_type = resolve_mime(content_type, filename);
        debug!(
            "Received upload '{}' ({}, {} bytes)",
            filename,
            mime_type,
            bytes.len()
        );

        Ok(Self {
            filename: filename.to_string(),
            mime_type,
            bytes,
        })
    }

    /// Read a local file, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExtractError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ExtractError::Internal(format!("Failed to read '{}': {}", path.display(), e))
            }
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::from_upload(Some(&filename), None, bytes)
    }
}

/// Pick the MIME type to forward: the declared one unless it is missing or
/// generic, then a guess from the filename, then `application/octet-stream`.
pub fn resolve_mime(content_type: Option<&str>, filename: &str) -> String {
    match content_type.map(str::trim) {
        Some(ct) if !ct.is_empty() && ct != OCTET_STREAM => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| OCTET_STREAM.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_part_is_no_file() {
        let err = Document::from_upload(None, None, vec![]).unwrap_err();
        assert!(matches!(err, ExtractError::NoFileUploaded));
    }

    #[test]
    fn empty_filename_rejected() {
        let err = Document::from_upload(Some(""), Some("image/png"), vec![1]).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyFilename));
    }

    #[test]
    fn declared_mime_is_kept() {
        let doc = Document::from_upload(Some("card.bin"), Some("image/png"), vec![1, 2]).unwrap();
        assert_eq!(doc.mime_type, "image/png");
        assert_eq!(doc.bytes, vec![1, 2]);
    }

    #[test]
    fn generic_mime_is_guessed_from_extension() {
        assert_eq!(resolve_mime(Some(OCTET_STREAM), "receipt.pdf"), "application/pdf");
        assert_eq!(resolve_mime(None, "card.JPG"), "image/jpeg");
        assert_eq!(resolve_mime(Some(""), "card.png"), "image/png");
    }

    #[test]
    fn unknown_extension_falls_back_to_octet_stream() {
        assert_eq!(resolve_mime(None, "warranty"), OCTET_STREAM);
    }

    #[tokio::test]
    async fn from_path_reads_file() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4").unwrap();

        let doc = Document::from_path(tmp.path()).await.unwrap();
        assert_eq!(doc.mime_type, "application/pdf");
        assert_eq!(doc.bytes, b"%PDF-1.4");
        assert!(doc.filename.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = Document::from_path("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }
}
