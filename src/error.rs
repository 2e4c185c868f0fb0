//! Error types for the warranty-extract library.
//!
//! A single enum, [`ExtractError`], covers every way a request can fail.
//! Variants fall into four classes:
//!
//! * **Client input** — the upload is missing or has an empty filename.
//!   Surfaced as HTTP 400 with `{"error": …}`.
//! * **Upstream** — the vision model could not be configured or its call
//!   failed. Surfaced as HTTP 500 with the underlying message; never retried.
//! * **Malformed response** — the model answered, but not with a JSON
//!   object. Surfaced as HTTP 500 with the raw text attached so a human can
//!   inspect what the model actually said.
//! * **Local failures** — output file could not be written, bad config, etc.
//!
//! Expiry-date computation failures are not represented here at all: they
//! are recovered inside [`crate::expiry`] and leave the field null.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the warranty-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Client input errors ───────────────────────────────────────────────
    /// The request carried no `file` part.
    #[error("No file uploaded")]
    NoFileUploaded,

    /// The `file` part was present but its filename was empty.
    #[error("Empty filename")]
    EmptyFilename,

    /// The multipart body could not be read (malformed, too large, …).
    #[error("Invalid upload: {message}")]
    UploadFailed { status: u16, message: String },

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The extraction service call failed.
    #[error("{message}")]
    LlmApiError { message: String },

    /// The model output is not a JSON object even after fence stripping.
    #[error("Failed to parse JSON from model response")]
    MalformedResponse { raw_output: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Local input file (CLI `extract`) was not found.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// True for errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ExtractError::NoFileUploaded | ExtractError::EmptyFilename)
    }

    /// HTTP status code the server answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ExtractError::UploadFailed { status, .. } => *status,
            e if e.is_client_error() => 400,
            _ => 500,
        }
    }

    /// Raw model output, when the failure was a parse failure.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            ExtractError::MalformedResponse { raw_output } => Some(raw_output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_keeps_its_status() {
        let e = ExtractError::UploadFailed {
            status: 413,
            message: "length limit exceeded".into(),
        };
        assert_eq!(e.status_code(), 413);
        assert!(!e.is_client_error());
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(ExtractError::NoFileUploaded.status_code(), 400);
        assert_eq!(ExtractError::EmptyFilename.status_code(), 400);
        assert_eq!(ExtractError::NoFileUploaded.to_string(), "No file uploaded");
        assert_eq!(ExtractError::EmptyFilename.to_string(), "Empty filename");
    }

    #[test]
    fn upstream_error_display_is_bare_message() {
        let e = ExtractError::LlmApiError {
            message: "503 Service Unavailable".into(),
        };
        assert_eq!(e.to_string(), "503 Service Unavailable");
        assert_eq!(e.status_code(), 500);
        assert!(e.raw_output().is_none());
    }

    #[test]
    fn malformed_response_keeps_raw_text() {
        let e = ExtractError::MalformedResponse {
            raw_output: "Sorry, I cannot read this".into(),
        };
        assert_eq!(e.status_code(), 500);
        assert_eq!(e.raw_output(), Some("Sorry, I cannot read this"));
        assert!(e.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn output_write_failed_display() {
        let e = ExtractError::OutputWriteFailed {
            path: PathBuf::from("outputs/warranty_20240101_000000.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = e.to_string();
        assert!(msg.contains("warranty_20240101_000000.json"), "got: {msg}");
        assert!(msg.contains("denied"), "got: {msg}");
    }
}
