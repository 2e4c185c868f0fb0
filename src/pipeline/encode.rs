//! Encoding: raw document bytes → base64 `ImageData` attachment.
//!
//! Multimodal APIs (Gemini, OpenAI, Anthropic) accept binary content inline
//! in the JSON request body as base64 plus a MIME type. Gemini in particular
//! reads `application/pdf` directly, so PDFs are forwarded as-is with no
//! rasterisation step.

use crate::pipeline::upload::Document;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use tracing::debug;

/// Wrap a document as an inline attachment for the model request.
pub fn encode_document(doc: &Document) -> ImageData {
    let b64 = STANDARD.encode(&doc.bytes);
    debug!(
        "Encoded '{}' ({}) → {} bytes base64",
        doc.filename,
        doc.mime_type,
        b64.len()
    );

    ImageData::new(b64, doc.mime_type.clone()).with_detail("high")
}
