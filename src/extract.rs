//! Extraction entry points.
//!
//! [`extract`] runs one document through every pipeline stage and returns
//! only once the record has been written to disk. Nothing is persisted
//! unless the model's answer parsed successfully.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::expiry::backfill_expiry;
use crate::pipeline::llm::DocumentExtractor;
use crate::pipeline::upload::Document;
use crate::pipeline::{normalize, persist};
use crate::record::ExtractionOutput;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract warranty fields from an uploaded document.
///
/// # Errors
/// - [`ExtractError::LlmApiError`] when the extraction service call fails
/// - [`ExtractError::MalformedResponse`] when its answer is not a JSON object
/// - [`ExtractError::OutputWriteFailed`] when the record cannot be saved
pub async fn extract(
    document: &Document,
    extractor: &dyn DocumentExtractor,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let start = Instant::now();
    info!(
        "Starting extraction: '{}' ({}, {} bytes)",
        document.filename,
        document.mime_type,
        document.bytes.len()
    );

    // ── Step 1: Ask the model ────────────────────────────────────────────
    let raw = extractor
        .extract_text(config.effective_prompt(), document)
        .await?;
    debug!("Model answered with {} chars", raw.len());

    // ── Step 2: Strip fences and parse ───────────────────────────────────
    let mut record = normalize::parse_record(&raw)?;

    // ── Step 3: Derive a missing expiry date ─────────────────────────────
    if backfill_expiry(&mut record) {
        debug!("expiry_date computed from purchase_date + warranty_period");
    }

    // ── Step 4: Persist ──────────────────────────────────────────────────
    let file_saved = persist::persist_record(&config.output_dir, &record).await?;

    info!(
        "Extraction complete: '{}' → {} in {}ms",
        document.filename,
        file_saved.display(),
        start.elapsed().as_millis()
    );

    Ok(ExtractionOutput {
        file_saved,
        data: record,
    })
}

/// Extract warranty fields from a local file.
pub async fn extract_file(
    path: impl AsRef<Path>,
    extractor: &dyn DocumentExtractor,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let document = Document::from_path(path).await?;
    extract(&document, extractor, config).await
}
