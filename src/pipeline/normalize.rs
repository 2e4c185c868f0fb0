//! Normalisation: best-effort conversion of model text into a record.
//!
//! The prompt asks for bare JSON, but models routinely wrap their answer in a
//! ```` ```json ```` fence anyway. Stripping that wrapper is the only repair
//! attempted. If what remains is not a JSON object the whole answer is
//! returned inside the error so it can be inspected by hand.

use crate::error::ExtractError;
use crate::record::WarrantyRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

static RE_FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?[ \t]*```$").unwrap());

/// Remove an outer markdown code fence, if present, and trim.
///
/// Handles ```` ```json ````, ```` ```JSON ````, bare ```` ``` ```` and a
/// missing closing fence (truncated output). Text without a leading fence is
/// only trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let text = raw.trim();
    if let Some(caps) = RE_FENCED.captures(text) {
        if let Some(body) = caps.get(1) {
            return body.as_str().trim();
        }
    }
    if text.starts_with("```") {
        // Opening fence without a closing one: drop the fence line.
        return match text.split_once('\n') {
            Some((_, rest)) => rest.trim(),
            None => text.trim_start_matches('`').trim(),
        };
    }
    text
}

/// Parse the model's answer into a [`WarrantyRecord`].
///
/// # Errors
/// [`ExtractError::MalformedResponse`] with the trimmed raw text when the
/// answer is not a JSON object after fence stripping.
pub fn parse_record(raw: &str) -> Result<WarrantyRecord, ExtractError> {
    let malformed = || ExtractError::MalformedResponse {
        raw_output: raw.trim().to_string(),
    };

    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body).map_err(|e| {
        warn!("Model output is not valid JSON: {}", e);
        malformed()
    })?;

    if !value.is_object() {
        warn!("Model output is JSON but not an object");
        return Err(malformed());
    }

    serde_json::from_value(value).map_err(|e| {
        warn!("Model output does not fit a warranty record: {}", e);
        malformed()
    })
}
