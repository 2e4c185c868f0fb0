//! Pipeline stages for warranty extraction.
//!
//! Each submodule implements exactly one step, so each can be tested without
//! the others and without a live model.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ encode ──▶ llm ──▶ normalize ──▶ expiry ──▶ persist
//! (multipart) (base64)  (VLM)   (fences/JSON) (backfill)  (outputs/)
//! ```
//!
//! 1. [`upload`]    — validate the uploaded file and settle its MIME type
//! 2. [`encode`]    — base64-wrap the bytes as an inline attachment
//! 3. [`llm`]       — one call to the extraction service, no retry
//! 4. [`normalize`] — strip markdown fences and parse the JSON object
//! 5. [`crate::expiry`] — derive a missing expiry date
//! 6. [`persist`]   — write the record to a timestamped file

pub mod encode;
pub mod llm;
pub mod normalize;
pub mod persist;
pub mod upload;
