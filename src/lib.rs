//! # warranty-extract
//!
//! Extract warranty details from scanned cards, receipts and invoices using
//! Vision Language Models (VLMs).
//!
//! A document (image or PDF) goes to a multimodal model with a fixed prompt.
//! The model's free-form answer is cleaned of markdown fences, parsed as a
//! JSON warranty record, completed with a computed expiry date when the
//! document only states a purchase date and a coverage period, and saved to
//! `outputs/warranty_<timestamp>.json`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (image / PDF)
//!  │
//!  ├─ 1. Receive    validate the `file` part, settle its MIME type
//!  ├─ 2. Encode     bytes → base64 inline attachment
//!  ├─ 3. VLM        one call to gemini / gpt / claude / …, no retry
//!  ├─ 4. Normalize  strip ```json fences, parse the JSON object
//!  ├─ 5. Backfill   expiry_date = purchase_date + warranty_period
//!  └─ 6. Persist    indented JSON, one file per extraction
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warranty_extract::{extract_file, resolve_extractor, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from GEMINI_API_KEY / OPENAI_API_KEY / …
//!     let config = ExtractionConfig::default();
//!     let extractor = resolve_extractor(&config)?;
//!     let output = extract_file("warranty_card.jpg", extractor.as_ref(), &config).await?;
//!     println!("{}", serde_json::to_string_pretty(&output.data)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `warranty-extract` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod expiry;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::ExtractError;
pub use expiry::{backfill_expiry, calculate_expiry};
pub use extract::{extract, extract_file};
pub use pipeline::llm::{resolve_extractor, DocumentExtractor, LlmDocumentExtractor};
pub use pipeline::normalize::{parse_record, strip_code_fences};
pub use pipeline::upload::Document;
pub use record::{ExtractionOutput, WarrantyRecord};
pub use server::AppState;
