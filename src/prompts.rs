//! Prompts sent to the vision model.
//!
//! Kept in one place so prompt changes never touch request or parsing code,
//! and so tests can check the prompt still names every field the record
//! expects. Callers can override the default via
//! [`crate::config::ExtractionConfig::prompt`].

/// Default instruction sent alongside every uploaded document.
pub const DEFAULT_EXTRACTION_PROMPT: &str = "You are an AI warranty card extractor. Analyze the attached document \
(which may be a PDF or image) and extract the following fields in JSON format:
Fields: name, product, model_number, serial_number, purchase_date, warranty_period, expiry_date, contact_info.
Write purchase_date and expiry_date as DD-MM-YYYY.
If any field is missing or unreadable, return it as null.
Strictly return only valid JSON. No markdown, no explanation, no extra text.";
