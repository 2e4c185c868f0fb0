//! Configuration types for warranty extraction.
//!
//! Everything the pipeline needs is carried in [`ExtractionConfig`], built
//! once at startup via [`ExtractionConfigBuilder`] and passed explicitly to
//! request handlers. No code reads configuration from globals.

use crate::error::ExtractError;
use crate::pipeline::llm::DocumentExtractor;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default directory for persisted warranty records.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Default vision model for Gemini, the preferred provider.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default model when `openai` is named without a model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";

/// Configuration for the extraction pipeline.
///
/// # Example
/// ```rust
/// use warranty_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .output_dir("/tmp/warranties")
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.output_dir.to_str(), Some("/tmp/warranties"));
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Directory receiving one `warranty_<timestamp>.json` per extraction.
    /// Default: `outputs`.
    pub output_dir: PathBuf,

    /// LLM model identifier, e.g. "gemini-2.0-flash", "gpt-4.1-mini".
    /// If None, the named provider's default model is used; providers
    /// without one are rejected at resolution.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    /// If None along with `extractor`, the provider is auto-detected.
    pub provider_name: Option<String>,

    /// Pre-constructed extractor. Takes precedence over `provider_name`.
    pub extractor: Option<Arc<dyn DocumentExtractor>>,

    /// Sampling temperature for the completion. Default: 0.0.
    ///
    /// Field extraction is transcription, not writing.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 1024.
    pub max_tokens: usize,

    /// Custom extraction prompt. If None, uses
    /// [`crate::prompts::DEFAULT_EXTRACTION_PROMPT`].
    pub prompt: Option<String>,

    /// Largest accepted upload in bytes. Default: 20 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            model: None,
            provider_name: None,
            extractor: None,
            temperature: 0.0,
            max_tokens: 1024,
            prompt: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("output_dir", &self.output_dir)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn DocumentExtractor>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("prompt", &self.prompt.as_ref().map(|p| p.len()))
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The prompt actually sent to the model.
    pub fn effective_prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or(crate::prompts::DEFAULT_EXTRACTION_PROMPT)
    }
}

/// Builder for [`ExtractionConfig`].
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl fmt::Debug for ExtractionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ExtractionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.prompt = Some(prompt.into());
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.max_upload_bytes == 0 {
            return Err(ExtractError::InvalidConfig(
                "max_upload_bytes must be ≥ 1".into(),
            ));
        }
        if c.prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ExtractError::InvalidConfig("Prompt must not be blank".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.temperature, 0.0);
        assert!(config.effective_prompt().contains("warranty"));
    }

    #[test]
    fn builder_clamps_temperature() {
        let config = ExtractionConfig::builder().temperature(9.0).build().unwrap();
        assert_eq!(config.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_empty_output_dir() {
        let err = ExtractionConfig::builder().output_dir("").build().unwrap_err();
        assert!(matches!(err, ExtractError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_prompt() {
        assert!(ExtractionConfig::builder().prompt("   ").build().is_err());
    }

    #[test]
    fn custom_prompt_wins() {
        let config = ExtractionConfig::builder().prompt("Return JSON").build().unwrap();
        assert_eq!(config.effective_prompt(), "Return JSON");
    }

    #[test]
    fn debug_hides_extractor() {
        let dbg = format!("{:?}", ExtractionConfig::default());
        assert!(dbg.contains("ExtractionConfig"));
        assert!(dbg.contains("outputs"));
    }
}
