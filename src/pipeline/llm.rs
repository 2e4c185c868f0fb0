//! Model interaction: send the document plus prompt, get free-form text back.
//!
//! The rest of the pipeline only sees the [`DocumentExtractor`] trait, so the
//! HTTP layer and tests can swap in a scripted extractor without touching a
//! real provider. [`LlmDocumentExtractor`] is the production implementation
//! backed by an `edgequake_llm` provider.
//!
//! There is deliberately no retry loop here: a failed call fails the request.

use crate::config::{ExtractionConfig, DEFAULT_MODEL, DEFAULT_OPENAI_MODEL};
use crate::error::ExtractError;
use crate::pipeline::encode::encode_document;
use crate::pipeline::upload::Document;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Something that reads a document and answers with (hopefully) JSON text.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Send `prompt` and `document` to the extraction service and return its
    /// raw text answer.
    async fn extract_text(&self, prompt: &str, document: &Document) -> Result<String, ExtractError>;
}

/// [`DocumentExtractor`] backed by a vision-capable LLM provider.
pub struct LlmDocumentExtractor {
    provider: Arc<dyn LLMProvider>,
    options: CompletionOptions,
}

impl LlmDocumentExtractor {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &ExtractionConfig) -> Self {
        Self {
            provider,
            options: build_options(config),
        }
    }
}

#[async_trait]
impl DocumentExtractor for LlmDocumentExtractor {
    async fn extract_text(&self, prompt: &str, document: &Document) -> Result<String, ExtractError> {
        let start = Instant::now();

        // Prompt and attachment travel in the same user turn.
        let messages = vec![ChatMessage::user_with_images(
            prompt,
            vec![encode_document(document)],
        )];

        match self.provider.chat(&messages, Some(&self.options)).await {
            Ok(response) => {
                debug!(
                    "'{}': {} input tokens, {} output tokens, {:?}",
                    document.filename,
                    response.prompt_tokens,
                    response.completion_tokens,
                    start.elapsed()
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!("'{}': extraction call failed — {}", document.filename, e);
                Err(ExtractError::LlmApiError {
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Build `CompletionOptions` from the extraction config.
fn build_options(config: &ExtractionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Instantiate a named provider with the given model.
fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExtractError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Model used when a provider is named without one.
///
/// Only providers with a stable vision model get a default; the rest need an
/// explicit `model`.
pub fn default_model_for(provider_name: &str) -> Option<&'static str> {
    match provider_name.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(DEFAULT_MODEL),
        "openai" => Some(DEFAULT_OPENAI_MODEL),
        _ => None,
    }
}

/// Resolve the extractor, from most-specific to least-specific.
///
/// 1. **Pre-built extractor** (`config.extractor`) — used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model` or the
///    provider's default model.
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 4. **Gemini** when `GEMINI_API_KEY` is set.
/// 5. **Full auto-detection** (`ProviderFactory::from_env`), switched to
///    `config.model` when one is given.
pub fn resolve_extractor(
    config: &ExtractionConfig,
) -> Result<Arc<dyn DocumentExtractor>, ExtractError> {
    if let Some(ref extractor) = config.extractor {
        return Ok(Arc::clone(extractor));
    }

    let provider = resolve_provider(config)?;
    info!(
        "LLM provider resolved (provider: {}, model: {})",
        provider.name(),
        provider.model()
    );
    Ok(Arc::new(LlmDocumentExtractor::new(provider, config)))
}

fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn LLMProvider>, ExtractError> {
    if let Some(ref name) = config.provider_name {
        let model = match config.model.as_deref() {
            Some(model) => model,
            None => default_model_for(name).ok_or_else(|| ExtractError::ProviderNotConfigured {
                provider: name.clone(),
                hint: format!("No default model for provider '{name}'; set a model explicitly"),
            })?,
        };
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if std::env::var("GEMINI_API_KEY").is_ok_and(|k| !k.is_empty()) {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_vision_provider("gemini", model);
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExtractError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set GEMINI_API_KEY, OPENAI_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    match config.model.as_deref() {
        Some(model) if model != llm_provider.model() => {
            create_vision_provider(llm_provider.name(), model)
        }
        _ => Ok(llm_provider),
    }
}
