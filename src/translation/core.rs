/*!
 * Core translation service implementation.
 *
 * This module defines the item type exchanged with a language model, the
 * `RemoteTranslator` seam the rest of the pipeline talks to, and
 * `TranslationService`, which implements that seam on top of the configured
 * provider client.
 *
 * Requests carry the items as JSON and the model must answer with
 * `{"translations":[{"id":<int>,"text":<string>}]}`. Anything else is
 * a parse failure for the whole call; individual malformed entries are
 * dropped with a warning so the retry layer sees their ids as missing.
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatMessage, ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use super::prompts::PromptTemplate;

/// Upper bound of generated tokens requested from Anthropic
const ANTHROPIC_MAX_TOKENS: u32 = 8192;

/// One string sent to, or received from, the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationItem {
    /// Correlation id, unique within one request
    pub id: usize,

    /// Source text on the way out, translated text on the way back
    pub text: String,
}

impl TranslationItem {
    /// Create a new item
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// Something that can translate a batch of items in one remote call
#[async_trait]
pub trait RemoteTranslator: Send + Sync {
    /// Translate `items` with the given prompt.
    ///
    /// The returned list may be partial, reordered or contain ids that were
    /// never sent; reconciling it is the caller's job.
    async fn translate_items(
        &self,
        prompt: &PromptTemplate,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslationItem>, ProviderError>;
}

/// Payload embedded in the user message
#[derive(Serialize)]
struct RequestPayload<'a> {
    items: &'a [TranslationItem],
}

/// Top-level shape of a model answer
#[derive(Deserialize)]
struct ResponsePayload {
    translations: Vec<serde_json::Value>,
}

/// Build the user message for a batch.
///
/// A `{text}` placeholder in the instruction receives the JSON payload,
/// otherwise the payload is appended after the instruction.
pub fn build_user_message(instruction: &str, items: &[TranslationItem]) -> Result<String, ProviderError> {
    let payload = serde_json::to_string(&RequestPayload { items })
        .map_err(|e| ProviderError::RequestFailed(format!("Failed to serialize request items: {}", e)))?;

    if instruction.contains("{text}") {
        Ok(instruction.replace("{text}", &payload))
    } else {
        Ok(format!("{}\n{}", instruction.trim_end(), payload))
    }
}

/// Locate the JSON object inside a model answer.
///
/// Models sometimes wrap the object in a Markdown fence or add a sentence
/// around it.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```").trim())
        .unwrap_or(trimmed);

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

/// Parse a model answer into translated items.
///
/// The envelope must match the expected schema or the whole answer is a
/// `ParseError`. Entries without an integer `id` or a string `text` are
/// skipped.
pub fn parse_translations(raw: &str) -> Result<Vec<TranslationItem>, ProviderError> {
    let json = extract_json(raw);
    let payload: ResponsePayload = serde_json::from_str(json).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        ProviderError::ParseError(format!("{} (answer starts with: {})", e, preview))
    })?;

    let mut items = Vec::with_capacity(payload.translations.len());
    for entry in payload.translations {
        let id = entry.get("id").and_then(|v| v.as_u64());
        let text = entry.get("text").and_then(|v| v.as_str());
        match (id, text) {
            (Some(id), Some(text)) => items.push(TranslationItem::new(id as usize, text)),
            _ => warn!("Rejected malformed translation entry: {}", entry),
        }
    }

    Ok(items)
}

/// Normalize a configured endpoint into a base URL without trailing slash
fn normalize_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// OpenAI API service
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// LM Studio local server (OpenAI-compatible)
    LMStudio {
        /// Client instance (OpenAI-compatible)
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Remote translator backed by the configured LLM provider
#[derive(Debug)]
pub struct TranslationService {
    /// Provider client
    provider: TranslationProviderImpl,

    /// Model identifier
    model: String,

    /// Sampling temperature
    temperature: f32,
}

impl TranslationService {
    /// Create a new translation service from the translation configuration
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let endpoint = normalize_endpoint(&config.get_endpoint())?;
        let timeout_secs = config.get_timeout_secs();
        let api_key = config.get_api_key();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => TranslationProviderImpl::Ollama {
                client: Ollama::new(endpoint, timeout_secs),
            },
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
            },
            ConfigTranslationProvider::LMStudio => TranslationProviderImpl::LMStudio {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(api_key, endpoint, timeout_secs),
            },
        };

        Ok(Self {
            provider,
            model: config.get_model(),
            temperature: config.common.temperature,
        })
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one request and return the raw answer text
    async fn complete_text(&self, system: &str, user: String) -> Result<String, ProviderError> {
        match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(
                    self.model.clone(),
                    vec![
                        ChatMessage { role: "system".to_string(), content: system.to_string() },
                        ChatMessage { role: "user".to_string(), content: user },
                    ],
                )
                .temperature(self.temperature)
                .format("json");
                let response = client.complete(request).await?;
                Ok(Ollama::extract_text(&response))
            }
            TranslationProviderImpl::OpenAI { client } => {
                let request = OpenAIRequest::new(self.model.clone())
                    .add_message("system", system)
                    .add_message("user", user)
                    .temperature(self.temperature)
                    .json_mode();
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProviderImpl::LMStudio { client } => {
                // LM Studio rejects json_object; the prompt asks for JSON instead
                let request = OpenAIRequest::new(self.model.clone())
                    .add_message("system", system)
                    .add_message("user", user)
                    .temperature(self.temperature);
                let response = client.complete(request).await?;
                Ok(OpenAI::extract_text(&response))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(self.model.clone(), ANTHROPIC_MAX_TOKENS)
                    .system(system)
                    .add_message("user", user)
                    .temperature(self.temperature);
                let response = client.complete(request).await?;
                Ok(Anthropic::extract_text(&response))
            }
        }
    }
}

#[async_trait]
impl RemoteTranslator for TranslationService {
    async fn translate_items(
        &self,
        prompt: &PromptTemplate,
        items: &[TranslationItem],
    ) -> Result<Vec<TranslationItem>, ProviderError> {
        let user = build_user_message(&prompt.instruction, items)?;
        debug!("Sending {} items to {}", items.len(), self.model);

        let raw = self.complete_text(&prompt.system, user).await?;
        parse_translations(&raw)
    }
}
