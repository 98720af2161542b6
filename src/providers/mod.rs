/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration, also used for LM Studio's compatible server
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scripted translator used by the test suite
 *
 * Clients send exactly one request per call. Retrying is the job of the
 * translation layer, which knows which ids are still unresolved.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

/// Read an HTTP response body, turning non-success statuses into provider errors
pub(crate) async fn read_success_body(
    provider_name: &str,
    response: reqwest::Response,
) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());

    if !status.is_success() {
        log::error!("{} API error ({}): {}", provider_name, status, body);
        return Err(ProviderError::from_status(status.as_u16(), body));
    }

    Ok(body)
}

pub mod openai;
pub mod anthropic;
pub mod ollama;
pub mod mock;
