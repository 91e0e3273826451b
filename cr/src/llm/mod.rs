//! LLM client module
//!
//! The model-calling collaborator: a capability trait, the OpenAI and
//! Anthropic backends, and the `invoke` helper the cores use to send one
//! rendered prompt and get text back.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod openai;
mod retry;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};

use crate::config::LlmConfig;

/// Default response budget per model call
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Create an LLM client based on the provider specified in config
///
/// Supports "openai" and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model(), "create_client: called");
    match config.provider.as_str() {
        "openai" => {
            debug!("create_client: creating OpenAI client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::UnknownProvider(other.to_string()))
        }
    }
}

/// Send one rendered prompt and return the model's text
///
/// A response with no text content yields an empty string; any backend
/// failure is returned as-is.
pub async fn invoke(llm: &dyn LlmClient, prompt: String, max_tokens: u32) -> Result<String, LlmError> {
    debug!(prompt_len = prompt.len(), %max_tokens, "invoke: called");
    let response = llm.complete(CompletionRequest::from_prompt(prompt, max_tokens)).await?;
    debug!(
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        stop_reason = ?response.stop_reason,
        "invoke: response received"
    );
    Ok(response.content.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[tokio::test]
    async fn test_invoke_returns_text() {
        let llm = MockLlmClient::with_texts(["pediatria"]);
        let out = invoke(&llm, "Consulta: meu filho tem febre".to_string(), 64).await.unwrap();
        assert_eq!(out, "pediatria");
        assert_eq!(llm.prompts(), vec!["Consulta: meu filho tem febre".to_string()]);
    }

    #[tokio::test]
    async fn test_invoke_empty_content_is_empty_string() {
        let llm = MockLlmClient::new(vec![CompletionResponse {
            content: None,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }]);
        let out = invoke(&llm, "x".to_string(), 64).await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_invoke_propagates_upstream_error() {
        let llm = MockLlmClient::new(vec![]);
        let err = invoke(&llm, "x".to_string(), 64).await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "gemini".to_string(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(matches!(err, LlmError::UnknownProvider(ref p) if p == "gemini"));
    }
}
