//! LLM integration for the story wizard.
//!
//! Uses the rig-core crate for HTTP transport and the `RigAdapter` to bridge
//! rig's `CompletionModel` trait to our `LlmProvider` trait.

pub mod provider;
mod rig_adapter;

pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::LlmError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
    /// Overrides the provider's API host.
    pub base_url: Option<String>,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Anthropic => create_anthropic_provider(config),
    }
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> = match &config.base_url {
        Some(base_url) => anthropic::Client::builder()
            .api_key(config.api_key.expose_secret())
            .base_url(base_url.as_str())
            .build(),
        None => anthropic::Client::new(config.api_key.expose_secret()),
    }
    .map_err(|e| LlmError::RequestFailed {
        provider: "anthropic".to_string(),
        reason: format!("Failed to create Anthropic client: {}", e),
    })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "anthropic")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: Option<&str>) -> LlmConfig {
        LlmConfig {
            backend: LlmBackend::Anthropic,
            api_key: secrecy::SecretString::from("test-key"),
            model: "claude-3-sonnet-20240229".to_string(),
            base_url: base_url.map(String::from),
        }
    }

    #[test]
    fn test_create_provider_constructs_without_network() {
        // rig-core clients accept any string as API key at construction time.
        let provider = create_provider(&config(None)).unwrap();
        assert_eq!(provider.model_name(), "claude-3-sonnet-20240229");
    }

    #[test]
    fn test_create_provider_with_custom_base_url() {
        let provider = create_provider(&config(Some("http://127.0.0.1:9"))).unwrap();
        assert_eq!(provider.model_name(), "claude-3-sonnet-20240229");
    }
}
