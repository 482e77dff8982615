//! Bridges a rig `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{CompletionError, CompletionModel};
use rig::message::{AssistantContent, Message};
use tracing::debug;

use crate::error::LlmError;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut builder = self.model.completion_request(Message::user(request.prompt));
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        debug!(model = %self.model_name, max_tokens = ?request.max_tokens, "Sending completion request");

        let response = builder
            .send()
            .await
            .map_err(|e| map_completion_error(self.provider, e))?;

        let content = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}

fn map_completion_error(provider: &str, err: CompletionError) -> LlmError {
    match err {
        CompletionError::ProviderError(body) => classify_provider_error(provider, body),
        other => LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: other.to_string(),
        },
    }
}

/// rig hands back the error body of a failed request; the Anthropic error
/// `type` tells auth and rate-limit failures apart.
fn classify_provider_error(provider: &str, body: String) -> LlmError {
    if body.contains("authentication_error") || body.contains("permission_error") {
        LlmError::AuthFailed {
            provider: provider.to_string(),
        }
    } else if body.contains("rate_limit_error") || body.contains("overloaded_error") {
        LlmError::RateLimited {
            provider: provider.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_body_maps_to_auth_failed() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert!(matches!(
            classify_provider_error("anthropic", body.to_string()),
            LlmError::AuthFailed { .. }
        ));
    }

    #[test]
    fn rate_limit_body_maps_to_rate_limited() {
        let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#;
        assert!(matches!(
            classify_provider_error("anthropic", body.to_string()),
            LlmError::RateLimited { .. }
        ));
    }

    #[test]
    fn other_provider_errors_keep_the_body() {
        let err = map_completion_error(
            "anthropic",
            CompletionError::ProviderError("quota exceeded".to_string()),
        );
        match err {
            LlmError::RequestFailed { reason, .. } => assert_eq!(reason, "quota exceeded"),
            other => panic!("expected request failure, got {other:?}"),
        }
    }
}
