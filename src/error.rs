//! Error types for the story wizard.

use std::time::Duration;

use uuid::Uuid;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "No API key found. Please set ANTHROPIC_API_KEY in your environment or secrets file."
    )]
    MissingApiKey,

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read secrets: {0}")]
    Secrets(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, try again shortly")]
    RateLimited { provider: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Provider {provider} returned an empty response")]
    EmptyResponse { provider: String },
}

/// Errors raised while driving a wizard session.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error generating story: {0}")]
    Generation(#[from] LlmError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_the_variable() {
        let msg = ConfigError::MissingApiKey.to_string();
        assert!(msg.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn wizard_config_error_is_transparent() {
        let err = WizardError::from(ConfigError::MissingApiKey);
        assert_eq!(err.to_string(), ConfigError::MissingApiKey.to_string());
    }

    #[test]
    fn generation_error_wraps_provider_reason() {
        let err = WizardError::from(LlmError::AuthFailed {
            provider: "anthropic".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Error generating story: Authentication failed for provider anthropic"
        );
    }

    #[test]
    fn top_level_from_conversions() {
        let err: Error = LlmError::EmptyResponse {
            provider: "anthropic".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Llm(_)));

        let err: Error = WizardError::SessionNotFound(Uuid::nil()).into();
        assert!(err.to_string().contains("not found"));
    }
}
