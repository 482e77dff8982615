//! Configuration types.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Name of the credential looked up in the secrets file and environment.
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Default model for story generation.
pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";

/// Settings for the single generation call.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Output token cap sent with every request.
    pub max_tokens: u32,
    /// Upper bound on one generation call.
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Process-wide wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// Model identifier passed to the provider.
    pub model: String,
    pub generation: GenerationConfig,
    /// Sessions untouched for this long are pruned.
    pub session_idle_timeout: Duration,
    /// Optional JSON secrets file consulted before the environment.
    pub secrets_path: PathBuf,
    /// Alternate Anthropic API host; the provider default when unset.
    pub api_base: Option<String>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            secrets_path: PathBuf::from("./secrets.json"),
            api_base: None,
        }
    }
}

impl WizardConfig {
    /// Build from `STORY_WIZARD_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "STORY_WIZARD_PORT")? {
            config.port = port;
        }
        if let Some(model) = lookup("STORY_WIZARD_MODEL").filter(|m| !m.trim().is_empty()) {
            config.model = model;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "STORY_WIZARD_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "STORY_WIZARD_TIMEOUT_SECS".to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
            config.generation.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&lookup, "STORY_WIZARD_SESSION_IDLE_SECS")? {
            config.session_idle_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("STORY_WIZARD_SECRETS") {
            config.secrets_path = PathBuf::from(path);
        }
        if let Some(base) = lookup("STORY_WIZARD_API_BASE").filter(|b| !b.trim().is_empty()) {
            config.api_base = Some(base.trim().trim_end_matches('/').to_string());
        }

        Ok(config)
    }

    /// Resolve the API key from the secrets file, then the environment.
    pub fn api_key(&self) -> Result<SecretString, ConfigError> {
        resolve_api_key(&self.secrets_path, |key| std::env::var(key).ok())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(None),
    }
}

/// Look up `ANTHROPIC_API_KEY`, secrets file first, then the environment.
///
/// A secrets file that is missing, unreadable or malformed is skipped with a
/// warning. Empty values count as absent.
pub fn resolve_api_key<F>(secrets_path: &Path, env: F) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match read_secret(secrets_path, API_KEY_VAR) {
        Ok(Some(key)) => {
            tracing::debug!(path = %secrets_path.display(), "API key loaded from secrets file");
            return Ok(SecretString::from(key));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring secrets file, falling back to environment");
        }
    }

    env(API_KEY_VAR)
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from)
        .ok_or(ConfigError::MissingApiKey)
}

fn read_secret(path: &Path, key: &str) -> Result<Option<String>, ConfigError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let secrets: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::Secrets(format!("{}: {e}", path.display())))?;

    Ok(secrets
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .map(String::from))
}
