//! LLM integration for the email classifier.
//!
//! Supports:
//! - **OpenAI-compatible**: plain `/chat/completions` over reqwest
//! - **OpenAI**: direct API access via rig-core
//! - **Anthropic**: direct API access via rig-core
//!
//! Every backend is exposed through the `LlmProvider` trait and handed to the
//! classifier as an `Arc<dyn LlmProvider>`.

pub mod chat_completions;
pub mod provider;
mod rig_adapter;

pub use chat_completions::ChatCompletionsProvider;
pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::str::FromStr;
use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{env_or, env_var};
use crate::error::{ConfigError, LlmError};

/// Default chat-completions base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for OpenAI-style backends.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// Default model for the Anthropic backend.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAiCompatible,
    OpenAi,
    Anthropic,
}

impl FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai-compatible" | "chat-completions" => Ok(LlmBackend::OpenAiCompatible),
            "openai" => Ok(LlmBackend::OpenAi),
            "anthropic" => Ok(LlmBackend::Anthropic),
            other => Err(ConfigError::InvalidValue {
                key: "EMAIL_CLASSIFIER_LLM_BACKEND".to_string(),
                message: format!(
                    "unknown backend '{}' (expected openai-compatible, openai or anthropic)",
                    other
                ),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: SecretString,
    pub model: String,
    /// Only used by the OpenAI-compatible backend.
    pub base_url: String,
}

impl LlmConfig {
    /// Read provider settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match env_var("EMAIL_CLASSIFIER_LLM_BACKEND") {
            Some(value) => value.parse()?,
            None => LlmBackend::OpenAiCompatible,
        };

        let (key_var, default_model) = match backend {
            LlmBackend::Anthropic => ("ANTHROPIC_API_KEY", DEFAULT_ANTHROPIC_MODEL),
            LlmBackend::OpenAi | LlmBackend::OpenAiCompatible => {
                ("OPENAI_API_KEY", DEFAULT_OPENAI_MODEL)
            }
        };

        let api_key = env_var(key_var).ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        Ok(Self {
            backend,
            api_key: SecretString::from(api_key),
            model: env_or("EMAIL_CLASSIFIER_MODEL", default_model),
            base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
        })
    }
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::OpenAiCompatible => create_chat_completions_provider(config),
        LlmBackend::OpenAi => create_openai_provider(config),
        LlmBackend::Anthropic => create_anthropic_provider(config),
    }
}

fn create_chat_completions_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider =
        ChatCompletionsProvider::new(&config.base_url, config.api_key.clone(), &config.model)?;
    tracing::info!(
        "Using chat completions at {} (model: {})",
        provider.endpoint(),
        config.model
    );
    Ok(Arc::new(provider))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "openai")))
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "anthropic")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(backend: LlmBackend, model: &str) -> LlmConfig {
        LlmConfig {
            backend,
            api_key: SecretString::from("test-key"),
            model: model.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    #[test]
    fn backend_parses_known_names() {
        assert_eq!(
            "openai-compatible".parse::<LlmBackend>().unwrap(),
            LlmBackend::OpenAiCompatible
        );
        assert_eq!(" OpenAI ".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert_eq!("anthropic".parse::<LlmBackend>().unwrap(), LlmBackend::Anthropic);
        assert!("ollama".parse::<LlmBackend>().is_err());
    }

    #[test]
    fn test_create_chat_completions_provider() {
        let provider = create_provider(&config(LlmBackend::OpenAiCompatible, "gpt-3.5-turbo"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_create_provider_missing_key_still_constructs() {
        // rig-core clients accept any string as API key at construction time.
        // The actual auth failure happens when making a request.
        let provider = create_provider(&config(LlmBackend::Anthropic, "claude-3-5-haiku-latest"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "claude-3-5-haiku-latest");
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&config(LlmBackend::OpenAi, "gpt-4o-mini"));
        assert!(provider.is_ok());
        assert_eq!(provider.unwrap().model_name(), "gpt-4o-mini");
    }
}
