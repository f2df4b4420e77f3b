//! Error types for the email classifier.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document text extraction errors.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Formato de arquivo não suportado. Use .txt ou .pdf")]
    UnsupportedFormat { filename: String },

    #[error("Erro ao processar PDF: {0}")]
    Pdf(String),

    #[error("Erro ao decodificar texto: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Errors surfaced by the analysis pipeline.
///
/// Everything except `Provider` is the caller's fault.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Forneça um email (texto ou arquivo)")]
    MissingInput,

    #[error("Formato de arquivo não suportado. Use .txt ou .pdf")]
    UnsupportedFormat { filename: String },

    #[error("{0}")]
    DocumentParse(String),

    #[error("O email está vazio ou muito curto.")]
    EmptyOrTooShort,

    #[error("Erro na análise com o provedor de IA: {0}")]
    Provider(#[from] LlmError),
}

impl AnalysisError {
    /// Whether this error should be reported as a 4xx.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AnalysisError::Provider(_))
    }
}

impl From<ExtractError> for AnalysisError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat { filename } => {
                AnalysisError::UnsupportedFormat { filename }
            }
            other => AnalysisError::DocumentParse(other.to_string()),
        }
    }
}
