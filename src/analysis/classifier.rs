//! Email classifier: resolves the submission, labels it and drafts a reply.
//!
//! One pass per request, strictly sequential: the reply prompt depends on the
//! label, so the two completion calls cannot overlap. Any failure aborts the
//! pass and nothing partial is returned.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::env_parse;
use crate::error::AnalysisError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

use super::extract::extract_text_blocking;
use super::prompts::{
    CLASSIFICATION_SYSTEM_PROMPT, REPLY_SYSTEM_PROMPT, build_classification_prompt,
    build_reply_prompt,
};
use super::types::{AnalysisResult, Classification, EmailInput, EmailSubmission};

/// Minimum email length (in characters, after trimming).
pub const MIN_EMAIL_CHARS: usize = 10;

/// Sampling settings for the two completion calls.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Temperature for the label call (deterministic-ish).
    pub classify_temperature: f32,
    /// Only a single word is expected back.
    pub classify_max_tokens: u32,
    /// Temperature for the reply call.
    pub reply_temperature: f32,
    pub reply_max_tokens: u32,
    pub min_email_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            classify_temperature: 0.3,
            classify_max_tokens: 10,
            reply_temperature: 0.7,
            reply_max_tokens: 300,
            min_email_chars: MIN_EMAIL_CHARS,
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            classify_temperature: env_parse(
                "EMAIL_CLASSIFIER_CLASSIFY_TEMPERATURE",
                defaults.classify_temperature,
            ),
            classify_max_tokens: env_parse(
                "EMAIL_CLASSIFIER_CLASSIFY_MAX_TOKENS",
                defaults.classify_max_tokens,
            ),
            reply_temperature: env_parse(
                "EMAIL_CLASSIFIER_REPLY_TEMPERATURE",
                defaults.reply_temperature,
            ),
            reply_max_tokens: env_parse(
                "EMAIL_CLASSIFIER_REPLY_MAX_TOKENS",
                defaults.reply_max_tokens,
            ),
            min_email_chars: defaults.min_email_chars,
        }
    }
}

/// Classifies emails and suggests replies using an injected LLM provider.
pub struct EmailClassifier {
    llm: Arc<dyn LlmProvider>,
    config: ClassifierConfig,
}

impl EmailClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, config: ClassifierConfig) -> Self {
        Self { llm, config }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Run the full pipeline on a form submission.
    pub async fn analyze(
        &self,
        submission: EmailSubmission,
    ) -> Result<AnalysisResult, AnalysisError> {
        let text = self.resolve_text(submission).await?;
        self.analyze_text(&text).await
    }

    /// Classify already-resolved text and draft a reply.
    pub async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let category = self.classify(text).await?;
        let reply = self.generate_reply(text, category).await?;

        info!(
            category = %category,
            reply_len = reply.len(),
            "Email analysis complete"
        );
        Ok(AnalysisResult::new(category, reply))
    }

    /// Pick the input, extract file text and enforce the minimum length.
    pub async fn resolve_text(&self, submission: EmailSubmission) -> Result<String, AnalysisError> {
        let text = match submission.into_input()? {
            EmailInput::Text(text) => text,
            EmailInput::File(file) => {
                debug!(
                    filename = %file.filename,
                    size = file.bytes.len(),
                    "Extracting text from upload"
                );
                extract_text_blocking(file.filename, file.bytes).await?
            }
        };

        let trimmed = text.trim();
        if trimmed.chars().count() < self.config.min_email_chars {
            debug!(len = trimmed.chars().count(), "Email too short");
            return Err(AnalysisError::EmptyOrTooShort);
        }
        Ok(trimmed.to_string())
    }

    /// First completion call. Unknown labels fall back to `Produtivo`.
    pub async fn classify(&self, text: &str) -> Result<Classification, AnalysisError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(CLASSIFICATION_SYSTEM_PROMPT),
            ChatMessage::user(build_classification_prompt(text)),
        ])
        .with_temperature(self.config.classify_temperature)
        .with_max_tokens(self.config.classify_max_tokens);

        let response = self.llm.complete(request).await?;

        let category = match Classification::from_label(&response.content) {
            Some(category) => category,
            None => {
                warn!(
                    raw_label = %response.content,
                    "Unexpected classification label, defaulting to PRODUTIVO"
                );
                Classification::Produtivo
            }
        };

        debug!(category = %category, "Email classified");
        Ok(category)
    }

    /// Second completion call.
    pub async fn generate_reply(
        &self,
        text: &str,
        category: Classification,
    ) -> Result<String, AnalysisError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(REPLY_SYSTEM_PROMPT),
            ChatMessage::user(build_reply_prompt(text, category)),
        ])
        .with_temperature(self.config.reply_temperature)
        .with_max_tokens(self.config.reply_max_tokens);

        let response = self.llm.complete(request).await?;
        Ok(response.content.trim().to_string())
    }
}
