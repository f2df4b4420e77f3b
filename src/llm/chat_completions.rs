//! OpenAI-compatible `/chat/completions` backend over reqwest.
//!
//! Speaks the plain chat-completions wire format, so it also works against
//! self-hosted servers that mimic it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

const PROVIDER: &str = "openai-compatible";

/// Chat-completions client holding its own HTTP connection pool.
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
}

impl ChatCompletionsProvider {
    pub fn new(base_url: &str, api_key: SecretString, model: &str) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            model: model.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Map a non-success HTTP status to an `LlmError`.
fn status_error(status: StatusCode, retry_after: Option<Duration>, body: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            provider: PROVIDER.to_string(),
            retry_after,
        },
        _ => LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("HTTP {}: {}", status.as_u16(), body.trim()),
        },
    }
}

/// Pull the first choice's content out of a decoded response.
fn first_choice(response: WireResponse) -> Result<CompletionResponse, LlmError> {
    let usage = response.usage.unwrap_or(WireUsage {
        prompt_tokens: 0,
        completion_tokens: 0,
    });

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "response had no choices".to_string(),
        })?;

    let content = choice
        .message
        .content
        .ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "first choice had no message content".to_string(),
        })?;

    Ok(CompletionResponse {
        content: content.trim().to_string(),
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        response_id: response.id,
    })
}

#[async_trait]
impl LlmProvider for ChatCompletionsProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = WireRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, retry_after, &text));
        }

        let bytes = response.bytes().await.map_err(|e| LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;
        let decoded: WireResponse = serde_json::from_slice(&bytes)?;
        let completion = first_choice(decoded)?;

        debug!(
            model = %self.model,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "Chat completion finished"
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let provider = ChatCompletionsProvider::new(
            "https://api.openai.com/v1/",
            SecretString::from("sk-test"),
            "gpt-3.5-turbo",
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(provider.model_name(), "gpt-3.5-turbo");
    }

    #[test]
    fn request_serializes_wire_fields() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hello")];
        let body = WireRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            temperature: Some(0.3),
            max_tokens: Some(10),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert_eq!(json["max_tokens"], 10);
        assert!(json["temperature"].as_f64().unwrap() > 0.29);
    }

    #[test]
    fn first_choice_is_trimmed() {
        let decoded: WireResponse = serde_json::from_str(
            r#"{"id":"cmpl-1","choices":[{"message":{"role":"assistant","content":"  PRODUTIVO \n"},"finish_reason":"stop"},{"message":{"content":"ignored"}}],"usage":{"prompt_tokens":42,"completion_tokens":2}}"#,
        )
        .unwrap();
        let completion = first_choice(decoded).unwrap();
        assert_eq!(completion.content, "PRODUTIVO");
        assert_eq!(completion.input_tokens, 42);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
        assert_eq!(completion.response_id.as_deref(), Some("cmpl-1"));
    }

    #[test]
    fn empty_choices_is_invalid_response() {
        let decoded: WireResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            first_choice(decoded),
            Err(LlmError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, None, ""),
            LlmError::AuthFailed { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(3)), ""),
            LlmError::RateLimited { retry_after: Some(d), .. } if d == Duration::from_secs(3)
        ));
        let err = status_error(StatusCode::BAD_GATEWAY, None, " upstream down ");
        assert!(err.to_string().contains("HTTP 502: upstream down"));
    }
}
