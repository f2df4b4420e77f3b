//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{AssistantContent, CompletionModel, Message as RigMessage};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

/// Adapter wrapping any rig completion model.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

/// Result of splitting our message list into rig's shape.
struct RigMessages {
    preamble: Option<String>,
    history: Vec<RigMessage>,
    prompt: RigMessage,
}

/// System messages become the preamble, the last message is the prompt and
/// everything in between is chat history.
fn split_messages(messages: &[ChatMessage]) -> Option<RigMessages> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let preamble = (!system.is_empty()).then(|| system.join("\n\n"));

    let mut turns: Vec<RigMessage> = messages
        .iter()
        .filter_map(|m| match m.role {
            Role::System => None,
            Role::User => Some(RigMessage::user(m.content.clone())),
            Role::Assistant => Some(RigMessage::assistant(m.content.clone())),
        })
        .collect();

    let prompt = turns.pop()?;
    Some(RigMessages {
        preamble,
        history: turns,
        prompt,
    })
}

/// Concatenate the text parts of a response. `None` when there are none; a
/// blank text part still counts.
fn joined_text<'a>(contents: impl Iterator<Item = &'a AssistantContent>) -> Option<String> {
    let parts: Vec<&str> = contents
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.concat())
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
        let parts = split_messages(&request.messages).ok_or_else(|| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: "Cannot send a request without a user message".to_string(),
        })?;

        let mut builder = self
            .model
            .completion_request(parts.prompt)
            .messages(parts.history);
        if let Some(preamble) = parts.preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder.send().await.map_err(|e| LlmError::RequestFailed {
            provider: self.provider.to_string(),
            reason: e.to_string(),
        })?;

        let text = joined_text(response.choice.iter()).ok_or_else(|| {
            LlmError::InvalidResponse {
                provider: self.provider.to_string(),
                reason: "response contained no text content".to_string(),
            }
        })?;

        Ok(CompletionResponse {
            content: text.trim().to_string(),
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
            finish_reason: FinishReason::Stop,
            response_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_moves_system_messages_to_preamble() {
        let parts = split_messages(&[
            ChatMessage::system("You triage email."),
            ChatMessage::user("Classify this."),
        ])
        .unwrap();

        assert_eq!(parts.preamble.as_deref(), Some("You triage email."));
        assert!(parts.history.is_empty());
        assert!(matches!(parts.prompt, RigMessage::User { .. }));
    }

    #[test]
    fn split_keeps_earlier_turns_as_history() {
        let parts = split_messages(&[
            ChatMessage::user("first"),
            ChatMessage::assistant("ack"),
            ChatMessage::user("second"),
        ])
        .unwrap();

        assert!(parts.preamble.is_none());
        assert_eq!(parts.history.len(), 2);
        assert!(matches!(parts.prompt, RigMessage::User { .. }));
        assert!(matches!(parts.history[1], RigMessage::Assistant { .. }));
    }

    #[test]
    fn blank_text_is_passed_through() {
        let contents = [AssistantContent::text("  ")];
        assert_eq!(joined_text(contents.iter()).as_deref(), Some("  "));
    }

    #[test]
    fn text_parts_are_joined() {
        let contents = [AssistantContent::text("PRODU"), AssistantContent::text("TIVO")];
        assert_eq!(joined_text(contents.iter()).as_deref(), Some("PRODUTIVO"));
    }

    #[test]
    fn no_text_parts_is_none() {
        assert!(joined_text(std::iter::empty()).is_none());
    }

    #[test]
    fn split_without_turns_is_rejected() {
        assert!(split_messages(&[ChatMessage::system("only system")]).is_none());
        assert!(split_messages(&[]).is_none());
    }
}
