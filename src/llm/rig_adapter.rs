//! Bridges rig-core's `CompletionModel` trait to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::{CompletionError, CompletionModel};
use rig::message::{AssistantContent, Message};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role,
};

/// Exposes any rig `CompletionModel` as an `LlmProvider`.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        // rig takes one prompt message plus a preamble and prior history;
        // fold our ordered message list into that shape. System messages
        // become the preamble, the last user message becomes the prompt.
        let mut preamble: Vec<String> = Vec::new();
        let mut chat: Vec<Message> = Vec::new();
        for ChatMessage { role, content } in request.messages {
            match role {
                Role::System => preamble.push(content),
                Role::User => chat.push(Message::user(content)),
            }
        }

        let prompt = chat.pop().ok_or_else(|| LlmError::RequestFailed {
            provider: self.model_name.clone(),
            reason: "completion request contains no user message".to_string(),
        })?;

        let mut builder = self.model.completion_request(prompt).messages(chat);
        if !preamble.is_empty() {
            builder = builder.preamble(preamble.join("\n\n"));
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature as f64);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens as u64);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_completion_error(&self.model_name, e))?;

        let content = response
            .choice
            .iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        debug!(
            model = %self.model_name,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Completion finished"
        );

        Ok(CompletionResponse {
            content,
            input_tokens: response.usage.input_tokens as u32,
            output_tokens: response.usage.output_tokens as u32,
        })
    }
}

fn map_completion_error(provider: &str, err: CompletionError) -> LlmError {
    match err {
        CompletionError::HttpError(e) => LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: e.to_string(),
        },
        CompletionError::ProviderError(reason) => LlmError::RequestFailed {
            provider: provider.to_string(),
            reason,
        },
        other => LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: other.to_string(),
        },
    }
}
