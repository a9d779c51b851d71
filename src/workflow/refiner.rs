//! Reply refinement — the backend half of the human review cycle.
//!
//! The review loop itself (accept / discard / edit again) is a caller
//! concern. This stage is stateless: each call carries its own full
//! context and holds no memory of prior rounds.

use std::sync::Arc;

use tracing::debug;

use crate::error::WorkflowError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::workflow::types::{RefinementRequest, RefinementResult};

const REFINE_TEMPERATURE: f32 = 0.3;
const REFINE_MAX_TOKENS: u32 = 512;

const REFINE_SYSTEM_PROMPT: &str =
    "You are an email writing assistant. A reply was suggested and a person \
     has edited it. Produce a polished, concise, professional version of the \
     edited reply. Keep the person's edits and intent — never revert to the \
     original suggestion. Return only the final reply text.";

/// Polishes a human-edited reply into a final draft.
pub struct Refiner {
    llm: Arc<dyn LlmProvider>,
}

impl Refiner {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Refine one edited reply. One completion call; the text comes back
    /// verbatim as the refined reply.
    pub async fn refine(
        &self,
        request: &RefinementRequest,
    ) -> Result<RefinementResult, WorkflowError> {
        request.validate()?;

        let completion = CompletionRequest::new(vec![
            ChatMessage::system(REFINE_SYSTEM_PROMPT),
            ChatMessage::user(build_refine_user_prompt(request)),
        ])
        .with_temperature(REFINE_TEMPERATURE)
        .with_max_tokens(REFINE_MAX_TOKENS);

        let response = self.llm.complete(completion).await?;
        debug!(chars = response.content.len(), "Reply refined");

        Ok(RefinementResult {
            refined_reply: response.content,
        })
    }
}

/// Presents the original suggestion, the human edit, and the email context.
fn build_refine_user_prompt(request: &RefinementRequest) -> String {
    format!(
        "Original suggestion:\n{}\n\n\
         Edited reply:\n{}\n\n\
         Email context:\n\
         Subject: {}\n\
         From: {}\n\
         To: {}\n\
         Thread:\n{}",
        request.original_reply,
        request.human_edited_reply,
        request.email.subject,
        request.email.author,
        request.email.recipient,
        request.email.thread
    )
}
