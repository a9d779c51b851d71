//! Downstream generators — exactly one of these runs after triage.
//!
//! Both return the completion text verbatim: no retries, no
//! post-processing. Formatting correctness is the completion service's
//! responsibility.

use std::sync::Arc;

use tracing::debug;

use crate::error::WorkflowError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::workflow::types::EmailRecord;

const REPLY_TEMPERATURE: f32 = 0.3;
const REPLY_MAX_TOKENS: u32 = 512;

const NOTIFY_TEMPERATURE: f32 = 0.3;
const NOTIFY_MAX_TOKENS: u32 = 256;

// ── Reply generator ─────────────────────────────────────────────────

/// Drafts a reply for emails classified `Respond`.
pub struct ReplyGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl ReplyGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Draft a reply to the email. One completion call, full text returned.
    pub async fn generate(&self, email: &EmailRecord) -> Result<String, WorkflowError> {
        let request =
            CompletionRequest::new(vec![ChatMessage::user(build_reply_prompt(email))])
                .with_temperature(REPLY_TEMPERATURE)
                .with_max_tokens(REPLY_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        debug!(chars = response.content.len(), "Reply drafted");
        Ok(response.content)
    }
}

/// Single user-role prompt. All four fields are interpolated verbatim —
/// untrusted email text reaches the model unescaped (known injection
/// surface).
fn build_reply_prompt(email: &EmailRecord) -> String {
    format!(
        "You are an AI email assistant. Write a polite, clear, and professional reply\n\
         based on this email thread.\n\n\
         Subject: {}\n\
         From: {}\n\
         To: {}\n\
         Thread:\n{}",
        email.subject, email.author, email.recipient, email.thread
    )
}

// ── Notification generator ──────────────────────────────────────────

/// Produces a notification digest for emails classified `Notify`.
pub struct NotificationGenerator {
    llm: Arc<dyn LlmProvider>,
}

impl NotificationGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Summarize the email into a notification digest. The text comes back
    /// verbatim — any stray markup the model emits is passed through.
    pub async fn generate(&self, email: &EmailRecord) -> Result<String, WorkflowError> {
        let request =
            CompletionRequest::new(vec![ChatMessage::user(build_notification_prompt(email))])
                .with_temperature(NOTIFY_TEMPERATURE)
                .with_max_tokens(NOTIFY_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        debug!(chars = response.content.len(), "Notification drafted");
        Ok(response.content)
    }
}

fn build_notification_prompt(email: &EmailRecord) -> String {
    format!(
        "You are an email notification assistant. Summarize this email concisely\n\
         in plain text (no markdown emphasis or headings) and suggest a short\n\
         notification message for the user.\n\n\
         Subject: {}\n\
         From: {}\n\
         To: {}\n\
         Thread:\n{}",
        email.subject, email.author, email.recipient, email.thread
    )
}
