//! Triage classifier — the first stage of every run.

use std::sync::Arc;

use tracing::debug;

use crate::error::WorkflowError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::workflow::types::{Classification, EmailRecord};

/// Max tokens for the triage call (runs on every email, kept tight).
const TRIAGE_MAX_TOKENS: u32 = 256;

/// Temperature for triage (deterministic-ish).
const TRIAGE_TEMPERATURE: f32 = 0.1;

/// Classifies an email into respond/ignore/notify via the completion
/// service.
pub struct Classifier {
    llm: Arc<dyn LlmProvider>,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Classify an email.
    ///
    /// Never fails on ambiguous completion text — an email the model can't
    /// place defaults to `Respond`, so nothing is silently dropped. The only
    /// error path is the completion call itself.
    pub async fn classify(&self, email: &EmailRecord) -> Result<Classification, WorkflowError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_triage_system_prompt()),
            ChatMessage::user(build_triage_user_prompt(email)),
        ])
        .with_temperature(TRIAGE_TEMPERATURE)
        .with_max_tokens(TRIAGE_MAX_TOKENS);

        let response = self.llm.complete(request).await?;
        let classification = parse_classification(&response.content);

        debug!(
            classification = classification.label(),
            raw = %response.content.chars().take(120).collect::<String>(),
            "Triage complete"
        );

        Ok(classification)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_triage_system_prompt() -> String {
    "You are an email triage assistant.\n\
     Decide if an email should be:\n\
     - RESPOND (requires a reply)\n\
     - IGNORE (safe to skip)\n\
     - NOTIFY (important but no response needed)"
        .to_string()
}

fn build_triage_user_prompt(email: &EmailRecord) -> String {
    format!(
        "Author: {}\nTo: {}\nSubject: {}\nThread: {}\n\nClassify this email.",
        email.author, email.recipient, email.subject, email.thread
    )
}

// ── Response parsing ────────────────────────────────────────────────

/// Map free-text triage output onto a classification.
///
/// "ignore" is checked before "notify": output mentioning both words
/// resolves to `Ignore`. Text naming neither keyword defaults to `Respond`.
fn parse_classification(raw: &str) -> Classification {
    let normalized = raw.to_lowercase();
    if normalized.contains("ignore") {
        Classification::Ignore
    } else if normalized.contains("notify") {
        Classification::Notify
    } else {
        Classification::Respond
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::provider::CompletionResponse;

    // ── Parsing ─────────────────────────────────────────────────────

    #[test]
    fn parse_ignore_case_insensitive() {
        assert_eq!(
            parse_classification("This should be IGNORE."),
            Classification::Ignore
        );
        assert_eq!(parse_classification("ignore"), Classification::Ignore);
    }

    #[test]
    fn parse_notify() {
        assert_eq!(parse_classification("NOTIFY"), Classification::Notify);
        assert_eq!(
            parse_classification("The user should be notified about this."),
            Classification::Notify
        );
    }

    #[test]
    fn parse_ignore_wins_over_notify() {
        // Both keywords present — "ignore" is checked first.
        assert_eq!(
            parse_classification("Please notify us to ignore this."),
            Classification::Ignore
        );
    }

    #[test]
    fn parse_defaults_to_respond() {
        assert_eq!(
            parse_classification("This looks like a customer question."),
            Classification::Respond
        );
        assert_eq!(parse_classification(""), Classification::Respond);
    }

    #[test]
    fn parse_respond_keyword_is_also_default() {
        assert_eq!(parse_classification("RESPOND"), Classification::Respond);
    }

    // ── Prompts ─────────────────────────────────────────────────────

    #[test]
    fn system_prompt_names_all_categories() {
        let prompt = build_triage_system_prompt();
        assert!(prompt.contains("RESPOND"));
        assert!(prompt.contains("IGNORE"));
        assert!(prompt.contains("NOTIFY"));
    }

    #[test]
    fn user_prompt_interpolates_all_fields() {
        let email = EmailRecord {
            author: "alice@example.com".to_string(),
            recipient: "bob@example.com".to_string(),
            subject: "Quarterly report".to_string(),
            thread: "Attached is the Q3 report for review.".to_string(),
        };
        let prompt = build_triage_user_prompt(&email);
        assert!(prompt.contains("alice@example.com"));
        assert!(prompt.contains("bob@example.com"));
        assert!(prompt.contains("Quarterly report"));
        assert!(prompt.contains("Q3 report"));
    }

    // ── Stage with mock provider ────────────────────────────────────

    struct FixedLlm {
        response: String,
    }

    #[async_trait::async_trait]
    impl LlmProvider for FixedLlm {
        fn model_name(&self) -> &str {
            "fixed-mock"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.response.clone(),
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }

    fn email() -> EmailRecord {
        EmailRecord {
            author: "a@x.com".to_string(),
            recipient: "b@x.com".to_string(),
            subject: "Hi".to_string(),
            thread: "Hello there".to_string(),
        }
    }

    #[tokio::test]
    async fn classify_uses_completion_text() {
        let classifier = Classifier::new(Arc::new(FixedLlm {
            response: "This email is spam, IGNORE it.".to_string(),
        }));
        let classification = classifier.classify(&email()).await.unwrap();
        assert_eq!(classification, Classification::Ignore);
    }

    #[tokio::test]
    async fn classify_ambiguous_text_never_errors() {
        let classifier = Classifier::new(Arc::new(FixedLlm {
            response: "Hmm, hard to say.".to_string(),
        }));
        let classification = classifier.classify(&email()).await.unwrap();
        assert_eq!(classification, Classification::Respond);
    }
}
