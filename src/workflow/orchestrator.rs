//! Workflow orchestrator — the run graph.
//!
//! One run: Triage → {reply | notification | nothing} → end. The graph is
//! acyclic and strictly sequential; the only suspension points are the
//! completion calls inside the stages. The refine/review loop lives
//! outside this graph entirely (see `Refiner`) — the caller owns iteration
//! count and termination.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::llm::provider::LlmProvider;
use crate::workflow::classifier::Classifier;
use crate::workflow::generators::{NotificationGenerator, ReplyGenerator};
use crate::workflow::types::{Classification, EmailRecord, WorkflowResult};

/// Stage routed to after triage. Triage always runs first; exactly one of
/// these follows, then the run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Reply,
    Notification,
    End,
}

impl Route {
    /// Pure transition out of triage, keyed on the classification.
    fn from_classification(classification: Classification) -> Self {
        match classification {
            Classification::Respond => Self::Reply,
            Classification::Notify => Self::Notification,
            Classification::Ignore => Self::End,
        }
    }
}

/// Runs emails through the triage graph.
///
/// Holds no per-run state — the provider handle is shared read-only, so one
/// workflow value serves any number of concurrent runs.
pub struct EmailWorkflow {
    classifier: Classifier,
    replier: ReplyGenerator,
    notifier: NotificationGenerator,
}

impl EmailWorkflow {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            classifier: Classifier::new(Arc::clone(&llm)),
            replier: ReplyGenerator::new(Arc::clone(&llm)),
            notifier: NotificationGenerator::new(llm),
        }
    }

    /// Run one email through the graph. Single pass, all-or-nothing: a
    /// completion failure produces no partial result, and invalid input is
    /// rejected before any completion call.
    pub async fn run(&self, email: &EmailRecord) -> Result<WorkflowResult, WorkflowError> {
        email.validate()?;

        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            author = %email.author,
            subject = %email.subject,
            "Workflow run started"
        );

        let classification = self.classifier.classify(email).await?;

        let result = match Route::from_classification(classification) {
            Route::Reply => {
                let reply = self.replier.generate(email).await?;
                WorkflowResult::replied(reply)
            }
            Route::Notification => {
                let notification = self.notifier.generate(email).await?;
                WorkflowResult::notified(notification)
            }
            Route::End => WorkflowResult::ignored(),
        };

        info!(
            %run_id,
            classification = classification.label(),
            "Workflow run finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::provider::{CompletionRequest, CompletionResponse};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ── Transition table ────────────────────────────────────────────

    #[test]
    fn route_covers_every_classification() {
        assert_eq!(
            Route::from_classification(Classification::Respond),
            Route::Reply
        );
        assert_eq!(
            Route::from_classification(Classification::Notify),
            Route::Notification
        );
        assert_eq!(
            Route::from_classification(Classification::Ignore),
            Route::End
        );
    }

    // ── Mocks ───────────────────────────────────────────────────────

    /// Plays back scripted responses in order and records every request.
    struct ScriptedLlm {
        responses: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedLlm {
        fn new(responses: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted-mock"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            let content = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected completion call");
            Ok(CompletionResponse {
                content,
                input_tokens: 50,
                output_tokens: 20,
            })
        }
    }

    /// Always fails — completion service outage.
    struct FailingLlm;

    #[async_trait::async_trait]
    impl LlmProvider for FailingLlm {
        fn model_name(&self) -> &str {
            "failing-mock"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "failing-mock".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    fn email() -> EmailRecord {
        EmailRecord {
            author: "a@x.com".to_string(),
            recipient: "b@x.com".to_string(),
            subject: "Hi".to_string(),
            thread: "Hey, quick question about the invoice.".to_string(),
        }
    }

    // ── Runs ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn ignore_path_skips_generators() {
        let llm = ScriptedLlm::new(&["This should be IGNORE."]);
        let workflow = EmailWorkflow::new(llm.clone());

        let result = workflow.run(&email()).await.unwrap();
        assert_eq!(result.classification, Classification::Ignore);
        assert!(result.reply.is_none());
        assert!(result.notification.is_none());
        // Triage only — no generator call was issued.
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn notify_path_runs_only_notification_generator() {
        let llm = ScriptedLlm::new(&["NOTIFY", "Server outage reported by John."]);
        let workflow = EmailWorkflow::new(llm.clone());

        let result = workflow.run(&email()).await.unwrap();
        assert_eq!(result.classification, Classification::Notify);
        assert_eq!(
            result.notification.as_deref(),
            Some("Server outage reported by John.")
        );
        assert!(result.reply.is_none());

        // Exactly two calls: triage, then the notification prompt (never the
        // reply prompt).
        assert_eq!(llm.calls(), 2);
        let requests = llm.requests.lock().unwrap();
        let second = &requests[1].messages[0].content;
        assert!(second.contains("notification"));
        assert!(!second.contains("professional reply"));
    }

    #[tokio::test]
    async fn respond_path_populates_reply_only() {
        let llm = ScriptedLlm::new(&["RESPOND", "Hi, happy to help with the invoice."]);
        let workflow = EmailWorkflow::new(llm.clone());

        let result = workflow.run(&email()).await.unwrap();
        assert_eq!(result.classification, Classification::Respond);
        assert_eq!(
            result.reply.as_deref(),
            Some("Hi, happy to help with the invoice.")
        );
        assert!(result.notification.is_none());
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn ambiguous_triage_defaults_to_respond_path() {
        let llm = ScriptedLlm::new(&["Not sure what to make of this.", "Drafted reply."]);
        let workflow = EmailWorkflow::new(llm.clone());

        let result = workflow.run(&email()).await.unwrap();
        assert_eq!(result.classification, Classification::Respond);
        assert_eq!(result.reply.as_deref(), Some("Drafted reply."));
    }

    #[tokio::test]
    async fn tie_break_resolves_to_ignore_end_to_end() {
        let llm = ScriptedLlm::new(&["Please notify us to ignore this."]);
        let workflow = EmailWorkflow::new(llm.clone());

        let result = workflow.run(&email()).await.unwrap();
        assert_eq!(result.classification, Classification::Ignore);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn invalid_input_rejected_before_any_completion_call() {
        let llm = ScriptedLlm::new(&[]);
        let workflow = EmailWorkflow::new(llm.clone());

        let mut bad = email();
        bad.subject = String::new();

        let err = workflow.run(&bad).await.unwrap_err();
        match err {
            WorkflowError::InvalidInput { field, .. } => assert_eq!(field, "subject"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn completion_failure_yields_no_partial_result() {
        let workflow = EmailWorkflow::new(Arc::new(FailingLlm));

        let err = workflow.run(&email()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Completion(_)));
    }

    #[tokio::test]
    async fn concurrent_runs_share_no_state() {
        // Two runs on one workflow value; each owns its own buffers and the
        // scripted responses pair off per run.
        let llm = ScriptedLlm::new(&["IGNORE", "IGNORE"]);
        let workflow = Arc::new(EmailWorkflow::new(llm.clone()));

        let e1 = email();
        let e2 = email();
        let (a, b) = tokio::join!(workflow.run(&e1), workflow.run(&e2));
        assert_eq!(a.unwrap().classification, Classification::Ignore);
        assert_eq!(b.unwrap().classification, Classification::Ignore);
        assert_eq!(llm.calls(), 2);
    }
}
