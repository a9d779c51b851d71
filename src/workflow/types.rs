//! Shared types for the email triage workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

// ── Email record ────────────────────────────────────────────────────

/// An email handed to the workflow. Immutable input — created by the
/// caller, never mutated.
///
/// Wire names match the public JSON contract (`to`, `email_thread`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Sender address.
    pub author: String,
    /// Recipient address.
    #[serde(rename = "to")]
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Full body/history of the thread.
    #[serde(rename = "email_thread")]
    pub thread: String,
}

impl EmailRecord {
    /// Reject missing or malformed fields. Runs before any completion call
    /// so invalid input never costs an external request.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.author.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "author",
                problem: "must not be empty",
            });
        }
        if !self.author.contains('@') {
            return Err(WorkflowError::InvalidInput {
                field: "author",
                problem: "must contain an email address",
            });
        }
        if self.recipient.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "to",
                problem: "must not be empty",
            });
        }
        if self.subject.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "subject",
                problem: "must not be empty",
            });
        }
        if self.thread.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "email_thread",
                problem: "must not be empty",
            });
        }
        Ok(())
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Triage decision for an email. Produced once per run; the orchestrator
/// routes on it and never reassigns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Requires a reply.
    Respond,
    /// Safe to skip.
    Ignore,
    /// Important, no reply needed.
    Notify,
}

impl Classification {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Respond => "respond",
            Self::Ignore => "ignore",
            Self::Notify => "notify",
        }
    }
}

// ── Workflow result ─────────────────────────────────────────────────

/// Terminal result of one workflow run.
///
/// Exactly one of `reply`/`notification` is populated, or neither (Ignore).
/// The constructors below are the only way the crate builds one, which
/// keeps that invariant out of reach of call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    /// When the run finished.
    pub processed_at: DateTime<Utc>,
}

impl WorkflowResult {
    pub(crate) fn ignored() -> Self {
        Self {
            classification: Classification::Ignore,
            reply: None,
            notification: None,
            processed_at: Utc::now(),
        }
    }

    pub(crate) fn replied(reply: String) -> Self {
        Self {
            classification: Classification::Respond,
            reply: Some(reply),
            notification: None,
            processed_at: Utc::now(),
        }
    }

    pub(crate) fn notified(notification: String) -> Self {
        Self {
            classification: Classification::Notify,
            reply: None,
            notification: Some(notification),
            processed_at: Utc::now(),
        }
    }
}

// ── Refinement ──────────────────────────────────────────────────────

/// One round of the human review cycle: the AI's original suggestion, the
/// human's edit, and the originating email for context.
///
/// Each request is independent and stateless — the caller accumulates edit
/// history, not the stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementRequest {
    /// The AI's original suggestion. May be empty.
    #[serde(rename = "originalReply")]
    pub original_reply: String,
    /// The human-edited version to polish.
    #[serde(rename = "editedReply")]
    pub human_edited_reply: String,
    /// Context from the originating email.
    #[serde(flatten)]
    pub email: EmailRecord,
}

impl RefinementRequest {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.human_edited_reply.trim().is_empty() {
            return Err(WorkflowError::InvalidInput {
                field: "editedReply",
                problem: "must not be empty",
            });
        }
        Ok(())
    }
}

/// Output of one refinement call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementResult {
    #[serde(rename = "refinedReply")]
    pub refined_reply: String,
}
