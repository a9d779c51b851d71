//! Per-call timeout decorator for `LlmProvider`.
//!
//! The workflow blocks on every completion call; without a bound, a hung
//! upstream call hangs the whole run. The timeout is opt-in via
//! configuration and unset by default.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

/// Wraps a provider and bounds the duration of every completion call.
pub struct TimeoutProvider {
    inner: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl LlmProvider for TimeoutProvider {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                provider: self.inner.model_name().to_string(),
                timeout: self.timeout,
            }),
        }
    }
}
