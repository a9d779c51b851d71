//! Error types for Email Assist.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

/// Workflow errors.
///
/// An ambiguous triage result is deliberately NOT represented here — the
/// classifier resolves it with a fail-safe default instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A required input field is missing or malformed. Raised before any
    /// completion call is made.
    #[error("Invalid input: {field} {problem}")]
    InvalidInput {
        field: &'static str,
        problem: &'static str,
    },

    /// The completion service failed mid-run. The run produces no result.
    #[error("Completion failed: {0}")]
    Completion(#[from] LlmError),
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
