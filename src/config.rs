//! Configuration — read once at process start, read-only thereafter.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmBackend;

const DEFAULT_PORT: u16 = 3000;

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion backend.
    pub backend: LlmBackend,
    /// Model identifier passed to the backend.
    pub model: String,
    /// API key for the backend.
    pub api_key: SecretString,
    /// HTTP listen port.
    pub port: u16,
    /// Per-call completion timeout. `None` means unbounded — a hung
    /// upstream call hangs the run.
    pub completion_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `EMAIL_ASSIST_BACKEND`: `gemini` (default), `anthropic`, `openai`
    /// - `GEMINI_API_KEY` / `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`
    /// - `EMAIL_ASSIST_MODEL`: defaults per backend
    /// - `EMAIL_ASSIST_PORT`: defaults to 3000
    /// - `EMAIL_ASSIST_COMPLETION_TIMEOUT_SECS`: unset or 0 disables
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("EMAIL_ASSIST_BACKEND") {
            Ok(name) => LlmBackend::parse(&name).ok_or_else(|| ConfigError::InvalidValue {
                key: "EMAIL_ASSIST_BACKEND".to_string(),
                message: format!("unknown backend '{name}'"),
            })?,
            Err(_) => LlmBackend::Gemini,
        };

        let key_var = api_key_env(backend);
        let api_key = std::env::var(key_var)
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let model = std::env::var("EMAIL_ASSIST_MODEL")
            .unwrap_or_else(|_| default_model(backend).to_string());

        let port = match std::env::var("EMAIL_ASSIST_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "EMAIL_ASSIST_PORT".to_string(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let completion_timeout = match std::env::var("EMAIL_ASSIST_COMPLETION_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EMAIL_ASSIST_COMPLETION_TIMEOUT_SECS".to_string(),
                    message: format!("'{raw}' is not a number of seconds"),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            backend,
            model,
            api_key,
            port,
            completion_timeout,
        })
    }
}

/// Which environment variable carries the API key for a backend.
fn api_key_env(backend: LlmBackend) -> &'static str {
    match backend {
        LlmBackend::Gemini => "GEMINI_API_KEY",
        LlmBackend::Anthropic => "ANTHROPIC_API_KEY",
        LlmBackend::OpenAi => "OPENAI_API_KEY",
    }
}

/// Default model per backend.
fn default_model(backend: LlmBackend) -> &'static str {
    match backend {
        LlmBackend::Gemini => "gemini-2.0-flash",
        LlmBackend::Anthropic => "claude-sonnet-4-20250514",
        LlmBackend::OpenAi => "gpt-4o",
    }
}
