use std::sync::Arc;

use email_assist::config::Config;
use email_assist::llm::{LlmConfig, LlmProvider, TimeoutProvider, create_provider};
use email_assist::server::email_routes;
use email_assist::workflow::orchestrator::EmailWorkflow;
use email_assist::workflow::refiner::Refiner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing. With EMAIL_ASSIST_LOG_DIR set, logs also go to a
    // daily-rolling file; the guard must outlive the server.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _log_guard = match std::env::var("EMAIL_ASSIST_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "email-assist.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
            None
        }
    };

    let config = Config::from_env()?;

    eprintln!("📬 Email Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!(
        "   API: http://0.0.0.0:{}/api/email-assistant/process\n",
        config.port
    );

    // Create the LLM provider — shared read-only across all runs.
    let llm_config = LlmConfig {
        backend: config.backend,
        api_key: config.api_key.clone(),
        model: config.model.clone(),
    };
    let mut llm: Arc<dyn LlmProvider> = create_provider(&llm_config)?;

    if let Some(timeout) = config.completion_timeout {
        tracing::info!(?timeout, "Completion timeout enabled");
        llm = Arc::new(TimeoutProvider::new(llm, timeout));
    }

    let workflow = Arc::new(EmailWorkflow::new(Arc::clone(&llm)));
    let refiner = Arc::new(Refiner::new(llm));

    let app = email_routes(workflow, refiner);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Email assistant server started");
    axum::serve(listener, app).await?;

    Ok(())
}
