use anyhow::Context;

use email_classifier::analysis::{ClassifierConfig, EmailClassifier};
use email_classifier::api::{AppState, build_router};
use email_classifier::config::ServerConfig;
use email_classifier::llm::{LlmConfig, create_provider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // A missing .env is fine.
    let dotenv_path = dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    if let Some(path) = dotenv_path {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let server_config = ServerConfig::from_env();
    let llm_config = LlmConfig::from_env().context("Failed to load LLM configuration")?;
    let classifier_config = ClassifierConfig::from_env();

    let llm = create_provider(&llm_config).context("Failed to create LLM provider")?;
    let classifier = EmailClassifier::new(llm, classifier_config);

    let app = build_router(AppState::new(classifier), &server_config);

    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    eprintln!("📧 Email Classifier v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!("   API: http://{}/analise", addr);
    eprintln!("   Static: {}", server_config.static_dir.display());

    tracing::info!(%addr, "HTTP server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
