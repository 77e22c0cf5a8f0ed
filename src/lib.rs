pub mod accounts;
pub mod api;
pub mod auth;
pub mod care_plan;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod notify;
pub mod prompts;
pub mod triage;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::accounts::AccountError;
use crate::api::AppState;
use crate::config::{AppConfig, ConfigError};
use crate::db::{DatabaseError, Store};
use crate::llm::{LlmClient, LlmError, OllamaClient};
use crate::notify::{EmailSender, HttpMailRelay, LogMailer, LogSms, NotifyError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Database: {0}")]
    Database(#[from] DatabaseError),
    #[error("LLM client: {0}")]
    Llm(#[from] LlmError),
    #[error("Mail relay: {0}")]
    Notify(#[from] NotifyError),
    #[error("Bootstrap admin: {0}")]
    Account(#[from] AccountError),
    #[error("Server: {0}")]
    Io(#[from] std::io::Error),
    #[error("Startup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Start the portal backend and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let store = Store::open(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "Database ready");

    // Blocking HTTP clients and PBKDF2 stay off the async workers.
    let (llm, mailer) = {
        let store = store.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || prepare_services(&store, &config)).await??
    };

    let state = AppState::new(store, llm, mailer, Arc::new(LogSms), config.clone());
    let server = api::start_server(state, config.bind_addr).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("Shutting down");
    server.stop().await;
    Ok(())
}

type Services = (Arc<dyn LlmClient>, Arc<dyn EmailSender>);

fn prepare_services(store: &Store, config: &AppConfig) -> Result<Services, StartupError> {
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        accounts::ensure_admin(store, email, password, config.pbkdf2_iterations)?;
    }

    let ollama = OllamaClient::new(&config.ollama_url, config.llm_timeout_secs)?;
    match ollama.is_model_available(&config.ollama_model) {
        Ok(true) => tracing::info!(model = %config.ollama_model, "LLM model available"),
        Ok(false) => tracing::warn!(
            model = %config.ollama_model,
            "LLM model not pulled; triage will fall back to patient-selected severity"
        ),
        Err(e) => tracing::warn!(
            url = ollama.base_url(),
            error = %e,
            "LLM service unreachable at startup"
        ),
    }

    let mailer: Arc<dyn EmailSender> = match &config.mail_relay_url {
        Some(url) => {
            tracing::info!(url, "Emails go through HTTP relay");
            Arc::new(HttpMailRelay::new(url, &config.mail_from, config::MAIL_TIMEOUT_SECS)?)
        }
        None => {
            tracing::warn!("No mail relay configured, emails are logged only");
            Arc::new(LogMailer)
        }
    };

    Ok((Arc::new(ollama), mailer))
}
