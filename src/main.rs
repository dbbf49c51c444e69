use std::{process::ExitCode, sync::Arc};

use monument_api::{
    app,
    config::{errors::ConfigError, AppConfig},
    db::{self, errors::DatabaseError},
    services::{checkout::StripeCheckout, signature::EventVerifier, store::PgDreamStore},
    state::AppState,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to initialise database: {0}")]
    Database(#[from] DatabaseError),
    #[error("Failed to serve: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Dreams backend stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let db_conn = db::connect(&config.database_url).await?;
    db::migrate(&db_conn).await?;

    let state = AppState {
        store: Arc::new(PgDreamStore::new(db_conn)),
        checkout: Arc::new(StripeCheckout::new(&config.stripe_secret_key)),
        verifier: Arc::new(EventVerifier::new(
            &config.stripe_webhook_secret,
            config.webhook_tolerance,
        )),
        frontend_url: Arc::from(config.frontend_url.as_str()),
    };

    let listener = tokio::net::TcpListener::bind(config.listen_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        frontend = %config.frontend_url,
        "Dreams backend started"
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
