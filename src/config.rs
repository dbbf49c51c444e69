//! Process-scoped configuration, assembled once at startup and handed to the
//! components that need it.
use core::time::Duration;
use std::env::var;

use crate::constants::{
    api::{
        BIND_ADDRESS_VAR, DEFAULT_BIND_ADDRESS, DEFAULT_FRONTEND_URL, DEFAULT_PORT,
        FRONTEND_URL_VAR, PORT_VAR,
    },
    db::DATABASE_URL_VAR,
    secrets::env_or_secret,
    stripe::{
        DEFAULT_WEBHOOK_TOLERANCE_SECS, STRIPE_SECRET_KEY_VAR, STRIPE_WEBHOOK_SECRET_VAR,
        STRIPE_WEBHOOK_TOLERANCE_VAR,
    },
};

/// Everything the service reads from its environment.
#[derive(Clone)]
pub struct AppConfig {
    /// Stripe API secret key, used to create checkout sessions.
    pub stripe_secret_key: String,
    /// Signing secret of the webhook endpoint.
    pub stripe_webhook_secret: String,
    /// Allowed distance between a webhook's signed timestamp and now.
    pub webhook_tolerance: Duration,
    /// Postgres connection URL.
    pub database_url: String,
    /// Base URL of the frontend, used for checkout redirects.
    pub frontend_url: String,
    /// Host to bind the listener to.
    pub bind_address: String,
    /// Port to bind the listener to.
    pub port: u16,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_tolerance", &self.webhook_tolerance)
            .field("frontend_url", &self.frontend_url)
            .field("bind_address", &self.bind_address)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Read the configuration from environment variables (or docker secrets
    /// for the sensitive values).
    pub fn from_env() -> Result<Self, errors::ConfigError> {
        let frontend_url = var(FRONTEND_URL_VAR)
            .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let port = match var(PORT_VAR) {
            Ok(raw) => raw.parse().map_err(|_err| errors::ConfigError::Invalid {
                name: PORT_VAR,
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let webhook_tolerance = match var(STRIPE_WEBHOOK_TOLERANCE_VAR) {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_err| {
                errors::ConfigError::Invalid {
                    name: STRIPE_WEBHOOK_TOLERANCE_VAR,
                    value: raw,
                }
            })?),
            Err(_) => Duration::from_secs(DEFAULT_WEBHOOK_TOLERANCE_SECS),
        };
        Ok(Self {
            stripe_secret_key: required(STRIPE_SECRET_KEY_VAR)?,
            stripe_webhook_secret: required(STRIPE_WEBHOOK_SECRET_VAR)?,
            webhook_tolerance,
            database_url: required(DATABASE_URL_VAR)?,
            frontend_url,
            bind_address: var(BIND_ADDRESS_VAR).unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned()),
            port,
        })
    }

    /// The address the HTTP listener binds to.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn required(name: &'static str) -> Result<String, errors::ConfigError> {
    env_or_secret(name)
        .map_err(|source| errors::ConfigError::Secret { name, source })?
        .filter(|value| !value.is_empty())
        .ok_or(errors::ConfigError::Missing(name))
}

pub mod errors {
    use thiserror::Error;

    /// Reasons the service configuration could not be assembled.
    #[derive(Error, Debug)]
    pub enum ConfigError {
        #[error("Neither {0} nor {0}_DOCKER_SECRET provided in environment variables")]
        Missing(&'static str),
        #[error("{name} has an invalid value: {value:?}")]
        Invalid { name: &'static str, value: String },
        #[error("Failed to read {name} docker secret: {source}")]
        Secret {
            name: &'static str,
            source: std::io::Error,
        },
    }
}
