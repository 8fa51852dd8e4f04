//! Environment-driven runtime configuration, loaded once at startup.

use std::{env, path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::warn;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "sqlite:gestor.db";
const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub chromium_path: Option<PathBuf>,
    pub render_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("PORT") {
            Err(_) => DEFAULT_PORT,
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, using an insecure development secret");
            "supersecret".to_string()
        });
        let chromium_path = env::var("CHROMIUM_PATH").ok().map(PathBuf::from);
        let render_timeout = match env::var("RENDER_TIMEOUT_SECS") {
            Err(_) => Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| ConfigError::Invalid {
                name: "RENDER_TIMEOUT_SECS",
                value: raw,
            })?),
        };

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            chromium_path,
            render_timeout,
        })
    }
}
