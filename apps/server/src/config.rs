use std::{net::SocketAddr, time::Duration};

use derivatex_core::errors::{Error, Result};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Reads the server configuration from `DX_*` environment variables,
    /// loading a `.env` file first when one is present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr_raw = env_or("DX_LISTEN_ADDR", "0.0.0.0:8080");
        let listen_addr: SocketAddr = listen_addr_raw.parse().map_err(|e| {
            Error::Config(format!("Invalid DX_LISTEN_ADDR '{}': {}", listen_addr_raw, e))
        })?;
        let db_path = env_or("DX_DB_PATH", "./db/derivatex.db");
        let cors_allow = env_or("DX_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_raw = env_or("DX_REQUEST_TIMEOUT_MS", "30000");
        let timeout_ms: u64 = timeout_raw.parse().map_err(|e| {
            Error::Config(format!(
                "Invalid DX_REQUEST_TIMEOUT_MS '{}': {}",
                timeout_raw, e
            ))
        })?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
