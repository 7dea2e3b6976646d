// src/config.rs

use std::{env, path::PathBuf};

use dotenvy::dotenv;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Seconds between two Postgres health probes.
pub const STORE_PROBE_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs on local JSON files only.
    pub database_url: Option<String>,
    /// Root of the JSON fallback storage.
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
    pub admin_username: String,
    pub admin_password: String,
    /// Built frontend to serve for non-API paths.
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = non_empty_var("DATABASE_URL");

        let data_dir = non_empty_var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let port = match non_empty_var("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Invalid PORT value '{}': {}, using {}", raw, e, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username =
            non_empty_var("ADMIN_USERNAME").unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
        let admin_password =
            non_empty_var("ADMIN_PASSWORD").unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());

        let static_dir = non_empty_var("STATIC_DIR").map(PathBuf::from);

        let cors_origins = non_empty_var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            database_url,
            data_dir,
            port,
            rust_log,
            admin_username,
            admin_password,
            static_dir,
            cors_origins,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
