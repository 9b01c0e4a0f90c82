use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use interfaces_ao3_works::index::DEFAULT_BASE_URL;
use thiserror::Error;
use utils_trace::LogFormat;

pub const DEFAULT_TABLE: &str = "popularity_classifier";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub log_format: LogFormat,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub ao3_base_url: String,
    pub fetch_timeout: Duration,
    pub store: StoreConfig,
}

/// Where prediction rows go. `DATABASE_URL` wins over the REST credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres { database_url: String },
    Supabase { url: String, key: String, table: String },
    Missing,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Dotenv: {source}")]
    Dotenv { source: dotenvy::Error },
}

/// Loads `.env` from the working directory or its parents. Returns whether a
/// file was found; only a missing file is tolerated.
pub fn load_dotenv() -> Result<bool, ConfigError> {
    found_dotenv(dotenvy::dotenv().map(|_| ()))
}

pub fn load_dotenv_from(path: &Path) -> Result<bool, ConfigError> {
    found_dotenv(dotenvy::from_path(path))
}

fn found_dotenv(result: Result<(), dotenvy::Error>) -> Result<bool, ConfigError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(source) => Err(ConfigError::Dotenv { source }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.parse::<SocketAddr>().map_err(|err| {
                ConfigError::Invalid {
                    key: "BIND_ADDR",
                    reason: err.to_string(),
                    value,
                }
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 5001)),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(value) => value.parse::<LogFormat>().map_err(|err| {
                ConfigError::Invalid {
                    key: "LOG_FORMAT",
                    reason: err.to_string(),
                    value,
                }
            })?,
            None => LogFormat::default(),
        };

        let fetch_timeout = match get("FETCH_TIMEOUT_MS") {
            Some(value) => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "FETCH_TIMEOUT_MS",
                        value,
                        reason: "expected a positive number of milliseconds".to_string(),
                    })
                }
            },
            None => Duration::from_secs(30),
        };

        let store = match (get("DATABASE_URL"), get("SUPABASE_URL"), get("SUPABASE_KEY")) {
            (Some(database_url), _, _) => StoreConfig::Postgres { database_url },
            (None, Some(url), Some(key)) => StoreConfig::Supabase {
                url,
                key,
                table: get("SUPABASE_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            },
            _ => StoreConfig::Missing,
        };

        Ok(Self {
            bind_addr,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            model_path: get("MODEL_PATH")
                .unwrap_or_else(|| "model/gradient_boosting.json".to_string())
                .into(),
            scaler_path: get("SCALER_PATH")
                .unwrap_or_else(|| "model/scaler.json".to_string())
                .into(),
            ao3_base_url: get("AO3_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fetch_timeout,
            store,
        })
    }
}
