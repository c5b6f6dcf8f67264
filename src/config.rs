use derive_more::{Display, Error};
use std::env;

/// Process-wide configuration, read once at startup from the environment
/// (a `.env` file is honored when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// HS256 signing secret. Required: there is no insecure fallback, a
    /// missing or empty secret aborts startup.
    pub jwt_secret: String,
    /// Origin allowed by CORS, e.g. the dev frontend at http://localhost:5173.
    pub allowed_origin: String,
    /// SQLite database path.
    pub db_path: String,
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("TASKFLOW_JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[display("invalid {key} value: {value}")]
    Invalid { key: &'static str, value: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = match env::var("TASKFLOW_JWT_SECRET") {
            Ok(s) if !s.trim().is_empty() => s,
            _ => return Err(ConfigError::MissingSecret),
        };

        let port = match env::var("TASKFLOW_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "TASKFLOW_PORT",
                value: raw,
            })?,
            Err(_) => {
                log::info!("TASKFLOW_PORT not set, using default: 3000");
                3000
            }
        };

        let allowed_origin = env::var("TASKFLOW_ALLOWED_ORIGIN").unwrap_or_else(|_| {
            log::info!("TASKFLOW_ALLOWED_ORIGIN not set, using default: http://localhost:5173");
            "http://localhost:5173".to_string()
        });

        let db_path = env::var("TASKFLOW_DB").unwrap_or_else(|_| {
            log::info!("TASKFLOW_DB not set, using default: taskflow.db");
            "taskflow.db".to_string()
        });

        Ok(Config {
            port,
            jwt_secret,
            allowed_origin,
            db_path,
        })
    }
}
