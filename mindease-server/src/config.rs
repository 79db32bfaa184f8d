//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use strum::{AsRefStr, Display, EnumString};

/// Which [`crate::db::DocumentStore`] implementation backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreBackend {
    /// Cloud Firestore over its REST API (production).
    Firestore,
    /// Local SQLite file via sqlx.
    Sqlite,
    /// Process-local map; data is lost on exit.
    Memory,
}

/// Runtime configuration for mindease-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs are written to a daily-rolling file in this directory.
    pub log_dir: Option<PathBuf>,

    /// Comma-separated list of allowed CORS origins. `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Mount Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Document store backend.
    pub store: StoreBackend,

    /// Path to the service-account key file used by the Firestore backend.
    pub credentials_path: PathBuf,

    /// Firestore project id; defaults to the `project_id` of the key file.
    pub firestore_project: Option<String>,

    /// Firestore database id.
    pub firestore_database: String,

    /// `host:port` of a Firestore emulator. Disables credential loading.
    pub firestore_emulator_host: Option<String>,

    /// sqlx SQLite URL used by the `sqlite` backend.
    pub database_url: String,

    /// Keep serving when the store cannot be initialised at startup.
    /// Every store operation then fails with the initialisation error.
    pub allow_degraded_start: bool,
}

/// Raised when an environment variable holds a value that cannot be used.
#[derive(Debug, thiserror::Error)]
#[error("invalid value '{value}' for {key}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| parse_flag(&v).unwrap_or(default))
                .unwrap_or(default)
        };
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match lookup("MINDEASE_STORE") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                key: "MINDEASE_STORE",
                value: raw,
            })?,
            None => StoreBackend::Firestore,
        };

        Ok(Self {
            bind_address: env_or("MINDEASE_BIND", "0.0.0.0:8000"),
            log_level: env_or("MINDEASE_LOG", "info"),
            log_json: flag("MINDEASE_LOG_JSON", false),
            log_dir: non_empty("MINDEASE_LOG_DIR").map(PathBuf::from),
            cors_allowed_origins: non_empty("MINDEASE_CORS_ORIGINS"),
            enable_swagger: flag("MINDEASE_ENABLE_SWAGGER", true),
            store,
            credentials_path: PathBuf::from(env_or(
                "MINDEASE_CREDENTIALS",
                "serviceAccountKey.json",
            )),
            firestore_project: non_empty("MINDEASE_FIRESTORE_PROJECT"),
            firestore_database: env_or("MINDEASE_FIRESTORE_DATABASE", "(default)"),
            firestore_emulator_host: non_empty("FIRESTORE_EMULATOR_HOST"),
            database_url: env_or("MINDEASE_DATABASE_URL", "sqlite://mindease.db"),
            allow_degraded_start: flag("MINDEASE_ALLOW_DEGRADED_START", false),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
