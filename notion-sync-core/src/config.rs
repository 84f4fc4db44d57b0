use config::{Config, File};
use serde::Deserialize;

use crate::connectors::BackendKind;
use crate::error::SyncError;

pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Environment variables and the config keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("NOTION_TOKEN", "notion.token"),
    ("NOTION_DATABASE_ID", "notion.database_id"),
    ("NOTION_API_URL", "notion.api_url"),
    ("NOTION_TIMEOUT_SECONDS", "notion.timeout_seconds"),
    ("DB_TYPE", "database.backend"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("DB_QUERY", "database.query"),
    ("DB_COLLECTION", "database.collection"),
    ("DB_CONNECTION_STRING", "database.connection_string"),
    ("MONGO_CONNECTION_STRING", "database.mongo_connection_string"),
    ("SQLITE_DB_PATH", "database.sqlite_path"),
];

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub notion: NotionConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotionConfig {
    pub token: String,
    pub database_id: String,
    pub api_url: String,
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            database_id: String::new(),
            api_url: DEFAULT_NOTION_API_URL.to_string(),
            api_version: NOTION_API_VERSION.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Connection settings shared by every backend. Unset values fall back to
/// the selected backend's defaults.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub query: Option<String>,
    pub collection: Option<String>,
    pub connection_string: Option<String>,
    /// Read only by the MongoDB backend, ahead of `connection_string`.
    pub mongo_connection_string: Option<String>,
    pub sqlite_path: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Postgres.as_str().to_string(),
            host: None,
            port: None,
            user: None,
            password: None,
            name: None,
            query: None,
            collection: None,
            connection_string: None,
            mongo_connection_string: None,
            sqlite_path: None,
        }
    }
}

impl DatabaseConfig {
    pub fn backend_kind(&self) -> Result<BackendKind, SyncError> {
        self.backend.parse()
    }
}

impl SyncConfig {
    /// Build the configuration from an optional TOML file, the process
    /// environment and an optional backend override, then validate it.
    pub fn load(path: Option<&str>, backend: Option<&str>) -> Result<Self, SyncError> {
        Self::load_from(path, backend, |key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::load`] with an explicit environment lookup.
    pub fn load_from<F>(path: Option<&str>, backend: Option<&str>, env: F) -> Result<Self, SyncError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        for (var, key) in ENV_OVERRIDES {
            let value = env(var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }
        builder = builder.set_override_option("database.backend", backend)?;

        let config: SyncConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.notion.token.trim().is_empty() || self.notion.database_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "NOTION_TOKEN and NOTION_DATABASE_ID must be provided".to_string(),
            ));
        }
        if self.notion.timeout_seconds == 0 {
            return Err(SyncError::InvalidConfig(
                "notion.timeout_seconds must be greater than zero".to_string(),
            ));
        }
        self.database.backend_kind()?;
        Ok(())
    }
}
