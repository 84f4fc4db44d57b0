use thiserror::Error;

use crate::notion::NotionError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported database type: {0}")]
    UnsupportedBackend(String),

    #[error("Database backend '{backend}' is not available in this build (enable the `{feature}` feature)")]
    BackendUnavailable {
        backend: &'static str,
        feature: &'static str,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Column '{column}' has unsupported type {type_name}; cast it in DB_QUERY")]
    UnsupportedColumn { column: String, type_name: String },

    #[error("Notion error: {0}")]
    Notion(#[from] NotionError),
}
