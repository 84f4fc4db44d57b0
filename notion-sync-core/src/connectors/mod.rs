//! Database connectors.
//!
//! Each backend opens its own connection inside [`RecordSource::fetch_records`],
//! selects the rows whose `sync_status` is absent or not `"synced"`, and closes
//! the connection before returning. Backends are cargo features; selecting
//! one that was compiled out is a [`SyncError::BackendUnavailable`].

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::error::SyncError;
use crate::models::Record;

#[cfg(feature = "mongodb")]
pub mod mongo;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Query used by the SQL backends when none is configured.
pub const DEFAULT_QUERY: &str = r#"
    SELECT
        uid, name, status, reviewer_name,
        review_date, next_follow_up, date_added,
        platform, socials
    FROM fud_outreach_tracker
    WHERE sync_status IS NULL OR sync_status != 'synced'
    ORDER BY date_added DESC
"#;

pub const DEFAULT_COLLECTION: &str = "fud_outreach_tracker";
pub const DEFAULT_SQLITE_PATH: &str = "database.db";

/// Source of records awaiting sync.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<Record>, SyncError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    MySql,
    Sqlite,
    MongoDb,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgresql",
            BackendKind::MySql => "mysql",
            BackendKind::Sqlite => "sqlite",
            BackendKind::MongoDb => "mongodb",
        }
    }

    /// Cargo feature that compiles this backend in.
    pub fn feature(self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgres",
            BackendKind::MySql => "mysql",
            BackendKind::Sqlite => "sqlite",
            BackendKind::MongoDb => "mongodb",
        }
    }

    pub fn default_port(self) -> Option<u16> {
        match self {
            BackendKind::Postgres => Some(5432),
            BackendKind::MySql => Some(3306),
            BackendKind::Sqlite => None,
            BackendKind::MongoDb => Some(27017),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(BackendKind::Postgres),
            "mysql" => Ok(BackendKind::MySql),
            "sqlite" => Ok(BackendKind::Sqlite),
            "mongodb" | "mongo" => Ok(BackendKind::MongoDb),
            _ => Err(SyncError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Create the connector for the configured backend.
pub fn create_source(config: &DatabaseConfig) -> Result<Box<dyn RecordSource>, SyncError> {
    let kind = config.backend_kind()?;
    match kind {
        #[cfg(feature = "postgres")]
        BackendKind::Postgres => Ok(Box::new(postgres::PostgresSource::new(config.clone()))),
        #[cfg(feature = "mysql")]
        BackendKind::MySql => Ok(Box::new(mysql::MySqlSource::new(config.clone()))),
        #[cfg(feature = "sqlite")]
        BackendKind::Sqlite => Ok(Box::new(sqlite::SqliteSource::new(config.clone()))),
        #[cfg(feature = "mongodb")]
        BackendKind::MongoDb => Ok(Box::new(mongo::MongoSource::new(config.clone())?)),
        #[allow(unreachable_patterns)]
        other => Err(SyncError::BackendUnavailable {
            backend: other.as_str(),
            feature: other.feature(),
        }),
    }
}

impl DatabaseConfig {
    /// Configured query, or [`DEFAULT_QUERY`].
    pub fn query_or_default(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }
}
