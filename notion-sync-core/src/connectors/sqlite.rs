use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};

use super::{BackendKind, RecordSource, DEFAULT_SQLITE_PATH};
use crate::config::DatabaseConfig;
use crate::error::SyncError;
use crate::models::{FieldValue, Record};

/// SQLite connector. The database file is opened read-only and must exist.
pub struct SqliteSource {
    config: DatabaseConfig,
}

impl SqliteSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> Result<SqliteConnectOptions, SyncError> {
        if let Some(url) = &self.config.connection_string {
            return Ok(url.parse()?);
        }

        let path = self
            .config
            .sqlite_path
            .as_deref()
            .unwrap_or(DEFAULT_SQLITE_PATH);
        Ok(SqliteConnectOptions::new().filename(path).read_only(true))
    }
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, SyncError> {
        let options = self.connect_options()?;
        let mut conn = SqliteConnection::connect_with(&options).await?;

        let rows = sqlx::query(self.config.query_or_default())
            .fetch_all(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close SQLite connection");
        }

        let records = rows?
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(count = records.len(), "Fetched records from SQLite");
        Ok(records)
    }

    fn name(&self) -> &str {
        BackendKind::Sqlite.as_str()
    }
}

/// SQLite values are decoded by their storage class, not the declared
/// column type; dates come back as the TEXT they were stored as.
fn row_to_record(row: &SqliteRow) -> Result<Record, SyncError> {
    let mut record = Record::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            record.insert(column.name(), FieldValue::Null);
            continue;
        }
        let type_name = raw.type_info().name().to_string();

        let value = match type_name.as_str() {
            "TEXT" => FieldValue::Text(row.try_get::<String, _>(idx)?),
            "INTEGER" => FieldValue::Integer(row.try_get::<i64, _>(idx)?),
            "REAL" => FieldValue::Float(row.try_get::<f64, _>(idx)?),
            _ => {
                return Err(SyncError::UnsupportedColumn {
                    column: column.name().to_string(),
                    type_name,
                })
            }
        };
        record.insert(column.name(), value);
    }

    Ok(record)
}
