use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};

use super::{BackendKind, RecordSource};
use crate::config::DatabaseConfig;
use crate::error::SyncError;
use crate::models::{FieldValue, Record};

pub struct MySqlSource {
    config: DatabaseConfig,
}

impl MySqlSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> Result<MySqlConnectOptions, SyncError> {
        if let Some(url) = &self.config.connection_string {
            return Ok(url.parse()?);
        }

        let port = self
            .config
            .port
            .or(BackendKind::MySql.default_port())
            .unwrap_or(3306);
        let mut options = MySqlConnectOptions::new().port(port);
        if let Some(host) = &self.config.host {
            options = options.host(host);
        }
        if let Some(user) = &self.config.user {
            options = options.username(user);
        }
        if let Some(password) = &self.config.password {
            options = options.password(password);
        }
        if let Some(name) = &self.config.name {
            options = options.database(name);
        }
        Ok(options)
    }
}

#[async_trait]
impl RecordSource for MySqlSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, SyncError> {
        let options = self.connect_options()?;
        let mut conn = MySqlConnection::connect_with(&options).await?;

        let rows = sqlx::query(self.config.query_or_default())
            .fetch_all(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close MySQL connection");
        }

        let records = rows?
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(count = records.len(), "Fetched records from MySQL");
        Ok(records)
    }

    fn name(&self) -> &str {
        BackendKind::MySql.as_str()
    }
}

fn row_to_record(row: &MySqlRow) -> Result<Record, SyncError> {
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
            "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
                FieldValue::Text(row.try_get::<String, _>(idx)?)
            }
            "BOOLEAN" => FieldValue::Bool(row.try_get::<bool, _>(idx)?),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                FieldValue::Integer(row.try_get::<i64, _>(idx)?)
            }
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => {
                let n = row.try_get::<u64, _>(idx)?;
                i64::try_from(n)
                    .map(FieldValue::Integer)
                    .unwrap_or_else(|_| FieldValue::Text(n.to_string()))
            }
            "FLOAT" | "DOUBLE" => FieldValue::Float(row.try_get::<f64, _>(idx)?),
            "DATE" => FieldValue::Date(row.try_get::<NaiveDate, _>(idx)?),
            "DATETIME" => FieldValue::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
            "TIMESTAMP" => FieldValue::TimestampTz(row.try_get::<DateTime<Utc>, _>(idx)?),
            "JSON" => FieldValue::Text(row.try_get::<serde_json::Value, _>(idx)?.to_string()),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_string_is_parsed() {
        let source = MySqlSource::new(DatabaseConfig {
            backend: "mysql".to_string(),
            connection_string: Some("mysql://sync:pw@mysql.internal:3307/crm".to_string()),
            ..Default::default()
        });
        let options = source.connect_options().unwrap();
        assert_eq!(options.get_host(), "mysql.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_database(), Some("crm"));
    }

    #[test]
    fn test_fields_build_options_with_default_port() {
        let source = MySqlSource::new(DatabaseConfig {
            backend: "mysql".to_string(),
            host: Some("mysql.internal".to_string()),
            user: Some("sync".to_string()),
            ..Default::default()
        });
        let options = source.connect_options().unwrap();
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "sync");
        assert_eq!(source.name(), "mysql");
    }

    #[test]
    fn test_mongo_uri_is_ignored() {
        let source = MySqlSource::new(DatabaseConfig {
            backend: "mysql".to_string(),
            host: Some("mysql.internal".to_string()),
            mongo_connection_string: Some("mongodb://m:27017/crm".to_string()),
            ..Default::default()
        });
        let options = source.connect_options().unwrap();
        assert_eq!(options.get_host(), "mysql.internal");
        assert_eq!(options.get_port(), 3306);
    }
}
