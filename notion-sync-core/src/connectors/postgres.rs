use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};

use super::{BackendKind, RecordSource};
use crate::config::DatabaseConfig;
use crate::error::SyncError;
use crate::models::{FieldValue, Record};

pub struct PostgresSource {
    config: DatabaseConfig,
}

impl PostgresSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    fn connect_options(&self) -> Result<PgConnectOptions, SyncError> {
        if let Some(url) = &self.config.connection_string {
            return Ok(url.parse()?);
        }

        let port = self
            .config
            .port
            .or(BackendKind::Postgres.default_port())
            .unwrap_or(5432);
        let mut options = PgConnectOptions::new().port(port);
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
impl RecordSource for PostgresSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, SyncError> {
        let options = self.connect_options()?;
        let mut conn = PgConnection::connect_with(&options).await?;

        let rows = sqlx::query(self.config.query_or_default())
            .fetch_all(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close PostgreSQL connection");
        }

        let records = rows?
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(count = records.len(), "Fetched records from PostgreSQL");
        Ok(records)
    }

    fn name(&self) -> &str {
        BackendKind::Postgres.as_str()
    }
}

fn row_to_record(row: &PgRow) -> Result<Record, SyncError> {
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
            "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
                FieldValue::Text(row.try_get::<String, _>(idx)?)
            }
            "INT2" => FieldValue::Integer(row.try_get::<i16, _>(idx)?.into()),
            "INT4" => FieldValue::Integer(row.try_get::<i32, _>(idx)?.into()),
            "INT8" => FieldValue::Integer(row.try_get::<i64, _>(idx)?),
            "FLOAT4" => FieldValue::Float(row.try_get::<f32, _>(idx)?.into()),
            "FLOAT8" => FieldValue::Float(row.try_get::<f64, _>(idx)?),
            "BOOL" => FieldValue::Bool(row.try_get::<bool, _>(idx)?),
            "DATE" => FieldValue::Date(row.try_get::<NaiveDate, _>(idx)?),
            "TIMESTAMP" => FieldValue::Timestamp(row.try_get::<NaiveDateTime, _>(idx)?),
            "TIMESTAMPTZ" => FieldValue::TimestampTz(row.try_get::<DateTime<Utc>, _>(idx)?),
            "UUID" => FieldValue::Text(row.try_get::<uuid::Uuid, _>(idx)?.to_string()),
            "JSON" | "JSONB" => {
                FieldValue::Text(row.try_get::<serde_json::Value, _>(idx)?.to_string())
            }
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
    fn test_connection_string_overrides_fields() {
        let source = PostgresSource::new(DatabaseConfig {
            connection_string: Some("postgres://sync:pw@db.example.com:6543/leads".to_string()),
            host: Some("ignored".to_string()),
            ..Default::default()
        });
        let options = source.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("leads"));
    }

    #[test]
    fn test_fields_build_options_with_default_port() {
        let source = PostgresSource::new(DatabaseConfig {
            host: Some("pg.internal".to_string()),
            user: Some("sync".to_string()),
            name: Some("crm".to_string()),
            ..Default::default()
        });
        let options = source.connect_options().unwrap();
        assert_eq!(options.get_host(), "pg.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_username(), "sync");
        assert_eq!(options.get_database(), Some("crm"));
    }

    #[test]
    fn test_bad_connection_string_is_error() {
        let source = PostgresSource::new(DatabaseConfig {
            connection_string: Some("not a url".to_string()),
            ..Default::default()
        });
        assert!(matches!(source.connect_options(), Err(SyncError::Database(_))));
    }
}
