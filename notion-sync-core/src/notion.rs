//! Notion API client.
//!
//! Three calls are used: a filtered database query to find the page for a
//! uid, page creation, and page patching. Each call is a single attempt;
//! a non-success status becomes [`NotionError::Api`] with whatever detail
//! the response body offers.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config::NotionConfig;
use crate::models::Record;
use crate::properties::{format_properties, format_update_properties, UID_PROPERTY};

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing Notion integration token")]
    MissingToken,
}

/// Remote page operations needed by the sync loop.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Id of the page whose UID property equals `uid`, if one exists.
    async fn exists(&self, uid: &str) -> Result<Option<String>, NotionError>;

    /// Create a page from every mapped field of `record`.
    async fn create(&self, record: &Record) -> Result<Value, NotionError>;

    /// Patch the mutable fields of `record` onto `page_id`.
    async fn update(&self, page_id: &str, record: &Record) -> Result<Value, NotionError>;
}

#[derive(Debug, Deserialize)]
struct NotionErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<PageRef>,
}

#[derive(Debug, Deserialize)]
struct PageRef {
    id: String,
}

#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self, NotionError> {
        if config.token.is_empty() {
            return Err(NotionError::MissingToken);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn database_id(&self) -> &str {
        &self.config.database_id
    }

    async fn send(&self, method: Method, path: &str, body: &Value) -> Result<Value, NotionError> {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);

        let response = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.api_version)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<NotionErrorResponse>(&error_body).ok();

            let code = detail
                .as_ref()
                .and_then(|d| d.code.clone())
                .unwrap_or_else(|| "unknown".to_string());
            let message = detail
                .and_then(|d| d.message)
                .unwrap_or(error_body);

            tracing::error!(status = status.as_u16(), code = %code, message = %message, "Notion API error");

            return Err(NotionError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PageStore for NotionClient {
    async fn exists(&self, uid: &str) -> Result<Option<String>, NotionError> {
        let path = format!("/databases/{}/query", self.config.database_id);
        let body = json!({
            "filter": {
                "property": UID_PROPERTY,
                "rich_text": { "equals": uid }
            }
        });

        let response = self.send(Method::POST, &path, &body).await?;
        let query: QueryResponse = serde_json::from_value(response)?;

        Ok(query.results.into_iter().next().map(|page| page.id))
    }

    async fn create(&self, record: &Record) -> Result<Value, NotionError> {
        let body = json!({
            "parent": { "database_id": self.config.database_id },
            "properties": format_properties(record),
        });

        let page = self.send(Method::POST, "/pages", &body).await?;
        tracing::info!(uid = record.uid().as_deref().unwrap_or("unknown"), "Created Notion page");
        Ok(page)
    }

    async fn update(&self, page_id: &str, record: &Record) -> Result<Value, NotionError> {
        let path = format!("/pages/{}", page_id);
        let body = json!({ "properties": format_update_properties(record) });

        let page = self.send(Method::PATCH, &path, &body).await?;
        tracing::info!(page_id = %page_id, "Updated Notion page");
        Ok(page)
    }
}
