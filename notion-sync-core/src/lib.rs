pub mod config;
pub mod connectors;
pub mod error;
pub mod models;
pub mod notion;
pub mod properties;
pub mod sync;

pub use crate::config::SyncConfig;
pub use connectors::{create_source, BackendKind, RecordSource};
pub use error::SyncError;
pub use models::{FieldValue, Record, RecordError, SyncSummary};
pub use notion::{NotionClient, NotionError, PageStore};
pub use sync::{run_sync, sync_records};
