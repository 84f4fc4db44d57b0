//! Sync loop: per record, look up the Notion page by uid, then create or
//! update it. One record failing never stops the run.

use crate::connectors::RecordSource;
use crate::error::SyncError;
use crate::models::{Record, SyncSummary};
use crate::notion::{NotionError, PageStore};

enum Outcome {
    Created,
    Updated,
}

/// Fetch records from `source` and sync them into `pages`.
///
/// A failed fetch is returned as an error; per-record failures end up in
/// the summary.
pub async fn run_sync(
    source: &dyn RecordSource,
    pages: &dyn PageStore,
) -> Result<SyncSummary, SyncError> {
    tracing::info!(backend = source.name(), "Fetching data from internal database...");
    let records = source.fetch_records().await?;
    tracing::info!(count = records.len(), "Found records to sync");

    if records.is_empty() {
        tracing::info!("No records to sync");
        return Ok(SyncSummary::default());
    }

    Ok(sync_records(pages, records).await)
}

/// Sync `records` one at a time, in order.
pub async fn sync_records(pages: &dyn PageStore, records: Vec<Record>) -> SyncSummary {
    let mut summary = SyncSummary::default();

    for record in records {
        let Some(uid) = record.uid() else {
            tracing::warn!(record = ?record, "Skipping record without UID");
            summary.record_error(record, "Missing UID");
            continue;
        };

        match sync_one(pages, &uid, &record).await {
            Ok(Outcome::Created) => summary.created += 1,
            Ok(Outcome::Updated) => summary.updated += 1,
            Err(e) => {
                tracing::error!(uid = %uid, error = %e, "Error processing record");
                summary.record_error(record, e.to_string());
            }
        }
    }

    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        errors = summary.errors,
        "Sync summary"
    );

    summary
}

async fn sync_one(pages: &dyn PageStore, uid: &str, record: &Record) -> Result<Outcome, NotionError> {
    match pages.exists(uid).await? {
        Some(page_id) => {
            tracing::info!(uid = %uid, page_id = %page_id, "Updating existing record");
            pages.update(&page_id, record).await?;
            Ok(Outcome::Updated)
        }
        None => {
            tracing::info!(uid = %uid, "Creating new record");
            pages.create(record).await?;
            Ok(Outcome::Created)
        }
    }
}
