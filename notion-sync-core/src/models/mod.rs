pub mod record;
pub mod summary;

pub use record::{FieldValue, Record};
pub use summary::{RecordError, SyncSummary};
