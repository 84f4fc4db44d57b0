use serde::Serialize;
use std::fmt::Write;

use super::Record;

/// Number of failures listed in the printed summary block.
pub const SHOWN_ERROR_DETAILS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct RecordError {
    pub record: Record,
    pub error: String,
}

/// Outcome of one sync run. Built fresh per run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub errors: usize,
    pub error_details: Vec<RecordError>,
}

impl SyncSummary {
    pub fn record_error(&mut self, record: Record, error: impl Into<String>) {
        self.errors += 1;
        self.error_details.push(RecordError {
            record,
            error: error.into(),
        });
    }

    pub fn total(&self) -> usize {
        self.created + self.updated + self.errors
    }

    /// Process exit status: 1 if any record failed.
    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 {
            1
        } else {
            0
        }
    }

    /// Human-readable block printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(50);
        let _ = writeln!(out, "\n{}", rule);
        let _ = writeln!(out, "SYNC COMPLETE");
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "✅ Created: {} new records", self.created);
        let _ = writeln!(out, "📝 Updated: {} existing records", self.updated);
        let _ = writeln!(out, "❌ Errors: {} failed records", self.errors);

        if !self.error_details.is_empty() {
            let _ = writeln!(out, "\nError Details:");
            for detail in self.error_details.iter().take(SHOWN_ERROR_DETAILS) {
                let uid = detail.record.uid().unwrap_or_else(|| "unknown".to_string());
                let _ = writeln!(out, "  - UID {}: {}", uid, detail.error);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_reflects_errors() {
        let mut summary = SyncSummary {
            created: 2,
            ..Default::default()
        };
        assert_eq!(summary.exit_code(), 0);

        summary.record_error(Record::new(), "Missing UID");
        assert_eq!(summary.exit_code(), 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_render_lists_first_five_errors() {
        let mut summary = SyncSummary::default();
        for i in 0..7 {
            summary.record_error(Record::new().with("uid", format!("u-{}", i)), "boom");
        }
        summary.record_error(Record::new(), "Missing UID");

        let text = summary.render();
        assert!(text.contains("SYNC COMPLETE"));
        assert!(text.contains("❌ Errors: 8 failed records"));
        assert!(text.contains("  - UID u-4: boom"));
        assert!(!text.contains("u-5"));
        assert!(!text.contains("unknown"));
    }

    #[test]
    fn test_render_uses_unknown_for_missing_uid() {
        let mut summary = SyncSummary::default();
        summary.record_error(Record::new().with("name", "Ada"), "Missing UID");
        assert!(summary.render().contains("  - UID unknown: Missing UID"));
    }
}
