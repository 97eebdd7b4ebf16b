use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a completed merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub output_path: PathBuf,
    pub merged_items: usize,
    /// Item labels in merge order.
    pub sources: Vec<String>,
    pub skipped_inputs: Vec<String>,
    pub bytes_written: u64,
    pub duration: Duration,
    pub merged_at: DateTime<Utc>,
    pub dry_run: bool,
}

impl MergeReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped_inputs.is_empty()
    }
}
