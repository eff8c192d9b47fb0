use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncOptions {
    #[serde(default)]
    pub recursive: bool,
    /// Only files modified at or after this instant are synced.
    #[serde(default)]
    pub cutoff_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delete_source_after_sync: bool,
    #[serde(default)]
    pub parse_archive_files: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
    Completed,
    Stopped,
    Failed,
}

/// What happened to a single recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// New activities were handed to the store.
    Saved { activity_ids: Vec<String> },
    /// Every activity in the file already exists.
    Duplicate,
    /// The exact same file content was synced before.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub path: PathBuf,
    pub index: usize,
    pub total: usize,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub files: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub unchanged: usize,
}

/// Lifecycle of one sync pass: `Started`, any number of `Progress`, then exactly one
/// terminal event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    Started { pass_id: Uuid },
    Progress(SyncProgress),
    Stopped { reason: String },
    Failed { error: String },
    Completed(SyncSummary),
}

impl SyncEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SyncEvent::Stopped { .. } | SyncEvent::Failed { .. } | SyncEvent::Completed(_)
        )
    }
}
