use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::error::StoreError;
use crate::types::activity::{ActivityFile, CanonicalActivity, StreamSet};

/// Persistence boundary for canonical activities and synced files.
pub trait ActivityStore: Send + Sync {
    /// Activity whose start time and duration both match exactly.
    fn find_existing(
        &self,
        start_time_iso: &str,
        duration_seconds: f64,
    ) -> Result<Option<CanonicalActivity>, StoreError>;

    /// Returns the saved activity id.
    fn save(&self, activity: CanonicalActivity, streams: StreamSet) -> Result<String, StoreError>;

    fn is_file_known(&self, file: &ActivityFile) -> Result<bool, StoreError>;

    fn record_file(&self, file: &ActivityFile) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DedupKey {
    start_time: String,
    duration_bits: u64,
}

impl DedupKey {
    fn new(start_time_iso: &str, duration_seconds: f64) -> Self {
        Self {
            start_time: start_time_iso.to_string(),
            duration_bits: duration_seconds.to_bits(),
        }
    }
}

type FileKey = (String, PathBuf, String);

#[derive(Debug, Clone)]
pub struct StoredActivity {
    pub activity: CanonicalActivity,
    pub streams: StreamSet,
}

/// In-process store; contents live as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    activities: DashMap<DedupKey, StoredActivity>,
    files: DashMap<FileKey, DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved activities ordered by start time.
    pub fn activities(&self) -> Vec<CanonicalActivity> {
        let mut activities: Vec<_> = self
            .activities
            .iter()
            .map(|entry| entry.activity.clone())
            .collect();
        activities.sort_by_key(|activity| activity.start_time);
        activities
    }

    pub fn get(&self, id: &str) -> Option<StoredActivity> {
        self.activities
            .iter()
            .find(|entry| entry.activity.id == id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl ActivityStore for MemoryStore {
    fn find_existing(
        &self,
        start_time_iso: &str,
        duration_seconds: f64,
    ) -> Result<Option<CanonicalActivity>, StoreError> {
        let key = DedupKey::new(start_time_iso, duration_seconds);
        Ok(self.activities.get(&key).map(|entry| entry.activity.clone()))
    }

    fn save(&self, activity: CanonicalActivity, streams: StreamSet) -> Result<String, StoreError> {
        let key = DedupKey::new(&activity.start_time_iso(), activity.duration_seconds());
        let id = activity.id.clone();

        match self.activities.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Conflict(id)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(StoredActivity { activity, streams });
                Ok(id)
            }
        }
    }

    fn is_file_known(&self, file: &ActivityFile) -> Result<bool, StoreError> {
        Ok(self.files.contains_key(&file_key(file)))
    }

    fn record_file(&self, file: &ActivityFile) -> Result<(), StoreError> {
        self.files.insert(file_key(file), Utc::now());
        Ok(())
    }
}

fn file_key(file: &ActivityFile) -> FileKey {
    let (host_id, path, hash) = file.identity();
    (host_id.to_string(), path.to_path_buf(), hash.to_string())
}
