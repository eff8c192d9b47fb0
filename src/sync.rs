use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{ScanError, SyncError};
use crate::pipeline::archive::expand_archives;
use crate::pipeline::dedup;
use crate::pipeline::derive::append_derived_streams;
use crate::pipeline::normalize::normalize;
use crate::pipeline::parse::ActivityParser;
use crate::pipeline::scan::{scan, ScanRequest};
use crate::store::ActivityStore;
use crate::types::activity::ActivityFile;
use crate::types::athlete::AthleteSettings;
use crate::types::sync::{
    FileOutcome, SyncEvent, SyncOptions, SyncProgress, SyncState, SyncSummary,
};

const STOP_REASON: &str = "Sync stopped on request";

/// Runs sync passes over a directory of recordings, one pass at a time.
///
/// Cloning is cheap; clones drive the same passes.
#[derive(Clone)]
pub struct Syncer {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    store: Arc<dyn ActivityStore>,
    parser: Arc<dyn ActivityParser>,
    athlete: AthleteSettings,
    host_id: String,
    state: Mutex<SyncState>,
    stop_requested: AtomicBool,
    last_pass: Mutex<Vec<SyncEvent>>,
}

/// A started pass and its lifecycle events.
pub struct SyncHandle {
    pub pass_id: Uuid,
    pub events: mpsc::UnboundedReceiver<SyncEvent>,
}

enum PassEnd {
    Completed(SyncSummary),
    Stopped,
}

impl Syncer {
    pub fn new(
        store: Arc<dyn ActivityStore>,
        parser: Arc<dyn ActivityParser>,
        athlete: AthleteSettings,
        host_id: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                store,
                parser,
                athlete,
                host_id: host_id.into(),
                state: Mutex::new(SyncState::Idle),
                stop_requested: AtomicBool::new(false),
                last_pass: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Starts a pass over `root` in the background.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`SyncError::AlreadyStarted`] while another pass is running, leaving it untouched.
    pub fn sync(
        &self,
        root: impl Into<PathBuf>,
        options: SyncOptions,
    ) -> Result<SyncHandle, SyncError> {
        {
            let mut state = lock(&self.inner.state);
            if *state == SyncState::Syncing {
                return Err(SyncError::AlreadyStarted);
            }
            *state = SyncState::Syncing;
        }
        self.inner.stop_requested.store(false, Ordering::SeqCst);
        lock(&self.inner.last_pass).clear();

        let pass_id = Uuid::new_v4();
        let (tx, events) = mpsc::unbounded_channel();
        let root = root.into();
        let inner = self.inner.clone();
        let span = tracing::info_span!("sync_pass", %pass_id);

        tokio::spawn(
            async move {
                inner.emit(&tx, SyncEvent::Started { pass_id });
                tracing::info!("Sync started on {:?}", root);

                // The pass runs in its own task so a panic still ends in `Failed`.
                let pass = tokio::spawn(
                    {
                        let inner = inner.clone();
                        let tx = tx.clone();
                        async move { inner.run(&root, &options, &tx).await }
                    }
                    .in_current_span(),
                );

                let (state, terminal) = match pass.await {
                    Ok(Ok(PassEnd::Completed(summary))) => {
                        tracing::info!(
                            "Sync completed: {} files, {} saved, {} duplicates, {} unchanged",
                            summary.files,
                            summary.saved,
                            summary.duplicates,
                            summary.unchanged
                        );
                        (SyncState::Completed, SyncEvent::Completed(summary))
                    }
                    Ok(Ok(PassEnd::Stopped)) => {
                        tracing::info!("{}", STOP_REASON);
                        let reason = STOP_REASON.to_string();
                        (SyncState::Stopped, SyncEvent::Stopped { reason })
                    }
                    Ok(Err(err)) => {
                        tracing::error!("Sync failed: {}", err);
                        let error = err.to_string();
                        (SyncState::Failed, SyncEvent::Failed { error })
                    }
                    Err(join_err) => {
                        tracing::error!("Sync pass aborted: {}", join_err);
                        let error = format!("Sync pass aborted: {join_err}");
                        (SyncState::Failed, SyncEvent::Failed { error })
                    }
                };

                // Observers seeing the terminal event must already see the terminal state.
                lock(&inner.last_pass).push(terminal.clone());
                *lock(&inner.state) = state;
                let _ = tx.send(terminal);
            }
            .instrument(span),
        );

        Ok(SyncHandle { pass_id, events })
    }

    /// Asks the running pass to stop before its next file. Returns false when idle.
    pub fn stop(&self) -> bool {
        let syncing = *lock(&self.inner.state) == SyncState::Syncing;
        if syncing {
            tracing::info!("Stop requested");
            self.inner.stop_requested.store(true, Ordering::SeqCst);
        }
        syncing
    }

    pub fn state(&self) -> SyncState {
        *lock(&self.inner.state)
    }

    /// Events of the latest pass, in emission order.
    pub fn last_pass(&self) -> Vec<SyncEvent> {
        lock(&self.inner.last_pass).clone()
    }
}

impl SyncInner {
    fn emit(&self, tx: &mpsc::UnboundedSender<SyncEvent>, event: SyncEvent) {
        lock(&self.last_pass).push(event.clone());
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }

    async fn run(
        &self,
        root: &Path,
        options: &SyncOptions,
        tx: &mpsc::UnboundedSender<SyncEvent>,
    ) -> Result<PassEnd, SyncError> {
        if options.parse_archive_files {
            let extracted = expand_archives(root, options.recursive)?;
            if !extracted.is_empty() {
                tracing::info!("Extracted {} files from archives", extracted.len());
            }
        }

        let files = scan(&ScanRequest {
            root,
            host_id: &self.host_id,
            cutoff: options.cutoff_time,
            recursive: options.recursive,
        })?;

        let total = files.len();
        let mut summary = SyncSummary {
            files: total,
            saved: 0,
            duplicates: 0,
            unchanged: 0,
        };

        for (index, file) in files.iter().enumerate() {
            if self.stop_requested.load(Ordering::SeqCst) {
                return Ok(PassEnd::Stopped);
            }

            let outcome = self.process_file(file).await?;
            tracing::info!("[{}/{}] {:?}: {:?}", index + 1, total, file.path, outcome);

            match &outcome {
                FileOutcome::Saved { activity_ids } => summary.saved += activity_ids.len(),
                FileOutcome::Duplicate => summary.duplicates += 1,
                FileOutcome::Unchanged => summary.unchanged += 1,
            }

            if options.delete_source_after_sync {
                tokio::fs::remove_file(&file.path)
                    .await
                    .map_err(|source| SyncError::DeleteSource {
                        path: file.path.clone(),
                        source,
                    })?;
            }

            self.emit(
                tx,
                SyncEvent::Progress(SyncProgress {
                    path: file.path.clone(),
                    index,
                    total,
                    outcome,
                }),
            );
        }

        Ok(PassEnd::Completed(summary))
    }

    async fn process_file(&self, file: &ActivityFile) -> Result<FileOutcome, SyncError> {
        if self.store.is_file_known(file)? {
            return Ok(FileOutcome::Unchanged);
        }

        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|source| ScanError::ReadFile {
                path: file.path.clone(),
                source,
            })?;

        let event = self
            .parser
            .parse(&bytes, file.format)
            .map_err(|source| SyncError::Parse {
                path: file.path.clone(),
                source,
            })?;

        let mut activity_ids = Vec::new();
        for (activity, mut streams) in normalize(&event) {
            let start_time = activity.start_time_iso();
            if dedup::exists(self.store.as_ref(), &start_time, activity.duration_seconds())? {
                tracing::info!("Skipping duplicate activity {} at {}", activity.name, start_time);
                continue;
            }

            let start_date = activity.start_time.with_timezone(&Local).date_naive();
            let weight = self.athlete.weight_on(start_date);
            append_derived_streams(&activity, &mut streams, weight);

            activity_ids.push(self.store.save(activity, streams)?);
        }

        self.store.record_file(file)?;

        if activity_ids.is_empty() {
            Ok(FileOutcome::Duplicate)
        } else {
            Ok(FileOutcome::Saved { activity_ids })
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
