//! Timeout-bounded extraction scheduling.
//!
//! The scheduler is the only component that talks to the index writer.
//! Documents are submitted one at a time; each extraction runs on its own
//! cancellable worker task so a hung extractor can be abandoned without
//! taking the submit loop down with it. Commits happen at fixed batch
//! boundaries counted in started extractions.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vfsearch_core::{
    DocumentPayload, ExtractError, IndexWriter, PlannedDocument, ReportSink, Severity, UpdateData,
};
use vfsearch_extract::FactoryRegistry;

/// Liveness thresholds for [`IndexScheduler::is_running`].
const STALL_WARN_AFTER: Duration = Duration::from_secs(30);
const STALL_ERROR_AFTER: Duration = Duration::from_secs(600);

// ============================================================================
// Configuration
// ============================================================================

/// What to do with a worker that outlives its extraction deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancellationPolicy {
    /// Signal the worker's cancellation token and move on. A worker stuck
    /// in blocking code keeps its thread until it finishes on its own.
    #[default]
    Cooperative,
    /// Additionally abort the worker task at its next yield point.
    Forced,
}

/// Scheduler tuning knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Per-document extraction deadline
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
    /// Commit after this many started extractions; 0 disables batching
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: u64,
    /// Treatment of timed-out workers
    #[serde(default)]
    pub cancellation: CancellationPolicy,
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_commit_threshold() -> u64 {
    500
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            commit_threshold: default_commit_threshold(),
            cancellation: CancellationPolicy::Cooperative,
        }
    }
}

/// Serializes a `Duration` as whole seconds in config files.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Counters for one scheduler run. [`IndexScheduler::run`] resets them on
/// entry, so each scope's summary stands on its own.
///
/// `started == returned + abandoned` holds whenever no worker is in
/// flight. Abandoned workers never touch the writer, so the index only
/// ever sees results of extractions that came back in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    /// Extractions handed to a worker
    pub started: u64,
    /// Workers that finished (successfully or not) within the deadline
    pub returned: u64,
    /// Workers given up on after the deadline
    pub abandoned: u64,
    /// Delete operations issued, defensive deletes included
    pub deleted: u64,
    /// Successful batch commits
    pub commits: u64,
    /// Wall time of the run, set when it finishes
    pub elapsed: Duration,
}

/// Watchdog state for the submission currently in flight. The warn and
/// error timestamps advance independently, so a long stall keeps warning
/// every 30 s while errors fire at most every 10 min.
struct StallTracker {
    since: Instant,
    last_warn: Instant,
    last_error: Instant,
}

impl StallTracker {
    fn new(now: Instant) -> Self {
        Self {
            since: now,
            last_warn: now,
            last_error: now,
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Serialized extraction scheduler in front of an index writer.
pub struct IndexScheduler {
    writer: Arc<dyn IndexWriter>,
    factories: Arc<FactoryRegistry>,
    report: Arc<dyn ReportSink>,
    config: SchedulerConfig,
    stats: Mutex<RunStatistics>,
    busy: Mutex<Option<StallTracker>>,
}

impl IndexScheduler {
    #[must_use]
    pub fn new(
        writer: Arc<dyn IndexWriter>,
        factories: Arc<FactoryRegistry>,
        report: Arc<dyn ReportSink>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            writer,
            factories,
            report,
            config,
            stats: Mutex::new(RunStatistics::default()),
            busy: Mutex::new(None),
        }
    }

    /// Snapshot of the run counters.
    #[must_use]
    pub fn stats(&self) -> RunStatistics {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    /// Liveness probe for an external watchdog.
    ///
    /// Returns whether a worker is currently in flight, and escalates
    /// through the report sink when the current submission has been
    /// waiting suspiciously long: a warning at most every 30 s since the
    /// last warning, an error at most every 10 min since the last error,
    /// each tracked on its own monotonic timestamp.
    #[must_use]
    pub fn is_running(&self) -> bool {
        let Ok(mut guard) = self.busy.lock() else {
            return false;
        };
        let Some(stall) = guard.as_mut() else {
            return false;
        };

        let now = Instant::now();
        let total = now.duration_since(stall.since);
        if now.duration_since(stall.last_error) > STALL_ERROR_AFTER {
            stall.last_error = now;
            self.report.println(
                &format!("extraction stalled for {}s", total.as_secs()),
                Severity::Error,
            );
        }
        if now.duration_since(stall.last_warn) > STALL_WARN_AFTER {
            stall.last_warn = now;
            self.report.println(
                &format!("extraction slow, running for {}s", total.as_secs()),
                Severity::Warn,
            );
        }
        true
    }

    /// Submit one planned document for extraction and indexing.
    ///
    /// The call returns once the document is fully handled: upserted,
    /// defensively deleted, or abandoned. A failure of any one document
    /// never propagates to the caller; the loop must keep moving.
    pub async fn submit(&self, doc: &PlannedDocument) {
        let started = self.bump(|s| {
            s.started += 1;
            s.started
        });
        self.set_busy(Some(StallTracker::new(Instant::now())));

        let token = CancellationToken::new();
        let worker_token = token.clone();
        let factories = Arc::clone(&self.factories);
        let record = doc.record.clone();
        let context = doc.context.clone();
        let type_id = doc.identity.type_id;
        let mime = doc.identity.mime_type.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                () = worker_token.cancelled() => Err(ExtractError::Cancelled),
                out = factories.produce(type_id, mime.as_deref(), &record, &context) => out,
            }
        });
        let abort = handle.abort_handle();

        match tokio::time::timeout(self.config.timeout, handle).await {
            Ok(Ok(result)) => {
                self.bump(|s| s.returned += 1);
                self.handle_result(doc, result).await;
            }
            Ok(Err(join)) => {
                // Worker panicked; treat like a failed extraction
                self.bump(|s| s.returned += 1);
                self.report.println(
                    &format!("extraction worker died for {}: {join}", doc.identity.path.display()),
                    Severity::Warn,
                );
                self.defensive_delete(doc).await;
            }
            Err(_) => {
                token.cancel();
                if self.config.cancellation == CancellationPolicy::Forced {
                    abort.abort();
                }
                self.bump(|s| s.abandoned += 1);
                self.report.println(
                    &format!(
                        "abandoned extraction of {} after {}s",
                        doc.identity.path.display(),
                        self.config.timeout.as_secs()
                    ),
                    Severity::Warn,
                );
                // The worker may still be running; its result is discarded
                // and the writer is left untouched for this document.
            }
        }

        self.set_busy(None);
        self.maybe_commit(started).await;
    }

    /// Apply a full update set: deletes first, then submissions, then a
    /// trailing commit to flush whatever the batch boundaries left over.
    ///
    /// Counters reset on entry; the returned statistics cover exactly
    /// this update set.
    pub async fn run(&self, data: &UpdateData) -> RunStatistics {
        let run_started = Instant::now();
        if let Ok(mut stats) = self.stats.lock() {
            *stats = RunStatistics::default();
        }

        for identity in &data.to_delete {
            self.delete(&identity.path).await;
        }
        for doc in &data.to_update {
            self.submit(doc).await;
        }
        if !data.is_empty() {
            self.commit().await;
        }

        self.bump(|s| s.elapsed = run_started.elapsed());
        self.report_statistics(&data.scope);
        self.stats()
    }

    /// Merge index segments after a large run. Failures are warned, not
    /// fatal; the index stays correct either way.
    pub async fn optimize(&self) {
        if let Err(e) = self.writer.optimize().await {
            self.report
                .println(&format!("optimize failed: {e}"), Severity::Warn);
        }
    }

    /// Emit the run counters as a single progress note.
    pub fn report_statistics(&self, scope: &str) {
        let stats = self.stats();
        self.report.println(
            &format!(
                "scope {scope}: started {}, returned {}, abandoned {}, deleted {}, commits {}, elapsed {:.1}s",
                stats.started,
                stats.returned,
                stats.abandoned,
                stats.deleted,
                stats.commits,
                stats.elapsed.as_secs_f64()
            ),
            Severity::Note,
        );
    }

    async fn handle_result(
        &self,
        doc: &PlannedDocument,
        result: Result<DocumentPayload, ExtractError>,
    ) {
        match result {
            Ok(payload) if !payload.is_empty() => {
                let payload = payload.with("key", doc.identity.doc_key.clone());
                if let Err(e) = self.writer.update_document(&doc.identity.path, &payload).await {
                    self.report.println(
                        &format!("upsert failed for {}: {e}", doc.identity.path.display()),
                        Severity::Warn,
                    );
                } else {
                    debug!("indexed {}", doc.identity.path.display());
                }
            }
            Ok(_) => {
                // No extractable content; drop any stale entry
                self.defensive_delete(doc).await;
            }
            Err(e) => {
                self.report.println(
                    &format!("extraction failed for {}: {e}", doc.identity.path.display()),
                    Severity::Warn,
                );
                self.defensive_delete(doc).await;
            }
        }
    }

    async fn defensive_delete(&self, doc: &PlannedDocument) {
        self.delete(&doc.identity.path).await;
    }

    async fn delete(&self, path: &std::path::Path) {
        if let Err(e) = self.writer.delete_documents(path).await {
            self.report.println(
                &format!("delete failed for {}: {e}", path.display()),
                Severity::Warn,
            );
        } else {
            self.bump(|s| s.deleted += 1);
        }
    }

    async fn maybe_commit(&self, started: u64) {
        let threshold = self.config.commit_threshold;
        if threshold > 0 && started % threshold == 0 {
            self.commit().await;
        }
    }

    async fn commit(&self) {
        if let Err(e) = self.writer.commit().await {
            // A failed commit loses no data; the next one covers it
            self.report
                .println(&format!("commit failed: {e}"), Severity::Warn);
        } else {
            self.bump(|s| s.commits += 1);
        }
    }

    fn bump<R>(&self, f: impl FnOnce(&mut RunStatistics) -> R) -> R
    where
        R: Default,
    {
        self.stats.lock().map(|mut s| f(&mut s)).unwrap_or_default()
    }

    fn set_busy(&self, value: Option<StallTracker>) {
        if let Ok(mut busy) = self.busy.lock() {
            *busy = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CapturingReport;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use uuid::Uuid;
    use vfsearch_core::{
        DependencyChain, DocumentFactory, ResourceIdentity, ResourceRecord, VfsResource,
    };
    use vfsearch_store::{MemoryIndexWriter, WriteOp};

    /// Factory yielding a fixed payload, hanging forever on selected paths.
    struct ScriptedFactory {
        hang_on: Vec<PathBuf>,
        empty_on: Vec<PathBuf>,
        fail_on: Vec<PathBuf>,
    }

    impl ScriptedFactory {
        fn ok() -> Self {
            Self {
                hang_on: Vec::new(),
                empty_on: Vec::new(),
                fail_on: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl DocumentFactory for ScriptedFactory {
        fn can_produce(&self, _type_id: u32, _mime: Option<&str>) -> bool {
            true
        }

        async fn produce(
            &self,
            record: &ResourceRecord,
            _context: &DependencyChain,
        ) -> Result<DocumentPayload, ExtractError> {
            let path = record.path();
            if self.hang_on.contains(&path) {
                tokio::time::sleep(Duration::from_secs(86_400)).await;
            }
            if self.fail_on.contains(&path) {
                return Err(ExtractError::Failed("scripted failure".to_string()));
            }
            if self.empty_on.contains(&path) {
                return Ok(DocumentPayload::new());
            }
            Ok(DocumentPayload::new().with("content", format!("body of {}", path.display())))
        }
    }

    fn planned(path: &str) -> PlannedDocument {
        let record = ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from(path),
            type_id: 1,
            is_folder: false,
            released: None,
            expires: None,
        });
        let identity = ResourceIdentity {
            id: record.id(),
            name: record.name(),
            path: record.path(),
            type_id: 1,
            mime_type: Some("text/plain".to_string()),
            doc_key: "doc:1:text/plain".to_string(),
        };
        PlannedDocument {
            context: DependencyChain::singleton(identity.clone()),
            record,
            identity,
        }
    }

    fn scheduler(
        writer: Arc<MemoryIndexWriter>,
        factory: ScriptedFactory,
        report: Arc<CapturingReport>,
        config: SchedulerConfig,
    ) -> IndexScheduler {
        let mut factories = FactoryRegistry::new();
        factories.register("scripted", factory);
        IndexScheduler::new(writer, Arc::new(factories), report, config)
    }

    #[tokio::test]
    async fn test_successful_extraction_is_upserted_with_key() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory::ok(),
            Arc::new(CapturingReport::new()),
            SchedulerConfig::default(),
        );

        sched.submit(&planned("/site/a.txt")).await;

        let doc = writer.document(Path::new("/site/a.txt")).await.unwrap();
        assert_eq!(doc.get("key"), Some("doc:1:text/plain"));
        assert!(doc.get("content").is_some());

        let stats = sched.stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.abandoned, 0);
    }

    #[tokio::test]
    async fn test_empty_payload_becomes_defensive_delete() {
        let writer = Arc::new(MemoryIndexWriter::new());
        // Stale entry from a previous run
        writer
            .update_document(
                Path::new("/site/empty.txt"),
                &DocumentPayload::new().with("content", "stale"),
            )
            .await
            .unwrap();

        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory {
                empty_on: vec![PathBuf::from("/site/empty.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::new(CapturingReport::new()),
            SchedulerConfig::default(),
        );
        sched.submit(&planned("/site/empty.txt")).await;

        assert!(writer.document(Path::new("/site/empty.txt")).await.is_none());
        assert_eq!(sched.stats().deleted, 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_warned_and_deleted() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let report = Arc::new(CapturingReport::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory {
                fail_on: vec![PathBuf::from("/site/bad.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::clone(&report),
            SchedulerConfig::default(),
        );

        sched.submit(&planned("/site/bad.txt")).await;

        assert!(report.contains("extraction failed"));
        assert_eq!(report.count(Severity::Warn), 1);
        assert!(writer
            .ops()
            .await
            .contains(&WriteOp::Delete {
                path: PathBuf::from("/site/bad.txt")
            }));
        // A failed extraction still counts as returned
        assert_eq!(sched.stats().returned, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_worker_is_abandoned_without_writer_calls() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let report = Arc::new(CapturingReport::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory {
                hang_on: vec![PathBuf::from("/site/hang.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::clone(&report),
            SchedulerConfig {
                timeout: Duration::from_secs(5),
                commit_threshold: 0,
                cancellation: CancellationPolicy::Cooperative,
            },
        );

        sched.submit(&planned("/site/hang.txt")).await;

        let stats = sched.stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.returned, 0);
        assert_eq!(stats.abandoned, 1);
        assert!(report.contains("abandoned extraction"));
        // No upsert, no delete for the abandoned document
        assert!(writer.ops().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_policy_also_abandons() {
        let sched = scheduler(
            Arc::new(MemoryIndexWriter::new()),
            ScriptedFactory {
                hang_on: vec![PathBuf::from("/site/hang.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::new(CapturingReport::new()),
            SchedulerConfig {
                timeout: Duration::from_secs(5),
                commit_threshold: 0,
                cancellation: CancellationPolicy::Forced,
            },
        );

        sched.submit(&planned("/site/hang.txt")).await;
        assert_eq!(sched.stats().abandoned, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_batching_with_one_hung_document() {
        // Seven documents, threshold five, number four hangs. One commit
        // fires after the fifth started extraction; the hung document's
        // prior index entry stays untouched.
        let writer = Arc::new(MemoryIndexWriter::new());
        let stale = DocumentPayload::new().with("content", "previous version");
        writer
            .update_document(Path::new("/site/d4.txt"), &stale)
            .await
            .unwrap();

        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory {
                hang_on: vec![PathBuf::from("/site/d4.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::new(CapturingReport::new()),
            SchedulerConfig {
                timeout: Duration::from_secs(5),
                commit_threshold: 5,
                cancellation: CancellationPolicy::Cooperative,
            },
        );

        for i in 1..=7 {
            sched.submit(&planned(&format!("/site/d{i}.txt"))).await;
        }

        let stats = sched.stats();
        assert_eq!(stats.started, 7);
        assert_eq!(stats.returned, 6);
        assert_eq!(stats.abandoned, 1);
        assert_eq!(stats.commits, 1);
        assert_eq!(writer.commit_count().await, 1);

        // The abandoned document keeps its old content
        assert_eq!(
            writer
                .document(Path::new("/site/d4.txt"))
                .await
                .unwrap()
                .get("content"),
            Some("previous version")
        );
    }

    #[tokio::test]
    async fn test_zero_threshold_never_commits() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory::ok(),
            Arc::new(CapturingReport::new()),
            SchedulerConfig {
                timeout: Duration::from_secs(5),
                commit_threshold: 0,
                cancellation: CancellationPolicy::Cooperative,
            },
        );

        for i in 1..=4 {
            sched.submit(&planned(&format!("/site/d{i}.txt"))).await;
        }
        assert_eq!(writer.commit_count().await, 0);
    }

    #[tokio::test]
    async fn test_commit_failure_is_warned_and_run_continues() {
        let writer = Arc::new(MemoryIndexWriter::new());
        writer.fail_commits(true).await;
        let report = Arc::new(CapturingReport::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory::ok(),
            Arc::clone(&report),
            SchedulerConfig {
                timeout: Duration::from_secs(5),
                commit_threshold: 1,
                cancellation: CancellationPolicy::Cooperative,
            },
        );

        sched.submit(&planned("/site/a.txt")).await;
        sched.submit(&planned("/site/b.txt")).await;

        assert!(report.contains("commit failed"));
        assert_eq!(sched.stats().commits, 0);
        // Documents were still written
        assert_eq!(writer.doc_count().await, 2);
    }

    #[tokio::test]
    async fn test_run_deletes_first_then_updates_then_flushes() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let report = Arc::new(CapturingReport::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory::ok(),
            Arc::clone(&report),
            SchedulerConfig::default(),
        );

        let update = planned("/site/keep.txt");
        let delete = planned("/site/drop.txt");
        let data = UpdateData {
            scope: "site".to_string(),
            to_update: vec![update],
            to_delete: vec![delete.identity],
        };

        let stats = sched.run(&data).await;
        assert_eq!(stats.started, 1);
        assert_eq!(stats.deleted, 1);

        let ops = writer.ops().await;
        assert!(matches!(ops[0], WriteOp::Delete { .. }));
        assert!(matches!(ops[1], WriteOp::Update { .. }));
        assert!(matches!(ops.last(), Some(WriteOp::Commit)));

        // One summary note at the end of the run, elapsed time included
        assert_eq!(report.count(Severity::Note), 1);
        assert!(report.contains("scope site"));
        assert!(report.contains("elapsed"));
    }

    #[tokio::test]
    async fn test_counters_reset_between_runs() {
        let writer = Arc::new(MemoryIndexWriter::new());
        let sched = scheduler(
            Arc::clone(&writer),
            ScriptedFactory::ok(),
            Arc::new(CapturingReport::new()),
            SchedulerConfig::default(),
        );

        let first = UpdateData {
            scope: "site".to_string(),
            to_update: vec![planned("/site/a.txt"), planned("/site/b.txt")],
            to_delete: Vec::new(),
        };
        let second = UpdateData {
            scope: "site".to_string(),
            to_update: vec![planned("/site/c.txt")],
            to_delete: Vec::new(),
        };

        let stats = sched.run(&first).await;
        assert_eq!(stats.started, 2);
        assert_eq!(stats.commits, 1);

        // The second run's summary does not carry the first run's counts
        let stats = sched.run(&second).await;
        assert_eq!(stats.started, 1);
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.commits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_escalates_while_extraction_drags() {
        let report = Arc::new(CapturingReport::new());
        let sched = Arc::new(scheduler(
            Arc::new(MemoryIndexWriter::new()),
            ScriptedFactory {
                hang_on: vec![PathBuf::from("/site/hang.txt")],
                ..ScriptedFactory::ok()
            },
            Arc::clone(&report),
            SchedulerConfig {
                timeout: Duration::from_secs(3_600),
                commit_threshold: 0,
                cancellation: CancellationPolicy::Cooperative,
            },
        ));

        let worker = Arc::clone(&sched);
        let submission = tokio::spawn(async move {
            worker.submit(&planned("/site/hang.txt")).await;
        });
        tokio::task::yield_now().await;

        // In flight but not yet suspicious
        assert!(sched.is_running());
        assert_eq!(report.count(Severity::Warn), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(sched.is_running());
        assert_eq!(report.count(Severity::Warn), 1);
        assert_eq!(report.count(Severity::Error), 0);

        // Polling again right away stays quiet
        assert!(sched.is_running());
        assert_eq!(report.count(Severity::Warn), 1);

        // The warning repeats once its own 30s window has passed
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(sched.is_running());
        assert_eq!(report.count(Severity::Warn), 2);
        assert_eq!(report.count(Severity::Error), 0);

        // The error fires on its own 10-minute clock
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(sched.is_running());
        assert!(report.contains("extraction stalled"));
        assert_eq!(report.count(Severity::Error), 1);

        submission.abort();
    }

    #[tokio::test]
    async fn test_is_running_reflects_in_flight_work() {
        let sched = scheduler(
            Arc::new(MemoryIndexWriter::new()),
            ScriptedFactory::ok(),
            Arc::new(CapturingReport::new()),
            SchedulerConfig::default(),
        );
        assert!(!sched.is_running());
        sched.submit(&planned("/site/a.txt")).await;
        assert!(!sched.is_running());
    }
}
