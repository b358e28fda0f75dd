use crate::config::IngestConfig;
use crate::dataset::{reconcile, ReconciledDataset, TableKind};
use crate::error::{MaveError, MaveResult};
use crate::io::csv::{ingest, TableSpec};
use crate::job::{Executor, IngestionJob, JobId, JobState, JobStatus};
use crate::report::{Issue, IssueCode};
use crate::seq::TargetSequence;
use crate::validate::validate;
use std::any::Any;
use std::collections::HashMap;
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use uuid::Uuid;

type Stream = Box<dyn Read + Send + 'static>;

/// Inputs of one ingestion job.
pub struct Submission {
    target: TargetSequence,
    scores: Stream,
    counts: Option<Stream>,
    metadata: Option<serde_json::Value>,
}

impl Submission {
    pub fn new(target: TargetSequence, scores: impl Read + Send + 'static) -> Self {
        Self {
            target,
            scores: Box::new(scores),
            counts: None,
            metadata: None,
        }
    }

    pub fn with_counts(mut self, counts: impl Read + Send + 'static) -> Self {
        self.counts = Some(Box::new(counts));
        self
    }

    /// Opaque license/metadata record, carried on the job untouched.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[derive(Default)]
struct JobTable {
    jobs: Mutex<HashMap<JobId, IngestionJob>>,
    changed: Condvar,
}

impl JobTable {
    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, IngestionJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, id: JobId, f: impl FnOnce(&mut IngestionJob)) {
        if let Some(job) = self.lock().get_mut(&id) {
            f(job);
        }
        self.changed.notify_all();
    }
}

/// Accepts ingestion jobs, runs them on an injected [`Executor`] and answers
/// status queries. The job table lock is never held while a pipeline runs.
pub struct Coordinator {
    executor: Arc<dyn Executor>,
    config: Arc<IngestConfig>,
    table: Arc<JobTable>,
}

impl Coordinator {
    pub fn new(executor: Arc<dyn Executor>, config: IngestConfig) -> Self {
        Self {
            executor,
            config: Arc::new(config),
            table: Arc::new(JobTable::default()),
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn submit_ingestion(&self, submission: Submission) -> JobId {
        let id = Uuid::new_v4();
        let metadata = submission.metadata.clone();
        self.table.lock().insert(id, IngestionJob::queued(metadata));
        info!(job = %id, "ingestion job queued");

        let table = Arc::clone(&self.table);
        let config = Arc::clone(&self.config);
        self.executor
            .execute(Box::new(move || run_job(id, &table, &config, submission)));
        id
    }

    pub fn get_job_status(&self, id: JobId) -> MaveResult<JobStatus> {
        self.table
            .lock()
            .get(&id)
            .map(|job| job.status(id))
            .ok_or(MaveError::UnknownJob(id))
    }

    /// The dataset of a successful job; `None` while running or after failure.
    pub fn dataset(&self, id: JobId) -> MaveResult<Option<Arc<ReconciledDataset>>> {
        self.table
            .lock()
            .get(&id)
            .map(|job| job.dataset.clone())
            .ok_or(MaveError::UnknownJob(id))
    }

    /// Move the dataset out of a successful job once it has been persisted.
    /// The job's status stays queryable; `dataset` returns `None` afterwards.
    pub fn take_dataset(&self, id: JobId) -> MaveResult<Option<Arc<ReconciledDataset>>> {
        self.table
            .lock()
            .get_mut(&id)
            .map(|job| job.dataset.take())
            .ok_or(MaveError::UnknownJob(id))
    }

    /// Drop a finished job and return its final status. Jobs still queued or
    /// processing are kept and `None` is returned.
    pub fn forget(&self, id: JobId) -> MaveResult<Option<JobStatus>> {
        let mut jobs = self.table.lock();
        let job = jobs.get(&id).ok_or(MaveError::UnknownJob(id))?;
        if !job.state().is_terminal() {
            return Ok(None);
        }
        let status = job.status(id);
        jobs.remove(&id);
        info!(job = %id, "job forgotten");
        Ok(Some(status))
    }

    /// Block until the job is finished or `timeout` elapses, then report it.
    pub fn wait(&self, id: JobId, timeout: Duration) -> MaveResult<JobStatus> {
        let deadline = Instant::now() + timeout;
        let mut jobs = self.table.lock();
        loop {
            let job = jobs.get(&id).ok_or(MaveError::UnknownJob(id))?;
            let now = Instant::now();
            if job.state().is_terminal() || now >= deadline {
                return Ok(job.status(id));
            }
            jobs = self
                .table
                .changed
                .wait_timeout(jobs, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

fn run_job(id: JobId, table: &JobTable, config: &IngestConfig, submission: Submission) {
    table.update(id, |job| {
        job.transition(JobState::Processing);
    });
    info!(job = %id, "ingestion job processing");

    let mut warnings = Vec::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        process(submission, config, &mut warnings)
    }))
    .unwrap_or_else(|panic| {
        Err(Issue::dataset(
            IssueCode::InternalError,
            format!("ingestion panicked: {}", panic_message(&*panic)),
        ))
    });

    if !warnings.is_empty() {
        warn!(job = %id, count = warnings.len(), "rows dropped or flagged");
    }
    table.update(id, |job| {
        job.warnings = warnings;
        match result {
            Ok(dataset) => {
                info!(job = %id, variants = dataset.len(), "ingestion job succeeded");
                job.dataset = Some(Arc::new(dataset));
                job.transition(JobState::Success);
            }
            Err(issue) => {
                error!(job = %id, code = %issue.code, "ingestion job failed: {}", issue.message);
                job.errors.push(issue);
                job.transition(JobState::Failed);
            }
        }
    });
}

/// The pipeline proper: target, scores, counts, reconciliation.
fn process(
    submission: Submission,
    config: &IngestConfig,
    warnings: &mut Vec<Issue>,
) -> Result<ReconciledDataset, Issue> {
    let fatal = |e: MaveError| Issue::from(&e);
    let target = validate(&submission.target).map_err(fatal)?;

    let spec = TableSpec::new(TableKind::Scores, config).with_target(&target);
    let scores = ingest(submission.scores, &spec).map_err(fatal)?;
    warnings.extend(scores.skipped);

    let counts = match submission.counts {
        Some(stream) => {
            let spec = TableSpec::new(TableKind::Counts, config).with_target(&target);
            let counts = ingest(stream, &spec).map_err(fatal)?;
            warnings.extend(counts.skipped);
            Some(counts.data)
        }
        None => None,
    };

    let (dataset, conflicts) = reconcile(scores.data, counts).map_err(fatal)?;
    warnings.extend(conflicts);
    Ok(dataset)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
