//! Asynchronous ingestion jobs.
//!
//! A job moves `queued -> processing -> success | failed` and never back.
//! Failed jobs are not retried; submitting the same files again creates a new
//! job.

pub mod coordinator;
pub mod executor;

pub use coordinator::{Coordinator, Submission};
pub use executor::{Executor, InlineExecutor, Task, ThreadPoolExecutor};

use crate::dataset::ReconciledDataset;
use crate::report::Issue;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub type JobId = Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Processing,
    Success,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Processing => "processing",
            JobState::Success => "success",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Success | JobState::Failed)
    }

    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Queued, JobState::Processing)
                | (JobState::Processing, JobState::Success)
                | (JobState::Processing, JobState::Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a job as reported to callers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub state: JobState,
    /// Every state the job has been in, oldest first.
    pub history: Vec<JobState>,
    /// Fatal problems; non-empty only for failed jobs.
    pub errors: Vec<Issue>,
    /// Dropped rows and reconciliation conflicts.
    pub warnings: Vec<Issue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// The coordinator's record of one job.
#[derive(Debug)]
pub(crate) struct IngestionJob {
    history: Vec<JobState>,
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
    dataset: Option<Arc<ReconciledDataset>>,
    metadata: Option<serde_json::Value>,
}

impl IngestionJob {
    pub(crate) fn queued(metadata: Option<serde_json::Value>) -> Self {
        Self {
            history: vec![JobState::Queued],
            errors: Vec::new(),
            warnings: Vec::new(),
            dataset: None,
            metadata,
        }
    }

    pub(crate) fn state(&self) -> JobState {
        self.history
            .last()
            .copied()
            .unwrap_or(JobState::Queued)
    }

    /// Append `next` to the history if the move is allowed.
    pub(crate) fn transition(&mut self, next: JobState) -> bool {
        if self.state().can_transition_to(next) {
            self.history.push(next);
            true
        } else {
            false
        }
    }

    pub(crate) fn status(&self, id: JobId) -> JobStatus {
        JobStatus {
            id,
            state: self.state(),
            history: self.history.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            metadata: self.metadata.clone(),
        }
    }
}
