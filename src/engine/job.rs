use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

use rustc_hash::FxHashMap;

use crate::errors::ErrorEntry;
use crate::scoring::{CategoryRollup, ConflictNote, Verdict};
use crate::types::{JobId, JobStatus, NodeId, NodeStatus};

/// Final scored outcome of a job.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct JobReport {
    pub verdict: Verdict,
    /// Overall score in `[0, 100]` across evaluated rubric items.
    pub normalized: f64,
    /// Fraction of rubric items that received at least one score.
    pub coverage: f64,
    pub rollups: Vec<CategoryRollup>,
    pub conflicts: Vec<ConflictNote>,
    /// Every error recorded while the job ran, across all scopes.
    pub errors: Vec<ErrorEntry>,
    /// Wall-clock runtime from dispatch to terminal status.
    pub elapsed_ms: u64,
}

/// Everything persisted about one job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    pub submitted_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub errors: Vec<ErrorEntry>,
    /// Terminal status of every node in the plan.
    pub node_statuses: FxHashMap<NodeId, NodeStatus>,
    /// Present once the job reaches a terminal status other than `Cancelled`.
    pub report: Option<JobReport>,
}

impl JobRecord {
    pub fn pending(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            submitted_at: Utc::now(),
            finished_at: None,
            errors: Vec::new(),
            node_statuses: FxHashMap::default(),
            report: None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum JobStoreError {
    #[error("job store backend error: {message}")]
    #[diagnostic(code(rubriq::job_store::backend))]
    Backend { message: String },
}

/// Persistence seam for job records.
///
/// The engine writes through this on every status transition, so a store
/// implementation always sees the latest record.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn persist(&self, record: &JobRecord) -> Result<(), JobStoreError>;
    async fn load(&self, id: JobId) -> Result<Option<JobRecord>, JobStoreError>;
}

/// Default store: a process-local map, useful for tests and embedding.
#[derive(Default)]
pub struct InMemoryJobStore {
    records: Mutex<FxHashMap<JobId, JobRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn persist(&self, record: &JobRecord) -> Result<(), JobStoreError> {
        self.records
            .lock()
            .expect("job record map poisoned")
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, id: JobId) -> Result<Option<JobRecord>, JobStoreError> {
        Ok(self
            .records
            .lock()
            .expect("job record map poisoned")
            .get(&id)
            .cloned())
    }
}
