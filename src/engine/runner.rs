use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::config::EngineConfig;
use super::job::{JobRecord, JobReport, JobStore};
use super::registry::NodeRegistry;
use crate::cache::ResultCache;
use crate::errors::{ErrorEntry, Fault};
use crate::graph::ExecutionPlan;
use crate::node::TaskContext;
use crate::policy::{CredentialStore, PolicyRegistry};
use crate::progress::{EventHub, JobEvent, JobPublisher, ProgressTracker};
use crate::reducers::ReducerRegistry;
use crate::scoring;
use crate::state::GlobalState;
use crate::types::{JobId, JobStatus, NodeId, NodeStatus};

use rustc_hash::FxHashMap;

/// Executes one compiled plan to completion.
///
/// Layers run in order; nodes within a layer run concurrently, bounded by
/// the configured parallelism. Each node's delta is folded into the shared
/// state the moment the node finishes, so later nodes in the same layer
/// observe earlier completions only if they were dispatched afterwards.
pub(super) struct JobRunner {
    pub job_id: JobId,
    pub plan: ExecutionPlan,
    pub registry: Arc<NodeRegistry>,
    pub reducers: Arc<ReducerRegistry>,
    pub config: Arc<EngineConfig>,
    pub policy: Arc<PolicyRegistry>,
    pub credentials: Arc<dyn CredentialStore>,
    pub cache: Arc<ResultCache>,
    pub hub: Arc<EventHub>,
    pub store: Arc<dyn JobStore>,
    pub cancel: CancellationToken,
}

struct NodeFinish {
    node: NodeId,
    layer: usize,
    took: std::time::Duration,
    failed: bool,
}

impl JobRunner {
    #[instrument(skip(self, input), fields(job = %self.job_id))]
    pub async fn run(self, input: serde_json::Value) -> JobRecord {
        let started = Instant::now();
        let mut record = JobRecord::pending(self.job_id);
        record.status = JobStatus::Running;
        self.persist(&record).await;

        let state = Arc::new(Mutex::new(GlobalState::new_with_input(input)));
        let tracker = Arc::new(ProgressTracker::new(self.plan.node_count()));
        let publisher = JobPublisher::new(self.hub.clone(), self.job_id);

        let mut deadline_hit = false;
        let outcome = match self.config.job_deadline {
            Some(deadline) => {
                match tokio::time::timeout(
                    deadline,
                    self.run_layers(&state, &tracker, &publisher),
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(job = %self.job_id, ?deadline, "job deadline exceeded");
                        deadline_hit = true;
                        self.cancel.cancel();
                        state
                            .lock()
                            .expect("job state poisoned")
                            .errors
                            .push(ErrorEntry::job(
                                self.job_id.to_string(),
                                Fault::msg("job deadline exceeded"),
                            ));
                        LayerOutcome::default()
                    }
                }
            }
            None => self.run_layers(&state, &tracker, &publisher).await,
        };

        let was_cancelled = self.cancel.is_cancelled() && !deadline_hit;
        record.status = if was_cancelled {
            JobStatus::Cancelled
        } else if deadline_hit || outcome.finalize_failed {
            JobStatus::Failed
        } else if outcome.any_failed {
            JobStatus::PartiallyFailed
        } else {
            JobStatus::Completed
        };
        record.finished_at = Some(chrono::Utc::now());

        record.node_statuses = outcome.statuses;
        for node_id in self.plan.node_ids() {
            record
                .node_statuses
                .entry(node_id.clone())
                .or_insert(NodeStatus::Pending);
        }

        let final_state = state.lock().expect("job state poisoned").clone();
        record.errors = final_state.errors.clone();

        // Cancelled jobs are scored too, so whatever the completed layers
        // contributed stays observable; thin coverage gates to Incomplete.
        let summary = scoring::aggregate(
            &self.config.rubric,
            &final_state.scores,
            self.config.conflict_range,
        );
        let verdict = self.config.gate.evaluate(&summary);
        info!(
            job = %self.job_id,
            %verdict,
            normalized = summary.normalized,
            coverage = summary.coverage,
            "job scored"
        );
        record.report = Some(JobReport {
            verdict,
            normalized: summary.normalized,
            coverage: summary.coverage,
            rollups: summary.rollups,
            conflicts: summary.conflicts,
            errors: final_state.errors,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });

        self.persist(&record).await;
        record
    }

    async fn run_layers(
        &self,
        state: &Arc<Mutex<GlobalState>>,
        tracker: &Arc<ProgressTracker>,
        publisher: &JobPublisher,
    ) -> LayerOutcome {
        let mut outcome = LayerOutcome::default();
        let limiter = Arc::new(Semaphore::new(self.config.max_parallelism));

        for (layer_idx, layer) in self.plan.layers().iter().enumerate() {
            let mut inflight: JoinSet<NodeFinish> = JoinSet::new();

            for node_id in layer {
                if self.cancel.is_cancelled() {
                    tracker.skipped();
                    outcome.statuses.insert(node_id.clone(), NodeStatus::Skipped);
                    publisher.publish(JobEvent::node_skipped(node_id.clone(), layer_idx));
                    debug!(node = %node_id, layer = layer_idx, "skipping node, job cancelled");
                    continue;
                }

                let Some(node) = self.registry.get(node_id) else {
                    // submit() validates bindings, so this is a logic error.
                    error!(node = %node_id, "node id has no bound implementation");
                    outcome.any_failed = true;
                    tracker.skipped();
                    outcome.statuses.insert(node_id.clone(), NodeStatus::Failed);
                    continue;
                };

                let ctx = TaskContext {
                    node_id: node_id.clone(),
                    job_id: self.job_id,
                    layer: layer_idx,
                    events: publisher.clone(),
                    cancel: self.cancel.clone(),
                    policy: self.policy.clone(),
                    credentials: self.credentials.clone(),
                    cache: self.cache.clone(),
                };
                let permit_source = limiter.clone();
                let shared_state = state.clone();
                let shared_tracker = tracker.clone();
                let events = publisher.clone();
                let reducers = self.reducers.clone();
                let id = node_id.clone();

                inflight.spawn(async move {
                    let _permit = permit_source
                        .acquire_owned()
                        .await
                        .expect("layer limiter closed");

                    // Snapshot after admission so the node sees every merge
                    // committed before it actually starts.
                    let snapshot = shared_state
                        .lock()
                        .expect("job state poisoned")
                        .snapshot();

                    shared_tracker.started();
                    events.publish(JobEvent::node_started(id.clone(), layer_idx));
                    let clock = Instant::now();
                    let result = node.run(snapshot, ctx).await;
                    let took = clock.elapsed();

                    let failure: Option<String> = match result {
                        Ok(delta) => {
                            let mut guard =
                                shared_state.lock().expect("job state poisoned");
                            match reducers.apply_all(&mut guard, &delta) {
                                Ok(()) => None,
                                Err(err) => {
                                    error!(node = %id, error = %err, "state merge failed");
                                    guard.errors.push(
                                        ErrorEntry::node(
                                            id.as_str(),
                                            layer_idx,
                                            Fault::msg(err.to_string()),
                                        )
                                        .with_tag("merge"),
                                    );
                                    Some(err.to_string())
                                }
                            }
                        }
                        Err(err) => {
                            let message = err.to_string();
                            shared_state
                                .lock()
                                .expect("job state poisoned")
                                .errors
                                .push(ErrorEntry::node(
                                    id.as_str(),
                                    layer_idx,
                                    Fault::msg(message.clone()),
                                ));
                            Some(message)
                        }
                    };

                    let failed = failure.is_some();
                    if let Some(message) = failure {
                        shared_tracker.failed(took);
                        events.publish(JobEvent::node_failed(id.clone(), layer_idx, message));
                    } else {
                        shared_tracker.completed(took);
                        events.publish(JobEvent::node_completed(id.clone(), layer_idx));
                    }
                    events.publish(JobEvent::progress(shared_tracker.snapshot()));

                    NodeFinish {
                        node: id,
                        layer: layer_idx,
                        took,
                        failed,
                    }
                });
            }

            while let Some(joined) = inflight.join_next().await {
                match joined {
                    Ok(finish) => {
                        debug!(
                            node = %finish.node,
                            layer = finish.layer,
                            took_ms = finish.took.as_millis() as u64,
                            failed = finish.failed,
                            "node finished"
                        );
                        let status = if finish.failed {
                            outcome.any_failed = true;
                            if self.config.finalize_node.as_ref() == Some(&finish.node) {
                                outcome.finalize_failed = true;
                            }
                            NodeStatus::Failed
                        } else {
                            NodeStatus::Completed
                        };
                        outcome.statuses.insert(finish.node.clone(), status);
                    }
                    Err(join_err) => {
                        error!(job = %self.job_id, error = %join_err, "node task panicked");
                        outcome.any_failed = true;
                        state
                            .lock()
                            .expect("job state poisoned")
                            .errors
                            .push(ErrorEntry::engine(Fault::msg(join_err.to_string())));
                    }
                }
            }
        }

        outcome
    }

    async fn persist(&self, record: &JobRecord) {
        // Persistence faults are logged, not fatal; the in-memory record
        // stays authoritative while the job runs.
        if let Err(err) = self.store.persist(record).await {
            warn!(job = %self.job_id, error = %err, "job store persist failed");
        }
    }
}

#[derive(Default)]
struct LayerOutcome {
    any_failed: bool,
    finalize_failed: bool,
    statuses: FxHashMap<NodeId, NodeStatus>,
}
