use std::sync::{Arc, Mutex};

use futures_util::Stream;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::config::EngineConfig;
use super::job::{InMemoryJobStore, JobRecord, JobStore};
use super::registry::NodeRegistry;
use super::runner::JobRunner;
use crate::cache::ResultCache;
use crate::graph::{join_ids, GraphBuilder, GraphError};
use crate::policy::{CredentialStore, PolicyRegistry, StaticCredentialStore};
use crate::progress::{EventHub, JobEvent};
use crate::reducers::ReducerRegistry;
use crate::types::{JobId, NodeId};

/// Errors surfaced by the engine's public interface.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    /// The graph references node ids with no bound implementation.
    #[error("graph references unbound nodes: {}", join_ids(.missing))]
    #[diagnostic(
        code(rubriq::engine::unbound_nodes),
        help("Bind an implementation for every node id before submitting.")
    )]
    UnboundNodes { missing: Vec<NodeId> },

    #[error("unknown job: {job}")]
    #[diagnostic(code(rubriq::engine::unknown_job))]
    UnknownJob { job: JobId },
}

/// Outcome of a [`Engine::result`] query.
#[derive(Clone, Debug)]
pub enum JobOutcome {
    /// The job is still executing; the record shows its live status.
    InProgress(JobRecord),
    /// The job reached a terminal status.
    Finished(JobRecord),
}

struct JobHandle {
    record: JobRecord,
    cancel: CancellationToken,
}

/// Entry point for submitting and observing jobs.
///
/// The engine owns the shared collaborators (node registry, reducers,
/// invocation policy, cache, event hub, job store) and spawns one task per
/// submitted job. All methods are cheap; execution happens in the
/// background.
///
/// # Examples
///
/// ```rust,no_run
/// use rubriq::engine::{Engine, EngineConfig, NodeRegistry};
/// use rubriq::graph::GraphBuilder;
/// use serde_json::json;
/// # use std::sync::Arc;
/// # use rubriq::node::{NodeError, NodeResult, TaskContext, TaskNode};
/// # use rubriq::state::StateSnapshot;
/// # struct Lint;
/// # #[async_trait::async_trait]
/// # impl TaskNode for Lint {
/// #     async fn run(&self, _: StateSnapshot, _: TaskContext) -> Result<NodeResult, NodeError> {
/// #         Ok(NodeResult::new())
/// #     }
/// # }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = NodeRegistry::new().bind("lint", Arc::new(Lint));
/// let engine = Engine::new(EngineConfig::default(), registry);
///
/// let graph = GraphBuilder::new().define("lint", Vec::<&str>::new());
/// let job = engine.submit(graph, json!({"source": "fn main() {}"}))?;
/// let events = engine.subscribe(job)?;
/// while let Ok(event) = events.recv_async().await {
///     println!("{event}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    config: Arc<EngineConfig>,
    registry: Arc<NodeRegistry>,
    reducers: Arc<ReducerRegistry>,
    policy: Arc<PolicyRegistry>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<ResultCache>,
    hub: Arc<EventHub>,
    store: Arc<dyn JobStore>,
    jobs: Arc<Mutex<FxHashMap<JobId, JobHandle>>>,
}

impl Engine {
    /// Build an engine with default collaborators: an in-memory job store,
    /// an empty static credential store, and a fresh cache.
    pub fn new(config: EngineConfig, registry: NodeRegistry) -> Self {
        Self::builder(config, registry).build()
    }

    pub fn builder(config: EngineConfig, registry: NodeRegistry) -> EngineBuilder {
        EngineBuilder {
            hub: Arc::new(EventHub::new(config.event_capacity)),
            config,
            registry,
            reducers: ReducerRegistry::default(),
            policy: Arc::new(PolicyRegistry::default()),
            credentials: Arc::new(StaticCredentialStore::default()),
            cache: Arc::new(ResultCache::default()),
            store: Arc::new(InMemoryJobStore::new()),
        }
    }

    /// Compile the graph, validate its bindings, and start executing.
    ///
    /// Returns the job id immediately; execution continues in a background
    /// task. Compilation and binding errors are reported synchronously.
    #[instrument(skip(self, graph, input))]
    pub fn submit(
        &self,
        graph: GraphBuilder,
        input: serde_json::Value,
    ) -> Result<JobId, EngineError> {
        let plan = graph.compile()?;

        let mut missing: Vec<NodeId> = plan
            .node_ids()
            .filter(|id| !self.registry.contains(id))
            .cloned()
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(EngineError::UnboundNodes { missing });
        }

        let job_id = JobId::new();
        let cancel = CancellationToken::new();
        info!(job = %job_id, nodes = plan.node_count(), layers = plan.layer_count(), "job submitted");

        self.jobs.lock().expect("job table poisoned").insert(
            job_id,
            JobHandle {
                record: JobRecord::pending(job_id),
                cancel: cancel.clone(),
            },
        );

        let runner = JobRunner {
            job_id,
            plan,
            registry: self.registry.clone(),
            reducers: self.reducers.clone(),
            config: self.config.clone(),
            policy: self.policy.clone(),
            credentials: self.credentials.clone(),
            cache: self.cache.clone(),
            hub: self.hub.clone(),
            store: self.store.clone(),
            cancel,
        };
        let jobs = self.jobs.clone();
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let record = runner.run(input).await;
            let status = record.status;
            if let Some(handle) = jobs
                .lock()
                .expect("job table poisoned")
                .get_mut(&job_id)
            {
                handle.record = record;
            }
            // Close only after the record is visible, so a subscriber that
            // sees the terminal event always finds a terminal result.
            hub.close(job_id, status);
        });

        Ok(job_id)
    }

    /// Current record for a job, distinguishing in-progress from terminal.
    pub fn result(&self, job: JobId) -> Result<JobOutcome, EngineError> {
        let jobs = self.jobs.lock().expect("job table poisoned");
        let handle = jobs.get(&job).ok_or(EngineError::UnknownJob { job })?;
        let record = handle.record.clone();
        if record.status.is_terminal() {
            Ok(JobOutcome::Finished(record))
        } else {
            Ok(JobOutcome::InProgress(record))
        }
    }

    /// Open an event stream for a job. Streams close after the terminal
    /// event; subscribing to an already-finished job yields an immediately
    /// closed stream.
    pub fn subscribe(&self, job: JobId) -> Result<flume::Receiver<JobEvent>, EngineError> {
        let jobs = self.jobs.lock().expect("job table poisoned");
        let handle = jobs.get(&job).ok_or(EngineError::UnknownJob { job })?;
        let rx = self.hub.subscribe(job);
        if handle.record.status.is_terminal() {
            self.hub.close(job, handle.record.status);
        }
        Ok(rx)
    }

    /// [`Engine::subscribe`] as an async [`Stream`], for consumers composing
    /// with stream adapters. The stream ends after the terminal event.
    pub fn subscribe_stream(
        &self,
        job: JobId,
    ) -> Result<impl Stream<Item = JobEvent>, EngineError> {
        let rx = self.subscribe(job)?;
        Ok(futures_util::stream::unfold(rx, |rx| async move {
            rx.recv_async().await.ok().map(|event| (event, rx))
        }))
    }

    /// Request cooperative cancellation. Running nodes observe the token;
    /// undispatched nodes are skipped. Results merged before the request
    /// are preserved. Idempotent, and a no-op on terminal jobs.
    #[instrument(skip(self))]
    pub fn cancel(&self, job: JobId) -> Result<(), EngineError> {
        let jobs = self.jobs.lock().expect("job table poisoned");
        let handle = jobs.get(&job).ok_or(EngineError::UnknownJob { job })?;
        if !handle.record.status.is_terminal() {
            handle.cancel.cancel();
        }
        Ok(())
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Assembles an [`Engine`] with non-default collaborators.
pub struct EngineBuilder {
    config: EngineConfig,
    registry: NodeRegistry,
    reducers: ReducerRegistry,
    policy: Arc<PolicyRegistry>,
    credentials: Arc<dyn CredentialStore>,
    cache: Arc<ResultCache>,
    hub: Arc<EventHub>,
    store: Arc<dyn JobStore>,
}

impl EngineBuilder {
    #[must_use]
    pub fn with_reducers(mut self, reducers: ReducerRegistry) -> Self {
        self.reducers = reducers;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<PolicyRegistry>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.store = store;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: Arc::new(self.config),
            registry: Arc::new(self.registry),
            reducers: Arc::new(self.reducers),
            policy: self.policy,
            credentials: self.credentials,
            cache: self.cache,
            hub: self.hub,
            store: self.store,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
        }
    }
}
