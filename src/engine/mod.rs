//! Job orchestration: configuration, node bindings, execution, persistence.
//!
//! [`Engine`] is the public entry point. Submitting a graph compiles it into
//! a layered plan, validates that every node id is bound in the
//! [`NodeRegistry`], and spawns a background task that runs the layers in
//! order with bounded intra-layer concurrency. Observers follow along
//! through [`Engine::subscribe`] and collect the aggregated [`JobReport`]
//! from [`Engine::result`] once the job is terminal.

mod config;
mod job;
mod registry;
mod runner;
mod service;

pub use config::EngineConfig;
pub use job::{InMemoryJobStore, JobRecord, JobReport, JobStore, JobStoreError};
pub use registry::NodeRegistry;
pub use service::{Engine, EngineBuilder, EngineError, JobOutcome};
