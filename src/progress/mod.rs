//! Live job observability: counters, events, and per-job fan-out.
//!
//! [`ProgressTracker`] keeps lock-free counters that running nodes bump as
//! they start and finish. [`EventHub`] fans [`JobEvent`]s out to any number
//! of subscribers over bounded queues; publishing is always best-effort so
//! a slow consumer can never stall the engine.

mod event;
mod hub;
mod tracker;

pub use event::JobEvent;
pub use hub::{EventHub, JobPublisher, DEFAULT_EVENT_CAPACITY};
pub use tracker::{ProgressSnapshot, ProgressTracker};
