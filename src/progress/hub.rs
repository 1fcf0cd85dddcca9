use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;
use tracing::debug;

use super::event::JobEvent;
use crate::types::{JobId, JobStatus, NodeId};

/// Default per-subscriber queue depth.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Fan-out point for job events.
///
/// Each subscriber gets its own bounded queue. Publishing never blocks the
/// engine: a full or disconnected queue simply drops that subscriber's copy
/// of the event. Subscribers that need every event must keep up.
pub struct EventHub {
    capacity: usize,
    subscribers: Mutex<FxHashMap<JobId, Vec<flume::Sender<JobEvent>>>>,
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            subscribers: Mutex::new(FxHashMap::default()),
        }
    }

    /// Open a new event stream for a job. Streams opened after the job
    /// closed receive nothing.
    pub fn subscribe(&self, job: JobId) -> flume::Receiver<JobEvent> {
        let (tx, rx) = flume::bounded(self.capacity);
        self.subscribers
            .lock()
            .expect("subscriber map poisoned")
            .entry(job)
            .or_default()
            .push(tx);
        rx
    }

    /// Best-effort broadcast to every live subscriber of the job.
    pub fn publish(&self, job: JobId, event: JobEvent) {
        let mut subscribers = self.subscribers.lock().expect("subscriber map poisoned");
        let Some(senders) = subscribers.get_mut(&job) else {
            return;
        };
        senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(_)) => {
                debug!(%job, "subscriber queue full, dropping event");
                true
            }
            Err(flume::TrySendError::Disconnected(_)) => false,
        });
    }

    /// Publish the terminal event and drop every subscriber for the job.
    pub fn close(&self, job: JobId, status: JobStatus) {
        self.publish(job, JobEvent::closed(status));
        self.subscribers
            .lock()
            .expect("subscriber map poisoned")
            .remove(&job);
    }

    pub fn subscriber_count(&self, job: JobId) -> usize {
        self.subscribers
            .lock()
            .expect("subscriber map poisoned")
            .get(&job)
            .map_or(0, Vec::len)
    }
}

/// Cloneable handle producers use to emit into one job's stream.
#[derive(Clone)]
pub struct JobPublisher {
    hub: Arc<EventHub>,
    job: JobId,
}

impl JobPublisher {
    pub fn new(hub: Arc<EventHub>, job: JobId) -> Self {
        Self { hub, job }
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn publish(&self, event: JobEvent) {
        self.hub.publish(self.job, event);
    }

    /// Convenience for task-authored notes.
    pub fn note(
        &self,
        node: impl Into<NodeId>,
        layer: usize,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.publish(JobEvent::note(node.into(), layer, scope, message));
    }
}

impl std::fmt::Debug for JobPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPublisher").field("job", &self.job).finish()
    }
}
