//! Deferred work
//!
//! Some work must happen a while after the request that triggered it, e.g. re-querying the payment gateway a few
//! minutes after a payment notification. Request handlers hand such jobs to a [`ReconciliationScheduler`] and return
//! immediately. The tokio-backed [`DeferredTaskQueue`] holds each job for a fixed delay and then runs its handler.
mod queue;

pub use queue::{DeferredTaskProducer, DeferredTaskQueue, JobHandler};

/// Re-check a gateway transaction and reconcile the order it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationJob {
    pub gateway_order_id: String,
}

impl ReconciliationJob {
    pub fn new<S: Into<String>>(gateway_order_id: S) -> Self {
        Self { gateway_order_id: gateway_order_id.into() }
    }
}

/// Fire-and-forget submission of reconciliation jobs. Implementations must not block the caller.
pub trait ReconciliationScheduler: Send + Sync {
    fn schedule(&self, job: ReconciliationJob);
}

impl ReconciliationScheduler for DeferredTaskProducer<ReconciliationJob> {
    fn schedule(&self, job: ReconciliationJob) {
        self.submit(job);
    }
}
