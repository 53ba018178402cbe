//! # Delivery Queue
//!
//! Deferred delivery for observers that must not run on the posting thread.
//! Each queue owns one tokio task that runs jobs in FIFO order.

use crate::error::BusError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a queue that runs observer callbacks on a background task.
///
/// Clones share the same worker. The worker stops once every clone is dropped
/// and the remaining jobs have run.
#[derive(Clone)]
pub struct DeliveryQueue {
    label: Arc<str>,
    sender: mpsc::UnboundedSender<Job>,
}

impl DeliveryQueue {
    /// Spawn a queue on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// `BusError::NoRuntime` if called outside a runtime.
    pub fn new(label: impl Into<String>) -> Result<Self, BusError> {
        let label = label.into();
        let handle = Handle::try_current().map_err(|_| BusError::NoRuntime {
            queue: label.clone(),
        })?;
        Ok(Self::with_handle(label, &handle))
    }

    /// Spawn a queue on an explicit runtime handle.
    #[must_use]
    pub fn with_handle(label: impl Into<String>, handle: &Handle) -> Self {
        let label: Arc<str> = Arc::from(label.into());
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();

        let worker_label = Arc::clone(&label);
        handle.spawn(async move {
            debug!(queue = %worker_label, "Delivery queue started");
            while let Some(job) = receiver.recv().await {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!(queue = %worker_label, "Observer panicked during queued delivery");
                }
            }
            debug!(queue = %worker_label, "Delivery queue stopped");
        });

        Self { label, sender }
    }

    /// Queue a job for execution.
    ///
    /// # Errors
    ///
    /// `BusError::QueueClosed` if the worker is gone.
    pub fn enqueue(&self, job: impl FnOnce() + Send + 'static) -> Result<(), BusError> {
        self.sender
            .send(Box::new(job))
            .map_err(|_| BusError::QueueClosed {
                queue: self.label.to_string(),
            })
    }

    /// The label given at creation.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the worker has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("label", &self.label)
            .field("closed", &self.is_closed())
            .finish()
    }
}
