//! Dispatch writer
//!
//! The sink that forwards records to a collector. Bytes written to it are
//! framed into records and every complete record is delivered by its own
//! detached task. Delivery outcomes never reach the writer: failures are
//! logged and dropped.
//!
//! [`DispatchWriter::close`] is the single synchronization point. It flushes
//! the trailing partial record and waits until every launched delivery has
//! finished.

use std::io;
use std::pin::pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::error::{Result, ShellError};
use crate::repository::Delivery;
use crate::service::framer::RecordFramer;
use crate::sinks::RecordSink;

/// Frames written bytes and delivers each record asynchronously
pub struct DispatchWriter {
    framer: Mutex<RecordFramer>,
    delivery: Arc<dyn Delivery>,
    in_flight: Arc<InFlight>,
    runtime: Handle,
}

impl DispatchWriter {
    /// Creates a writer that spawns deliveries on the current Tokio runtime
    ///
    /// Fails with [`ShellError::NoRuntime`] when called outside a runtime.
    pub fn new(delivery: Arc<dyn Delivery>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| ShellError::NoRuntime)?;
        Ok(Self::with_runtime(delivery, runtime))
    }

    /// Creates a writer that spawns deliveries on the given runtime
    pub fn with_runtime(delivery: Arc<dyn Delivery>, runtime: Handle) -> Self {
        Self {
            framer: Mutex::new(RecordFramer::new()),
            delivery,
            in_flight: Arc::new(InFlight::default()),
            runtime,
        }
    }

    /// Accepts bytes and launches one delivery per complete record
    ///
    /// Always reports the full length as written. Deliveries are launched
    /// while the framer lock is held, so a later [`close`](Self::close)
    /// observes every record framed before it.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let mut framer = self.framer.lock().unwrap_or_else(PoisonError::into_inner);
        for record in framer.feed(bytes) {
            self.launch(record);
        }
        bytes.len()
    }

    /// Flushes the trailing partial record and waits for all deliveries
    pub async fn close(&self) {
        {
            let mut framer = self.framer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(remaining) = framer.flush() {
                debug!(bytes = remaining.len(), "flushing partial record");
                self.launch(remaining);
            }
        }

        self.in_flight.wait_idle().await;
    }

    /// Number of deliveries launched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    fn launch(&self, record: Vec<u8>) {
        if record.is_empty() {
            return;
        }

        let guard = self.in_flight.start();
        let delivery = Arc::clone(&self.delivery);

        self.runtime.spawn(async move {
            let _guard = guard;
            if let Err(e) = delivery.deliver(record).await {
                warn!(error = %e, "log record delivery failed");
            }
        });
    }
}

impl RecordSink for DispatchWriter {
    fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        Ok(DispatchWriter::write(self, bytes))
    }
}

/// Count of outstanding deliveries with a wake-up when it drops to zero
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn start(self: &Arc<Self>) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            tracker: Arc::clone(self),
        }
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    async fn wait_idle(&self) {
        loop {
            // Register before checking the count so a release between the
            // check and the await is not missed.
            let mut notified = pin!(self.idle.notified());
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// Decrements the in-flight count when the delivery task ends, whatever
/// the outcome (including the task being dropped by a shutting down runtime)
struct InFlightGuard {
    tracker: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.tracker.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}
