use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pila_storage::{OrderedStore, Queue, Stack, StorageError};
use pila_types::response::StackStatus;

use crate::error::{Error, ErrorType};
use crate::expiration_manager::clock::Clock;
use crate::expiration_manager::lease::LeaseKey;
use crate::expiration_manager::ExpirationManager;

/// The engine: three persistent collections and the expiration manager that
/// feeds expired leases back into the retry queue.
///
/// A payload accepted by [`Core::push`] and never confirmed is always present
/// in at least one of the stack, the retry queue or the running store, so a
/// crash at any point loses nothing. Duplicates across the collections are
/// possible and show up as duplicate deliveries, which at-least-once allows.
pub struct Core {
    /// Tasks awaiting first delivery (LIFO)
    stack: Arc<Stack>,
    /// Tasks whose lease expired, awaiting redelivery (FIFO)
    retry_queue: Arc<Queue>,
    /// In-flight leases
    running: Arc<OrderedStore>,
    expiration: Arc<ExpirationManager>,
    clock: Arc<dyn Clock>,
    path: PathBuf,
}

/// A delivered task. `key` is absent for pops made without a lease.
#[derive(Debug)]
pub struct PoppedTask {
    pub key: Option<LeaseKey>,
    pub value: Vec<u8>,
}

impl Core {
    /// Open (or create) the three collections under `path` and wire up the
    /// expiration manager. The manager's scan loop is started separately via
    /// [`Core::expiration`].
    pub fn open(
        path: impl AsRef<Path>,
        clock: impl Clock,
        reap_interval: Duration,
    ) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let stack = Arc::new(Stack::open(path.join("stack"))?);
        let retry_queue = Arc::new(Queue::open(path.join("retry_queue"))?);
        let running = Arc::new(OrderedStore::open(path.join("running"))?);
        let clock: Arc<dyn Clock> = Arc::new(clock);
        let expiration = Arc::new(ExpirationManager::new(
            Arc::clone(&retry_queue),
            Arc::clone(&running),
            Arc::clone(&clock),
            reap_interval,
        ));

        Ok(Self {
            stack,
            retry_queue,
            running,
            expiration,
            clock,
            path,
        })
    }

    #[must_use]
    pub fn expiration(&self) -> Arc<ExpirationManager> {
        Arc::clone(&self.expiration)
    }

    /// Accept a task payload. Empty payloads are rejected so that every
    /// stored payload is leasable later (the running store refuses empty
    /// values).
    pub fn push(&self, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Err(ErrorType::EmptyData.into());
        }
        self.stack.push(data).map_err(Into::into)
    }

    /// Deliver one task. The retry queue is drained before fresh work so a
    /// busy producer cannot starve previously-failed tasks.
    ///
    /// With `timeout_secs > 0` the task is leased until `now + timeout_secs`
    /// and must be confirmed under the returned key, or it is redelivered.
    /// With `timeout_secs <= 0` the task is handed out without a lease: the
    /// key is absent, the task cannot be confirmed and will not be retried.
    pub fn pop(&self, timeout_secs: i64) -> Result<PoppedTask, Error> {
        match self.retry_queue.dequeue() {
            Ok(value) => return self.lease(value, timeout_secs),
            // drained between observation and dequeue: fall through
            Err(StorageError::Empty) => {}
            Err(error) => return Err(error.into()),
        }
        match self.stack.pop() {
            Ok(value) => self.lease(value, timeout_secs),
            Err(StorageError::Empty) => Err(ErrorType::EmptyStack.into()),
            Err(error) => Err(error.into()),
        }
    }

    fn lease(&self, value: Vec<u8>, timeout_secs: i64) -> Result<PoppedTask, Error> {
        if timeout_secs <= 0 {
            return Ok(PoppedTask { key: None, value });
        }
        let expires_at = self.clock.now() + chrono::Duration::seconds(timeout_secs);
        let key = LeaseKey::new(expires_at, &value);
        self.running.put(key.as_str(), &value)?;
        Ok(PoppedTask {
            key: Some(key),
            value,
        })
    }

    /// Mark a leased task as done. Idempotent: confirming an unknown or
    /// already-confirmed key succeeds.
    pub fn confirm(&self, key: &str) -> Result<(), Error> {
        if key.is_empty() {
            return Err(ErrorType::EmptyKey.into());
        }
        self.running.delete(key).map_err(Into::into)
    }

    /// Advisory collection sizes.
    pub fn status(&self) -> Result<StackStatus, Error> {
        Ok(StackStatus {
            stack_length: self.stack.len()?,
            retry_queue_length: self.retry_queue.len()?,
            running_length: self.running.len()?,
        })
    }

    /// Signal the expiration manager to stop. The collections close when the
    /// last reference to them drops.
    pub async fn close(&self) {
        self.expiration.stop().await;
    }

    /// Close and remove the persistence root. Test teardown only.
    pub async fn destroy(self) -> std::io::Result<()> {
        self.close().await;
        let path = self.path.clone();
        drop(self);
        std::fs::remove_dir_all(path)
    }
}
