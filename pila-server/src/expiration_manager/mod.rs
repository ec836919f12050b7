pub mod clock;
pub mod lease;

use std::sync::Arc;
use std::time::Duration;

use pila_storage::{OrderedStore, Queue, StorageError};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use self::clock::Clock;

/// Default time between expiry scans.
pub const REAP_INTERVAL: Duration = Duration::from_secs(5);

/// The expiration manager moves expired leases back into the retry queue.
///
/// Each pass scans the running store strictly below "now" (rendered with the
/// lease timestamp format), enqueues every hit into the retry queue and then
/// deletes the lease. Enqueue must precede delete: a crash between the two
/// leaves a duplicate behind, never a lost task.
pub struct ExpirationManager {
    /// Payloads whose lease expired, awaiting redelivery
    retry_queue: Arc<Queue>,
    /// In-flight leases, keyed by expiry timestamp and content digest
    running: Arc<OrderedStore>,
    /// Shutdown listener
    shutdown_rx: Arc<RwLock<tokio::sync::mpsc::Receiver<()>>>,
    /// Shutdown transmitter
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
    /// Time between scans
    interval: Duration,
    /// Provides time information. Gives us deterministic time in tests.
    clock: Arc<dyn Clock>,
}

impl ExpirationManager {
    pub fn new(
        retry_queue: Arc<Queue>,
        running: Arc<OrderedStore>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        let (tx, rx) = tokio::sync::mpsc::channel(1);

        ExpirationManager {
            retry_queue,
            running,
            shutdown_rx: Arc::new(RwLock::new(rx)),
            shutdown_tx: tx,
            interval,
            clock,
        }
    }

    /// Run the scan loop until [`ExpirationManager::stop`] is called. Scans
    /// run on the blocking thread pool; transient storage failures are
    /// logged and retried on the next tick.
    #[tracing::instrument(skip(self), name = "start_expiration_manager")]
    pub async fn start(&self) {
        let mut shutdown_rx = self.shutdown_rx.write().await;

        loop {
            let upper_bound = lease::timestamp(self.clock.now());
            let retry_queue = Arc::clone(&self.retry_queue);
            let running = Arc::clone(&self.running);
            let scan =
                tokio::task::spawn_blocking(move || reap(&retry_queue, &running, &upper_bound));
            match scan.await {
                Ok(Ok(0)) => {}
                Ok(Ok(moved)) => debug!(moved, "re-enqueued expired leases"),
                Ok(Err(error)) => error!(?error, "failed to re-enqueue expired leases"),
                Err(error) => error!(?error, "expiry scan task failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown_rx.recv() => break,
            }
        }

        info!("Expiration manager shutting down");
    }

    /// One synchronous scan pass; returns the number of redelivered leases.
    pub(crate) fn reap_now(&self) -> Result<u64, StorageError> {
        let upper_bound = lease::timestamp(self.clock.now());
        reap(&self.retry_queue, &self.running, &upper_bound)
    }

    /// Signal the scan loop to stop at its next sleep boundary.
    #[tracing::instrument(skip(self), name = "stop_expiration_manager")]
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

fn reap(
    retry_queue: &Queue,
    running: &OrderedStore,
    upper_bound: &str,
) -> Result<u64, StorageError> {
    let mut moved = 0;
    running.scan(upper_bound, |key, value| {
        retry_queue.enqueue(value)?;
        if let Err(error) = running.delete(key) {
            // tolerated: the next tick re-enqueues this lease once more
            tracing::warn!(key, ?error, "failed to drop redelivered lease");
        }
        moved += 1;
        Ok(true)
    })?;
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::clock::test::TestClock;
    use super::lease::LeaseKey;

    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        retry_queue: Arc<Queue>,
        running: Arc<OrderedStore>,
        clock: TestClock,
        manager: Arc<ExpirationManager>,
    }

    fn fixture(interval: Duration) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let retry_queue = Arc::new(Queue::open(dir.path().join("retry_queue")).unwrap());
        let running = Arc::new(OrderedStore::open(dir.path().join("running")).unwrap());
        let clock = TestClock::new();
        let manager = Arc::new(ExpirationManager::new(
            Arc::clone(&retry_queue),
            Arc::clone(&running),
            Arc::new(clock.clone()),
            interval,
        ));
        Fixture {
            _dir: dir,
            retry_queue,
            running,
            clock,
            manager,
        }
    }

    fn lease(f: &Fixture, value: &[u8], ttl_secs: i64) -> LeaseKey {
        let key = LeaseKey::new(f.clock.now() + ChronoDuration::seconds(ttl_secs), value);
        f.running.put(key.as_str(), value).unwrap();
        key
    }

    #[test]
    fn expired_leases_move_to_the_retry_queue() {
        let f = fixture(REAP_INTERVAL);
        lease(&f, b"task", 10);

        // not expired yet
        assert_eq!(f.manager.reap_now().unwrap(), 0);
        assert!(f.retry_queue.is_empty().unwrap());

        f.clock.advance(11);
        assert_eq!(f.manager.reap_now().unwrap(), 1);
        assert_eq!(f.retry_queue.dequeue().unwrap(), b"task");
        assert!(f.running.is_empty().unwrap());
    }

    #[test]
    fn redelivery_follows_expiry_order() {
        let f = fixture(REAP_INTERVAL);
        lease(&f, b"second", 20);
        lease(&f, b"first", 10);

        f.clock.advance(30);
        assert_eq!(f.manager.reap_now().unwrap(), 2);
        assert_eq!(f.retry_queue.dequeue().unwrap(), b"first");
        assert_eq!(f.retry_queue.dequeue().unwrap(), b"second");
    }

    #[test]
    fn unexpired_leases_are_left_running() {
        let f = fixture(REAP_INTERVAL);
        lease(&f, b"soon", 10);
        lease(&f, b"later", 1000);

        f.clock.advance(11);
        assert_eq!(f.manager.reap_now().unwrap(), 1);
        assert_eq!(f.running.len().unwrap(), 1);
        assert_eq!(f.retry_queue.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn scan_loop_redelivers_and_stops() {
        let f = fixture(Duration::from_millis(10));
        lease(&f, b"task", 5);
        f.clock.advance(6);

        let manager = Arc::clone(&f.manager);
        let worker = tokio::spawn(async move { manager.start().await });

        // a few ticks are plenty for the scan to observe the expiry
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(f.retry_queue.len().unwrap(), 1);
        assert!(f.running.is_empty().unwrap());

        f.manager.stop().await;
        worker.await.unwrap();
    }
}
