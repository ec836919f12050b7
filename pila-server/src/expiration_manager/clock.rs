use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock {}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod test {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    /// Settable clock. Gives us deterministic lease expiry in tests.
    #[derive(Clone)]
    pub struct TestClock {
        epoch_secs: Arc<AtomicI64>,
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                // 2023-11-14T22:13:20Z
                epoch_secs: Arc::new(AtomicI64::new(1_700_000_000)),
            }
        }

        pub fn advance(&self, secs: i64) {
            self.epoch_secs.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            let secs = self.epoch_secs.load(Ordering::SeqCst);
            Utc.timestamp_opt(secs, 0).unwrap()
        }
    }
}
