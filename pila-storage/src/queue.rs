use std::path::Path;

use parking_lot::Mutex;
use rocksdb::DB;

use crate::{open_db, range_len, seq_bounds, write_opts, StorageError};

/// Durable FIFO queue of byte payloads.
///
/// Same key layout as [`crate::Stack`], consumed from the opposite end: the
/// head of the queue is the smallest sequence key.
pub struct Queue {
    db: DB,
    lock: Mutex<()>,
}

impl Queue {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            db: open_db(path.as_ref())?,
            lock: Mutex::new(()),
        })
    }

    pub fn enqueue(&self, value: &[u8]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let next = match seq_bounds(&self.db)? {
            Some((_, tail)) => tail + 1,
            None => 0,
        };
        self.db
            .put_opt(next.to_be_bytes(), value, &write_opts())
            .map_err(Into::into)
    }

    /// Remove and return the oldest enqueued payload.
    pub fn dequeue(&self) -> Result<Vec<u8>, StorageError> {
        let _guard = self.lock.lock();
        let mut iter = self.db.raw_iterator();
        iter.seek_to_first();
        let Some(key) = iter.key() else {
            iter.status()?;
            return Err(StorageError::Empty);
        };
        let key = key.to_vec();
        let value = iter
            .value()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| StorageError::Corrupt("key without value".into()))?;
        drop(iter);
        self.db.delete_opt(&key, &write_opts())?;
        Ok(value)
    }

    /// Advisory item count; may race with concurrent mutators.
    pub fn len(&self) -> Result<u64, StorageError> {
        range_len(&self.db)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
