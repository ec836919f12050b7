use std::path::Path;

use rocksdb::DB;

use crate::{open_db, write_opts, StorageError};

/// Durable ordered map from UTF-8 string keys to byte payloads.
///
/// Individual operations are atomic through the underlying store; no outer
/// lock is held, and [`OrderedStore::scan`] iterates a consistent snapshot
/// taken when the iterator is created.
pub struct OrderedStore {
    db: DB,
}

impl OrderedStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            db: open_db(path.as_ref())?,
        })
    }

    /// Insert or overwrite. Empty payloads are rejected.
    pub fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        if value.is_empty() {
            return Err(StorageError::EmptyValue);
        }
        self.db
            .put_opt(key, value, &write_opts())
            .map_err(Into::into)
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.db.get(key).map_err(Into::into)
    }

    /// Idempotent: deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.db.delete_opt(key, &write_opts()).map_err(Into::into)
    }

    /// Visit entries with keys strictly less than `upper_bound`, in
    /// ascending key order. Iteration stops when the visitor returns
    /// `Ok(false)` or any error, which is propagated to the caller.
    pub fn scan<F>(&self, upper_bound: &str, mut visit: F) -> Result<(), StorageError>
    where
        F: FnMut(&str, &[u8]) -> Result<bool, StorageError>,
    {
        let mut iter = self.db.raw_iterator();
        iter.seek_to_first();
        while iter.valid() {
            let Some(raw_key) = iter.key() else { break };
            if raw_key >= upper_bound.as_bytes() {
                break;
            }
            let key = std::str::from_utf8(raw_key)
                .map_err(|_| StorageError::Corrupt("non-utf8 key".into()))?;
            let value = iter
                .value()
                .ok_or_else(|| StorageError::Corrupt("key without value".into()))?;
            if !visit(key, value)? {
                return Ok(());
            }
            iter.next();
        }
        iter.status().map_err(Into::into)
    }

    /// Advisory entry count; linear in the number of entries.
    pub fn len(&self) -> Result<u64, StorageError> {
        let mut count = 0;
        let mut iter = self.db.raw_iterator();
        iter.seek_to_first();
        while iter.valid() {
            count += 1;
            iter.next();
        }
        iter.status()?;
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
