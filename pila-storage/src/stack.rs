use std::path::Path;

use parking_lot::Mutex;
use rocksdb::DB;

use crate::{open_db, range_len, seq_bounds, write_opts, StorageError};

/// Durable LIFO stack of byte payloads.
///
/// Payloads live under 8-byte big-endian sequence keys; the top of the stack
/// is the greatest key. Mutations serialize behind a mutex so a concurrent
/// push cannot reuse the sequence number of an in-flight pop.
pub struct Stack {
    db: DB,
    lock: Mutex<()>,
}

impl Stack {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self {
            db: open_db(path.as_ref())?,
            lock: Mutex::new(()),
        })
    }

    pub fn push(&self, value: &[u8]) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let next = match seq_bounds(&self.db)? {
            Some((_, top)) => top + 1,
            None => 0,
        };
        self.db
            .put_opt(next.to_be_bytes(), value, &write_opts())
            .map_err(Into::into)
    }

    /// Remove and return the most recently pushed payload.
    pub fn pop(&self) -> Result<Vec<u8>, StorageError> {
        let _guard = self.lock.lock();
        let mut iter = self.db.raw_iterator();
        iter.seek_to_last();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn open(dir: &tempfile::TempDir) -> Stack {
        Stack::open(dir.path().join("stack")).unwrap()
    }

    #[test]
    fn lifo_order() {
        let dir = tempfile::tempdir().unwrap();
        let stack = open(&dir);

        stack.push(b"a").unwrap();
        stack.push(b"b").unwrap();
        stack.push(b"c").unwrap();
        assert_eq!(stack.len().unwrap(), 3);

        assert_eq!(stack.pop().unwrap(), b"c");
        assert_eq!(stack.pop().unwrap(), b"b");
        assert_eq!(stack.pop().unwrap(), b"a");
        assert!(matches!(stack.pop(), Err(StorageError::Empty)));
        assert!(stack.is_empty().unwrap());
    }

    #[test]
    fn interleaved_push_pop() {
        let dir = tempfile::tempdir().unwrap();
        let stack = open(&dir);

        stack.push(b"a").unwrap();
        stack.push(b"b").unwrap();
        assert_eq!(stack.pop().unwrap(), b"b");
        stack.push(b"c").unwrap();
        assert_eq!(stack.pop().unwrap(), b"c");
        assert_eq!(stack.pop().unwrap(), b"a");
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let stack = open(&dir);
            stack.push(b"kept").unwrap();
            stack.push(b"taken").unwrap();
            assert_eq!(stack.pop().unwrap(), b"taken");
        }
        let stack = open(&dir);
        assert_eq!(stack.len().unwrap(), 1);
        assert_eq!(stack.pop().unwrap(), b"kept");
    }
}
