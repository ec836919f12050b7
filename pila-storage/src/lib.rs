#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::pedantic)]
#![deny(clippy::get_unwrap)]
#![allow(clippy::module_name_repetitions)]

//! Persistent collections over an embedded ordered-key store.
//!
//! Each collection owns one RocksDB database under its own directory. Every
//! mutation is written with fsync before the call returns, so the effect of
//! a completed operation survives a process crash.

mod error;
mod queue;
mod stack;
mod store;

use std::path::Path;

pub use error::StorageError;
pub use queue::Queue;
pub use stack::Stack;
pub use store::OrderedStore;

use rocksdb::{Options, WriteOptions, DB};

fn open_db(path: &Path) -> Result<DB, StorageError> {
    let mut opts = Options::default();
    opts.create_if_missing(true);
    DB::open(&opts, path).map_err(Into::into)
}

fn write_opts() -> WriteOptions {
    let mut opts = WriteOptions::default();
    opts.set_sync(true);
    opts
}

/// Decode an 8-byte big-endian sequence key.
fn decode_seq(key: &[u8]) -> Result<u64, StorageError> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| StorageError::Corrupt(format!("sequence key of length {}", key.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Smallest and greatest live sequence numbers, or `None` when empty.
///
/// Pushes extend one end of the key range and pops consume an end, so live
/// keys always form a contiguous range and the collection state is fully
/// recoverable from the bounds alone.
fn seq_bounds(db: &DB) -> Result<Option<(u64, u64)>, StorageError> {
    let mut iter = db.raw_iterator();
    iter.seek_to_first();
    let first = match iter.key() {
        Some(key) => decode_seq(key)?,
        None => {
            iter.status()?;
            return Ok(None);
        }
    };
    iter.seek_to_last();
    let last = match iter.key() {
        Some(key) => decode_seq(key)?,
        None => first,
    };
    Ok(Some((first, last)))
}

fn range_len(db: &DB) -> Result<u64, StorageError> {
    Ok(seq_bounds(db)?.map_or(0, |(first, last)| last - first + 1))
}
