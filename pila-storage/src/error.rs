use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// The collection holds no items.
    #[error("store is empty")]
    Empty,
    /// Empty values are not storable; an empty read-back would be
    /// indistinguishable from a missing entry.
    #[error("empty value")]
    EmptyValue,
    #[error("corrupt entry: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Db(#[from] rocksdb::Error),
}
