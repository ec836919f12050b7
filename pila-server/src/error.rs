use std::fmt::Display;

use pila_storage::StorageError;
use thiserror::Error;
use tracing_error::SpanTrace;

#[derive(Error, Debug)]
pub enum ErrorType {
    #[error("data is empty")]
    EmptyData,
    #[error("empty key")]
    EmptyKey,
    #[error("Stack is empty")]
    EmptyStack,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Internal error")]
    InternalError(anyhow::Error),
}

#[derive(Error, Debug)]
pub struct Error {
    pub variant: ErrorType,
    pub span_trace: SpanTrace,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.variant)
    }
}

impl From<ErrorType> for Error {
    fn from(variant: ErrorType) -> Self {
        Self {
            variant,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Self {
            variant: ErrorType::Storage(err),
            span_trace: SpanTrace::capture(),
        }
    }
}
