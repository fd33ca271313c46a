//! Errors raised by the simulated resource store.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("invalid path: '{path}'")]
    InvalidPath { path: String },

    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    #[error("cannot delete non-empty directory: {path}")]
    DirectoryNotEmpty { path: String },

    #[error("no records in {table}")]
    EmptyTable { table: String },

    #[error("record {record_id} not found in {table}")]
    RecordNotFound { table: String, record_id: String },
}
