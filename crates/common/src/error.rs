//! Common error types shared across crates.

use thiserror::Error;

use crate::records::Table;

/// Error raised by a row store while reading or writing persisted rows.
///
/// The migration utility treats every variant as a per-row failure: the row is
/// logged and counted, and the scan continues with the next one.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row to update no longer exists in the store.
    #[error("row not found: {table}/{id}")]
    NotFound {
        /// Table the row was expected in.
        table: Table,
        /// Primary key of the missing row.
        id: String,
    },

    /// The backing storage could not be read or written.
    #[error("storage i/o failed: {0}")]
    Io(String),

    /// Persisted data could not be parsed into rows.
    #[error("malformed row data: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Returns `true` if the error refers to a row that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
