//! Common row types and errors shared across the `field-crypt` workspace crates.

pub mod error;
pub mod records;

pub use error::StoreError;
pub use records::{BookmarkRow, FolderRow, Row, Table};
