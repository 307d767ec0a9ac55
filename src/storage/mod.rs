//! Storage module
//!
//! Shared storage error handling. The store traits themselves live next to
//! the component that owns them (`numbering`, `ledger`).

mod error;

pub use error::StoreError;
