//! Ledger module
//!
//! Running-balance stock ledger per (tenant, stock item).

pub mod chain;
pub mod engine;
pub mod entry;
pub mod postgres;
pub mod store;

pub use chain::ChainDrift;
pub use engine::LedgerEngine;
pub use entry::{AppendOutcome, NewLedgerEntry, StockItem, StockLedgerEntry};
pub use postgres::PgLedgerStore;
pub use store::{LedgerStore, MemoryLedgerStore};
