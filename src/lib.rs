//! numbering_ledger Library
//!
//! Tenant-scoped document numbering, stock ledger and pricing core.
//! Re-exports modules for integration testing and external use.

pub mod config;
pub mod db;
pub mod domain;
pub mod jobs;
pub mod ledger;
pub mod numbering;
pub mod pricing;
pub mod storage;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{CounterKind, DomainError, Quantity, StockItemId, TenantId};
pub use ledger::{LedgerEngine, StockLedgerEntry};
pub use numbering::{format_number, NumberingService, SequenceAllocator};
pub use pricing::{LineItem, PricingEngine, PricingResult, VatMode};
