//! Domain module
//!
//! Core domain types shared by the numbering, ledger and pricing modules.

pub mod amount;
pub mod error;
pub mod ids;

pub use amount::{round2, Quantity, MAX_QUANTITY, MONEY_DECIMAL_PLACES, QUANTITY_DECIMAL_PLACES};
pub use error::DomainError;
pub use ids::{CounterKind, StockItemId, TenantId};
