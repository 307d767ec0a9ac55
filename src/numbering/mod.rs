//! Numbering module
//!
//! Per-tenant document sequences and their display formatting.

pub mod allocator;
pub mod config;
pub mod formatter;
pub mod postgres;
pub mod service;

pub use allocator::{CounterStore, MemoryCounterStore, SequenceAllocator, DEFAULT_MAX_RETRIES};
pub use config::{default_prefix, MemoryNumberingConfigStore, NumberingConfig, NumberingConfigStore};
pub use formatter::{format_number, MIN_WIDTH};
pub use postgres::{PgCounterStore, PgNumberingConfigStore};
pub use service::{DocumentNumber, NumberingService};
