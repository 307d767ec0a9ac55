//! Ledger records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Quantity, StockItemId, TenantId};

/// A stock item whose movements are tracked by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub tenant_id: TenantId,
    pub id: StockItemId,
    pub name: String,
    /// Balance before the first ledger entry
    pub original_stock: Quantity,
}

/// A movement to append to a stock item's ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub date: NaiveDate,
    pub issued: Quantity,
    pub wastage: Quantity,
}

/// One row of a stock item's ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    pub tenant_id: TenantId,
    pub stock_item_id: StockItemId,
    pub date: NaiveDate,
    pub issued: Quantity,
    pub wastage: Quantity,
    /// Running balance after this entry, never below zero
    pub remaining: Quantity,
    /// Arrival order within the stock item; breaks ties on `date`
    pub insertion_seq: i64,
    /// Set when issued + wastage exceeded the preceding balance and
    /// `remaining` was clamped to zero
    pub over_issued: bool,
}

impl StockLedgerEntry {
    /// Authoritative ledger ordering key
    pub fn ordering_key(&self) -> (NaiveDate, i64) {
        (self.date, self.insertion_seq)
    }
}

/// Result of appending one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The persisted new entry
    pub entry: StockLedgerEntry,
    /// Number of existing entries ordered after the new one
    pub later_entries: usize,
    /// Later entries whose `remaining` or `over_issued` changed because the
    /// new entry was backdated before them
    pub recomputed: Vec<StockLedgerEntry>,
}

impl AppendOutcome {
    /// True when at least one existing entry is dated after the new one
    pub fn was_backdated(&self) -> bool {
        self.later_entries > 0
    }
}
