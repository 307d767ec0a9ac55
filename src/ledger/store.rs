//! Ledger persistence
//!
//! Stores own the per-(tenant, stock item) critical section: every
//! implementation must run load → insert → recompute → persist for one item
//! without another writer interleaving on the same item.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;

use crate::domain::{StockItemId, TenantId};
use crate::storage::StoreError;

use super::chain;
use super::entry::{AppendOutcome, NewLedgerEntry, StockItem, StockLedgerEntry};

#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Register a stock item; returns `false` if it already exists
    async fn register_stock_item(&self, item: &StockItem) -> Result<bool, StoreError>;

    async fn stock_item(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<StockItem>, StoreError>;

    /// Entries in ledger order
    async fn entries(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Vec<StockLedgerEntry>, StoreError>;

    /// Append a movement, recomputing later entries. `None` if the stock
    /// item does not exist.
    async fn append(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        new: NewLedgerEntry,
    ) -> Result<Option<AppendOutcome>, StoreError>;

    /// Recompute the whole chain and persist corrected rows. Returns the
    /// number of rows rewritten, `None` if the stock item does not exist.
    async fn rewrite_remaining(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<usize>, StoreError>;

    /// Every stock item known to the store, across tenants
    async fn stock_item_keys(&self) -> Result<Vec<(TenantId, StockItemId)>, StoreError>;
}

#[derive(Debug)]
struct LedgerState {
    item: StockItem,
    entries: Vec<StockLedgerEntry>,
}

type LedgerKey = (TenantId, StockItemId);

/// In-memory ledger store.
///
/// Each stock item's chain sits behind its own async mutex, so items never
/// contend with each other.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    ledgers: RwLock<HashMap<LedgerKey, Arc<Mutex<LedgerState>>>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self, key: &LedgerKey) -> Result<Option<Arc<Mutex<LedgerState>>>, StoreError> {
        let ledgers = self.ledgers.read().map_err(|_| poisoned())?;
        Ok(ledgers.get(key).cloned())
    }

    /// Overwrite a stored balance without recomputation
    #[cfg(test)]
    pub(crate) async fn corrupt_remaining(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        insertion_seq: i64,
        remaining: crate::domain::Quantity,
    ) -> Result<bool, StoreError> {
        let Some(ledger) = self.ledger(&(tenant_id, stock_item_id))? else {
            return Ok(false);
        };
        let mut state = ledger.lock().await;
        match state
            .entries
            .iter_mut()
            .find(|e| e.insertion_seq == insertion_seq)
        {
            Some(entry) => {
                entry.remaining = remaining;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn poisoned() -> StoreError {
    StoreError::InvalidData("ledger lock poisoned".to_string())
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn register_stock_item(&self, item: &StockItem) -> Result<bool, StoreError> {
        let mut ledgers = self.ledgers.write().map_err(|_| poisoned())?;
        let key = (item.tenant_id, item.id);

        if ledgers.contains_key(&key) {
            return Ok(false);
        }

        ledgers.insert(
            key,
            Arc::new(Mutex::new(LedgerState {
                item: item.clone(),
                entries: Vec::new(),
            })),
        );
        Ok(true)
    }

    async fn stock_item(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<StockItem>, StoreError> {
        match self.ledger(&(tenant_id, stock_item_id))? {
            Some(ledger) => Ok(Some(ledger.lock().await.item.clone())),
            None => Ok(None),
        }
    }

    async fn entries(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Vec<StockLedgerEntry>, StoreError> {
        match self.ledger(&(tenant_id, stock_item_id))? {
            Some(ledger) => Ok(ledger.lock().await.entries.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn append(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        new: NewLedgerEntry,
    ) -> Result<Option<AppendOutcome>, StoreError> {
        let Some(ledger) = self.ledger(&(tenant_id, stock_item_id))? else {
            return Ok(None);
        };

        let mut guard = ledger.lock().await;
        let state = &mut *guard;
        Ok(Some(chain::apply_append(&state.item, &mut state.entries, new)))
    }

    async fn rewrite_remaining(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<usize>, StoreError> {
        let Some(ledger) = self.ledger(&(tenant_id, stock_item_id))? else {
            return Ok(None);
        };

        let mut guard = ledger.lock().await;
        let state = &mut *guard;
        chain::sort_chain(&mut state.entries);
        let changed = chain::recompute_from(state.item.original_stock, &mut state.entries, 0);
        Ok(Some(changed.len()))
    }

    async fn stock_item_keys(&self) -> Result<Vec<(TenantId, StockItemId)>, StoreError> {
        let ledgers = self.ledgers.read().map_err(|_| poisoned())?;
        Ok(ledgers.keys().copied().collect())
    }
}
