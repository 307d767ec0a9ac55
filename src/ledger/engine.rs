//! Ledger engine
//!
//! Validates movements and delegates the ordered append to a [`LedgerStore`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{DomainError, Quantity, StockItemId, TenantId};
use crate::error::{AppError, AppResult};

use super::chain::{self, ChainDrift};
use super::entry::{NewLedgerEntry, StockItem, StockLedgerEntry};
use super::store::LedgerStore;

/// Running-balance stock ledger
#[derive(Debug, Clone)]
pub struct LedgerEngine<S> {
    store: S,
}

impl<S: LedgerStore> LedgerEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a stock item with its opening balance.
    ///
    /// # Errors
    /// - `DomainError::InvalidArgument` if `original_stock` is negative or
    ///   the item is already registered
    pub async fn register_stock_item(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        name: impl Into<String>,
        original_stock: Decimal,
    ) -> AppResult<StockItem> {
        let item = StockItem {
            tenant_id,
            id: stock_item_id,
            name: name.into(),
            original_stock: Quantity::new(original_stock)?,
        };

        if !self.store.register_stock_item(&item).await? {
            return Err(AppError::Domain(DomainError::invalid(format!(
                "stock item {stock_item_id} is already registered"
            ))));
        }

        tracing::info!(
            tenant_id = %tenant_id,
            stock_item_id = %stock_item_id,
            original_stock = %item.original_stock,
            "Stock item registered"
        );

        Ok(item)
    }

    /// Append a stock movement and return the persisted entry.
    ///
    /// A movement dated before existing entries is slotted into its
    /// chronological position and every later balance is recomputed.
    ///
    /// # Errors
    /// - `DomainError::InvalidArgument` if `issued` or `wastage` is negative
    /// - `DomainError::NotFound` if the stock item does not exist
    pub async fn append_entry(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        date: NaiveDate,
        issued: Decimal,
        wastage: Decimal,
    ) -> AppResult<StockLedgerEntry> {
        if issued < Decimal::ZERO {
            return Err(
                DomainError::invalid(format!("issued must not be negative (got {issued})")).into(),
            );
        }
        if wastage < Decimal::ZERO {
            return Err(
                DomainError::invalid(format!("wastage must not be negative (got {wastage})"))
                    .into(),
            );
        }

        let new = NewLedgerEntry {
            date,
            issued: Quantity::new(issued)?,
            wastage: Quantity::new(wastage)?,
        };

        let outcome = self
            .store
            .append(tenant_id, stock_item_id, new)
            .await?
            .ok_or_else(|| DomainError::not_found("Stock item", stock_item_id))?;

        if outcome.was_backdated() {
            tracing::info!(
                tenant_id = %tenant_id,
                stock_item_id = %stock_item_id,
                date = %date,
                later_entries = outcome.later_entries,
                rewritten = outcome.recomputed.len(),
                "Backdated ledger entry, later balances recomputed"
            );
        }

        if outcome.entry.over_issued {
            tracing::warn!(
                tenant_id = %tenant_id,
                stock_item_id = %stock_item_id,
                insertion_seq = outcome.entry.insertion_seq,
                issued = %issued,
                wastage = %wastage,
                "Movement exceeds available stock, remaining clamped to zero"
            );
        }
        for later in outcome.recomputed.iter().filter(|e| e.over_issued) {
            tracing::warn!(
                tenant_id = %tenant_id,
                stock_item_id = %stock_item_id,
                insertion_seq = later.insertion_seq,
                "Later entry now exceeds available stock, remaining clamped to zero"
            );
        }

        tracing::debug!(
            tenant_id = %tenant_id,
            stock_item_id = %stock_item_id,
            remaining = %outcome.entry.remaining,
            "Ledger entry appended"
        );

        Ok(outcome.entry)
    }

    /// Entries of a stock item in ledger order
    pub async fn entries(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> AppResult<Vec<StockLedgerEntry>> {
        self.require_item(tenant_id, stock_item_id).await?;
        Ok(self.store.entries(tenant_id, stock_item_id).await?)
    }

    /// Balance after the latest entry (original stock when empty)
    pub async fn current_balance(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> AppResult<Quantity> {
        let item = self.require_item(tenant_id, stock_item_id).await?;
        let entries = self.store.entries(tenant_id, stock_item_id).await?;
        Ok(chain::current_balance(item.original_stock, &entries))
    }

    /// Entries whose stored balance disagrees with a full recomputation
    pub async fn verify(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> AppResult<Vec<ChainDrift>> {
        let item = self.require_item(tenant_id, stock_item_id).await?;
        let entries = self.store.entries(tenant_id, stock_item_id).await?;
        Ok(chain::verify_chain(item.original_stock, &entries))
    }

    /// Recompute and persist the whole chain; returns rows corrected
    pub async fn repair(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> AppResult<usize> {
        let corrected = self
            .store
            .rewrite_remaining(tenant_id, stock_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Stock item", stock_item_id))?;

        if corrected > 0 {
            tracing::warn!(
                tenant_id = %tenant_id,
                stock_item_id = %stock_item_id,
                corrected,
                "Ledger chain repaired"
            );
        }

        Ok(corrected)
    }

    async fn require_item(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> AppResult<StockItem> {
        self.store
            .stock_item(tenant_id, stock_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Stock item", stock_item_id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    async fn engine_with_item(
        original: Decimal,
    ) -> (LedgerEngine<MemoryLedgerStore>, TenantId, StockItemId) {
        let engine = LedgerEngine::new(MemoryLedgerStore::new());
        let tenant = TenantId::new();
        let item = StockItemId::new();
        engine
            .register_stock_item(tenant, item, "Vinyl roll", original)
            .await
            .unwrap();
        (engine, tenant, item)
    }

    #[tokio::test]
    async fn test_forward_append() {
        let (engine, tenant, item) = engine_with_item(dec!(100)).await;

        let first = engine
            .append_entry(tenant, item, date(1, 10), dec!(10), dec!(2))
            .await
            .unwrap();
        assert_eq!(first.remaining.value(), dec!(88));

        let second = engine
            .append_entry(tenant, item, date(1, 11), dec!(20), dec!(0))
            .await
            .unwrap();
        assert_eq!(second.remaining.value(), dec!(68));
    }

    #[tokio::test]
    async fn test_backdated_append_recomputes() {
        let (engine, tenant, item) = engine_with_item(dec!(100)).await;
        engine.append_entry(tenant, item, date(1, 10), dec!(10), dec!(2)).await.unwrap();
        engine.append_entry(tenant, item, date(1, 11), dec!(20), dec!(0)).await.unwrap();

        let inserted = engine
            .append_entry(tenant, item, date(1, 1), dec!(5), dec!(0))
            .await
            .unwrap();
        assert_eq!(inserted.remaining.value(), dec!(95));

        let remaining: Vec<Decimal> = engine
            .entries(tenant, item)
            .await
            .unwrap()
            .iter()
            .map(|e| e.remaining.value())
            .collect();
        assert_eq!(remaining, vec![dec!(95), dec!(83), dec!(63)]);
        assert_eq!(engine.current_balance(tenant, item).await.unwrap().value(), dec!(63));
        assert!(engine.verify(tenant, item).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_movements_rejected() {
        let (engine, tenant, item) = engine_with_item(dec!(10)).await;

        let issued = engine.append_entry(tenant, item, date(2, 1), dec!(-1), dec!(0)).await;
        assert!(matches!(issued, Err(AppError::Domain(DomainError::InvalidArgument(_)))));

        let wastage = engine.append_entry(tenant, item, date(2, 1), dec!(1), dec!(-0.5)).await;
        assert!(matches!(wastage, Err(AppError::Domain(DomainError::InvalidArgument(_)))));

        assert!(engine.entries(tenant, item).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_movement_leaves_chain_untouched() {
        let (engine, tenant, item) = engine_with_item(dec!(10)).await;
        engine.append_entry(tenant, item, date(2, 5), dec!(2), dec!(0)).await.unwrap();

        let huge = engine
            .append_entry(tenant, item, date(2, 1), Decimal::MAX, Decimal::MAX)
            .await;
        assert!(matches!(huge, Err(AppError::Domain(DomainError::InvalidArgument(_)))));

        let precise = engine
            .append_entry(tenant, item, date(2, 1), dec!(0.00001), dec!(0))
            .await;
        assert!(matches!(precise, Err(AppError::Domain(DomainError::InvalidArgument(_)))));

        let entries = engine.entries(tenant, item).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].remaining.value(), dec!(8));
        assert!(engine.verify(tenant, item).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_stock_item_not_found() {
        let engine = LedgerEngine::new(MemoryLedgerStore::new());

        let result = engine
            .append_entry(TenantId::new(), StockItemId::new(), date(1, 1), dec!(1), dec!(0))
            .await;
        assert!(matches!(result, Err(AppError::Domain(DomainError::NotFound { .. }))));
    }

    #[tokio::test]
    async fn test_item_scoped_per_tenant() {
        let (engine, _tenant, item) = engine_with_item(dec!(10)).await;

        let result = engine
            .append_entry(TenantId::new(), item, date(1, 1), dec!(1), dec!(0))
            .await;
        assert!(matches!(result, Err(AppError::Domain(DomainError::NotFound { .. }))));
    }

    #[tokio::test]
    async fn test_over_issue_clamped() {
        let (engine, tenant, item) = engine_with_item(dec!(5)).await;

        let entry = engine
            .append_entry(tenant, item, date(3, 1), dec!(4), dec!(3))
            .await
            .unwrap();
        assert_eq!(entry.remaining, Quantity::ZERO);
        assert!(entry.over_issued);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_negative_stock() {
        let (engine, tenant, item) = engine_with_item(dec!(5)).await;

        let dup = engine.register_stock_item(tenant, item, "again", dec!(5)).await;
        assert!(matches!(dup, Err(AppError::Domain(DomainError::InvalidArgument(_)))));

        let negative = engine
            .register_stock_item(tenant, StockItemId::new(), "bad", dec!(-1))
            .await;
        assert!(negative.is_err());
    }

    #[tokio::test]
    async fn test_repair_fixes_drift() {
        let (engine, tenant, item) = engine_with_item(dec!(50)).await;
        engine.append_entry(tenant, item, date(1, 1), dec!(10), dec!(0)).await.unwrap();
        engine.append_entry(tenant, item, date(1, 2), dec!(10), dec!(0)).await.unwrap();

        engine
            .store()
            .corrupt_remaining(tenant, item, 2, Quantity::new(dec!(99)).unwrap())
            .await
            .unwrap();
        assert_eq!(engine.verify(tenant, item).await.unwrap().len(), 1);

        assert_eq!(engine.repair(tenant, item).await.unwrap(), 1);
        assert!(engine.verify(tenant, item).await.unwrap().is_empty());
        assert_eq!(engine.current_balance(tenant, item).await.unwrap().value(), dec!(30));
    }
}
