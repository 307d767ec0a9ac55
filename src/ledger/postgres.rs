//! PostgreSQL ledger store
//!
//! The stock item row is locked with `SELECT … FOR UPDATE` for the duration
//! of each append, which serializes writers on the same item across
//! processes. Different items lock different rows and never contend.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Quantity, StockItemId, TenantId};
use crate::storage::StoreError;

use super::chain;
use super::entry::{AppendOutcome, NewLedgerEntry, StockItem, StockLedgerEntry};
use super::store::LedgerStore;

type EntryRow = (Uuid, Uuid, i64, NaiveDate, Decimal, Decimal, Decimal, bool);

fn quantity(value: Decimal, column: &str) -> Result<Quantity, StoreError> {
    Quantity::new(value).map_err(|e| StoreError::InvalidData(format!("{column}: {e}")))
}

fn entry_from_row(row: EntryRow) -> Result<StockLedgerEntry, StoreError> {
    let (tenant_id, stock_item_id, insertion_seq, date, issued, wastage, remaining, over_issued) =
        row;

    Ok(StockLedgerEntry {
        tenant_id: TenantId::from_uuid(tenant_id),
        stock_item_id: StockItemId::from_uuid(stock_item_id),
        date,
        issued: quantity(issued, "issued")?,
        wastage: quantity(wastage, "wastage")?,
        remaining: quantity(remaining, "remaining")?,
        insertion_seq,
        over_issued,
    })
}

/// Ledger store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lock the stock item row; `None` if it does not exist
    async fn lock_stock_item(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<StockItem>, StoreError> {
        let row: Option<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT name, original_stock
            FROM stock_items
            WHERE tenant_id = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(stock_item_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;

        row.map(|(name, original_stock)| {
            Ok(StockItem {
                tenant_id,
                id: stock_item_id,
                name,
                original_stock: quantity(original_stock, "original_stock")?,
            })
        })
        .transpose()
    }

    async fn load_entries(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Vec<StockLedgerEntry>, StoreError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            r#"
            SELECT tenant_id, stock_item_id, insertion_seq, entry_date,
                   issued, wastage, remaining, over_issued
            FROM stock_ledger_entries
            WHERE tenant_id = $1 AND stock_item_id = $2
            ORDER BY entry_date ASC, insertion_seq ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(stock_item_id.as_uuid())
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(entry_from_row).collect()
    }

    async fn update_balance(
        tx: &mut Transaction<'_, Postgres>,
        entry: &StockLedgerEntry,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE stock_ledger_entries
            SET remaining = $4, over_issued = $5, updated_at = NOW()
            WHERE tenant_id = $1 AND stock_item_id = $2 AND insertion_seq = $3
            "#,
        )
        .bind(entry.tenant_id.as_uuid())
        .bind(entry.stock_item_id.as_uuid())
        .bind(entry.insertion_seq)
        .bind(entry.remaining.value())
        .bind(entry.over_issued)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn register_stock_item(&self, item: &StockItem) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            INSERT INTO stock_items (tenant_id, id, name, original_stock)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (tenant_id, id) DO NOTHING
            "#,
        )
        .bind(item.tenant_id.as_uuid())
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(item.original_stock.value())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected == 1)
    }

    async fn stock_item(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<StockItem>, StoreError> {
        let row: Option<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT name, original_stock
            FROM stock_items
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(stock_item_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(name, original_stock)| {
            Ok(StockItem {
                tenant_id,
                id: stock_item_id,
                name,
                original_stock: quantity(original_stock, "original_stock")?,
            })
        })
        .transpose()
    }

    async fn entries(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Vec<StockLedgerEntry>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let entries = Self::load_entries(&mut tx, tenant_id, stock_item_id).await?;
        tx.commit().await?;
        Ok(entries)
    }

    async fn append(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
        new: NewLedgerEntry,
    ) -> Result<Option<AppendOutcome>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let Some(item) = Self::lock_stock_item(&mut tx, tenant_id, stock_item_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut entries = Self::load_entries(&mut tx, tenant_id, stock_item_id).await?;
        let outcome = chain::apply_append(&item, &mut entries, new);

        let entry = &outcome.entry;
        sqlx::query(
            r#"
            INSERT INTO stock_ledger_entries (
                tenant_id, stock_item_id, insertion_seq, entry_date,
                issued, wastage, remaining, over_issued
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.tenant_id.as_uuid())
        .bind(entry.stock_item_id.as_uuid())
        .bind(entry.insertion_seq)
        .bind(entry.date)
        .bind(entry.issued.value())
        .bind(entry.wastage.value())
        .bind(entry.remaining.value())
        .bind(entry.over_issued)
        .execute(&mut *tx)
        .await?;

        for later in &outcome.recomputed {
            Self::update_balance(&mut tx, later).await?;
        }

        tx.commit().await?;

        Ok(Some(outcome))
    }

    async fn rewrite_remaining(
        &self,
        tenant_id: TenantId,
        stock_item_id: StockItemId,
    ) -> Result<Option<usize>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let Some(item) = Self::lock_stock_item(&mut tx, tenant_id, stock_item_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let mut entries = Self::load_entries(&mut tx, tenant_id, stock_item_id).await?;
        let changed = chain::recompute_from(item.original_stock, &mut entries, 0);

        for idx in &changed {
            Self::update_balance(&mut tx, &entries[*idx]).await?;
        }

        tx.commit().await?;

        Ok(Some(changed.len()))
    }

    async fn stock_item_keys(&self) -> Result<Vec<(TenantId, StockItemId)>, StoreError> {
        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT tenant_id, id FROM stock_items ORDER BY tenant_id, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tenant_id, id)| (TenantId::from_uuid(tenant_id), StockItemId::from_uuid(id)))
            .collect())
    }
}
