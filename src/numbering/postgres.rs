//! PostgreSQL numbering stores
//!
//! Counters live in `sequence_counters`, one row per (tenant, kind).
//! Prefix overrides live in `numbering_configs` as a JSONB map.

use async_trait::async_trait;
use std::collections::BTreeMap;
use sqlx::PgPool;

use crate::domain::{CounterKind, TenantId};
use crate::storage::StoreError;

use super::allocator::CounterStore;
use super::config::{NumberingConfig, NumberingConfigStore};

fn to_u64(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("negative counter value {value}")))
}

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("counter value {value} out of range")))
}

/// Counter store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    /// Upsert-and-increment in one statement; the row lock taken by
    /// `ON CONFLICT DO UPDATE` serializes concurrent callers.
    async fn increment(&self, tenant_id: TenantId, kind: &CounterKind) -> Result<u64, StoreError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sequence_counters (tenant_id, counter_kind, value)
            VALUES ($1, $2, 1)
            ON CONFLICT (tenant_id, counter_kind)
            DO UPDATE SET value = sequence_counters.value + 1, updated_at = NOW()
            RETURNING value
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        to_u64(value)
    }

    async fn set(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
        value: u64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO sequence_counters (tenant_id, counter_kind, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (tenant_id, counter_kind)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.as_str())
        .bind(to_i64(value)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn current(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> Result<Option<u64>, StoreError> {
        let value: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT value FROM sequence_counters
            WHERE tenant_id = $1 AND counter_kind = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;

        value.map(to_u64).transpose()
    }
}

/// Numbering configuration store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgNumberingConfigStore {
    pool: PgPool,
}

impl PgNumberingConfigStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NumberingConfigStore for PgNumberingConfigStore {
    async fn load(&self, tenant_id: TenantId) -> Result<NumberingConfig, StoreError> {
        let prefixes: Option<serde_json::Value> = sqlx::query_scalar(
            r#"
            SELECT prefixes FROM numbering_configs WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let prefixes: BTreeMap<CounterKind, String> = match prefixes {
            Some(json) => serde_json::from_value(json)?,
            None => BTreeMap::new(),
        };

        Ok(NumberingConfig {
            tenant_id,
            prefixes,
        })
    }

    async fn save(&self, config: &NumberingConfig) -> Result<(), StoreError> {
        let prefixes = serde_json::to_value(&config.prefixes)?;

        sqlx::query(
            r#"
            INSERT INTO numbering_configs (tenant_id, prefixes)
            VALUES ($1, $2)
            ON CONFLICT (tenant_id)
            DO UPDATE SET prefixes = EXCLUDED.prefixes, updated_at = NOW()
            "#,
        )
        .bind(config.tenant_id.as_uuid())
        .bind(prefixes)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            tenant_id = %config.tenant_id,
            overrides = config.prefixes.len(),
            "Numbering configuration saved"
        );

        Ok(())
    }
}
