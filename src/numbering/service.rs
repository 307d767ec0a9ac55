//! Numbering service
//!
//! Resolve prefix → allocate → format, for callers that attach a display
//! number to a newly created document.

use serde::{Deserialize, Serialize};

use crate::domain::{CounterKind, TenantId};
use crate::error::AppResult;

use super::allocator::{CounterStore, SequenceAllocator};
use super::config::{NumberingConfig, NumberingConfigStore};
use super::formatter::format_number;

/// A freshly allocated document number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNumber {
    pub kind: CounterKind,
    pub sequence: u64,
    pub formatted: String,
}

/// Numbering façade over an allocator and a configuration store
#[derive(Debug, Clone)]
pub struct NumberingService<C, P> {
    allocator: SequenceAllocator<C>,
    configs: P,
}

impl<C, P> NumberingService<C, P>
where
    C: CounterStore,
    P: NumberingConfigStore,
{
    pub fn new(allocator: SequenceAllocator<C>, configs: P) -> Self {
        Self { allocator, configs }
    }

    pub fn allocator(&self) -> &SequenceAllocator<C> {
        &self.allocator
    }

    /// Allocate and format the next number for a tenant's document kind.
    ///
    /// The prefix is resolved before allocating; nothing after the
    /// allocation may fail.
    pub async fn next_document_number(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> AppResult<DocumentNumber> {
        let prefix = self.configs.load(tenant_id).await?.prefix_for(kind);
        let sequence = self.allocator.allocate_next(tenant_id, kind).await?;
        let formatted = format_number(&prefix, sequence);

        tracing::info!(
            tenant_id = %tenant_id,
            counter_kind = %kind,
            number = %formatted,
            "Document number issued"
        );

        Ok(DocumentNumber {
            kind: kind.clone(),
            sequence,
            formatted,
        })
    }

    /// Current configuration for a tenant (defaults if never saved)
    pub async fn config(&self, tenant_id: TenantId) -> AppResult<NumberingConfig> {
        Ok(self.configs.load(tenant_id).await?)
    }

    /// Override a tenant's prefix for one kind
    pub async fn set_prefix(
        &self,
        tenant_id: TenantId,
        kind: CounterKind,
        prefix: &str,
    ) -> AppResult<NumberingConfig> {
        let mut config = self.configs.load(tenant_id).await?;
        config.set_prefix(kind, prefix)?;
        self.configs.save(&config).await?;
        Ok(config)
    }

    /// Revert a kind to its default prefix
    pub async fn clear_prefix(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> AppResult<NumberingConfig> {
        let mut config = self.configs.load(tenant_id).await?;
        if config.clear_prefix(kind) {
            self.configs.save(&config).await?;
        }
        Ok(config)
    }
}
