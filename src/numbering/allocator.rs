//! Sequence allocation
//!
//! Hands out gap-free, collision-free sequence values per (tenant, kind).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::{CounterKind, DomainError, TenantId};
use crate::error::{AppError, AppResult};
use crate::storage::StoreError;

/// Default number of attempts for a conflicting increment
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Atomic counter persistence.
///
/// Implementations must perform `increment` as a single atomic
/// read-modify-write; reading then writing in two steps hands out duplicates
/// under concurrency.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Increment the counter (creating it at 0 if absent) and return the new value
    async fn increment(&self, tenant_id: TenantId, kind: &CounterKind) -> Result<u64, StoreError>;

    /// Overwrite the counter value in one atomic write
    async fn set(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
        value: u64,
    ) -> Result<(), StoreError>;

    /// Current value, `None` if the counter was never touched
    async fn current(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> Result<Option<u64>, StoreError>;
}

/// In-memory counter store backed by one `AtomicU64` per counter
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: RwLock<HashMap<(TenantId, CounterKind), Arc<AtomicU64>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> Result<Arc<AtomicU64>, StoreError> {
        let key = (tenant_id, kind.clone());

        {
            let counters = self.counters.read().map_err(|_| poisoned())?;
            if let Some(counter) = counters.get(&key) {
                return Ok(Arc::clone(counter));
            }
        }

        let mut counters = self.counters.write().map_err(|_| poisoned())?;
        Ok(Arc::clone(counters.entry(key).or_default()))
    }
}

fn poisoned() -> StoreError {
    StoreError::InvalidData("counter lock poisoned".to_string())
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn increment(&self, tenant_id: TenantId, kind: &CounterKind) -> Result<u64, StoreError> {
        let counter = self.counter(tenant_id, kind)?;
        Ok(counter.fetch_add(1, Ordering::AcqRel) + 1)
    }

    async fn set(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
        value: u64,
    ) -> Result<(), StoreError> {
        let counter = self.counter(tenant_id, kind)?;
        counter.store(value, Ordering::Release);
        Ok(())
    }

    async fn current(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
    ) -> Result<Option<u64>, StoreError> {
        let counters = self.counters.read().map_err(|_| poisoned())?;
        Ok(counters
            .get(&(tenant_id, kind.clone()))
            .map(|c| c.load(Ordering::Acquire)))
    }
}

/// Allocates document sequence values
#[derive(Debug, Clone)]
pub struct SequenceAllocator<S> {
    store: S,
    max_retries: u32,
}

impl<S: CounterStore> SequenceAllocator<S> {
    /// Create a new allocator over a counter store
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Override how many times a conflicting increment is attempted
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate the next value for (tenant, kind).
    ///
    /// Conflicts reported by the store are retried with backoff; the caller
    /// only sees `ConflictUnderConcurrency` once every attempt failed.
    pub async fn allocate_next(&self, tenant_id: TenantId, kind: &CounterKind) -> AppResult<u64> {
        for attempt in 0..self.max_retries {
            match self.store.increment(tenant_id, kind).await {
                Ok(value) => {
                    tracing::debug!(
                        tenant_id = %tenant_id,
                        counter_kind = %kind,
                        value,
                        "Allocated sequence value"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries - 1 => {
                    let delay = Duration::from_millis(10 * (attempt as u64 + 1));
                    tracing::warn!(
                        tenant_id = %tenant_id,
                        counter_kind = %kind,
                        "Counter conflict, retrying (attempt {}/{})",
                        attempt + 1,
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_retryable() => break,
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::ConflictUnderConcurrency {
            scope: format!("counter {tenant_id}/{kind}"),
        }
        .into())
    }

    /// Reset a counter so the next allocation returns `starting_number`.
    ///
    /// Not coordinated with allocations already in flight: whichever write
    /// lands last wins.
    pub async fn reset_counter(
        &self,
        tenant_id: TenantId,
        kind: &CounterKind,
        starting_number: i64,
    ) -> AppResult<()> {
        if starting_number < 0 {
            return Err(AppError::Domain(DomainError::invalid(format!(
                "starting number must not be negative (got {starting_number})"
            ))));
        }

        let value = (starting_number - 1).max(0) as u64;
        self.store.set(tenant_id, kind, value).await?;

        tracing::warn!(
            tenant_id = %tenant_id,
            counter_kind = %kind,
            starting_number,
            "Counter reset"
        );

        Ok(())
    }

    /// Value the next allocation would return, without consuming it
    pub async fn peek_next(&self, tenant_id: TenantId, kind: &CounterKind) -> AppResult<u64> {
        let current = self.store.current(tenant_id, kind).await?.unwrap_or(0);
        Ok(current + 1)
    }
}
