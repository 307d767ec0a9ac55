//! Numbering configuration
//!
//! Per-tenant mapping from counter kind to display prefix.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::domain::{CounterKind, DomainError, TenantId};
use crate::storage::StoreError;

/// Maximum prefix length
const MAX_PREFIX_LEN: usize = 16;

/// Built-in prefixes for the well-known counter kinds
const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    (CounterKind::QUOTATION, "Q"),
    (CounterKind::JOB, "J"),
    (CounterKind::ESTIMATE, "E"),
    (CounterKind::CHALLAN, "C"),
];

/// Default prefix for a kind when the tenant has not configured one.
///
/// Well-known kinds use the built-in table; any other tag falls back to its
/// uppercased form.
pub fn default_prefix(kind: &CounterKind) -> String {
    DEFAULT_PREFIXES
        .iter()
        .find(|(tag, _)| *tag == kind.as_str())
        .map(|(_, prefix)| (*prefix).to_string())
        .unwrap_or_else(|| kind.as_str().to_uppercase())
}

/// Tenant numbering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingConfig {
    pub tenant_id: TenantId,
    /// Tenant overrides; kinds not present use [`default_prefix`]
    pub prefixes: BTreeMap<CounterKind, String>,
}

impl NumberingConfig {
    /// Configuration with no overrides
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            prefixes: BTreeMap::new(),
        }
    }

    /// Resolve the prefix for a kind
    pub fn prefix_for(&self, kind: &CounterKind) -> String {
        self.prefixes
            .get(kind)
            .cloned()
            .unwrap_or_else(|| default_prefix(kind))
    }

    /// Override the prefix for a kind.
    ///
    /// # Errors
    /// - `DomainError::InvalidArgument` if the prefix is empty, too long,
    ///   contains whitespace or is made only of `-`
    pub fn set_prefix(&mut self, kind: CounterKind, prefix: &str) -> Result<(), DomainError> {
        let prefix = prefix.trim();

        if prefix.is_empty() {
            return Err(DomainError::invalid("prefix must not be empty"));
        }
        if prefix.chars().count() > MAX_PREFIX_LEN {
            return Err(DomainError::invalid(format!(
                "prefix exceeds {MAX_PREFIX_LEN} characters"
            )));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid("prefix must not contain whitespace"));
        }
        if prefix.chars().all(|c| c == '-') {
            return Err(DomainError::invalid("prefix must not consist only of '-'"));
        }

        self.prefixes.insert(kind, prefix.to_string());
        Ok(())
    }

    /// Drop a tenant override, reverting the kind to its default prefix
    pub fn clear_prefix(&mut self, kind: &CounterKind) -> bool {
        self.prefixes.remove(kind).is_some()
    }
}

/// Persistence for numbering configuration
#[async_trait]
pub trait NumberingConfigStore: Send + Sync {
    /// Load a tenant's configuration; tenants without a record get defaults
    async fn load(&self, tenant_id: TenantId) -> Result<NumberingConfig, StoreError>;

    /// Replace a tenant's configuration
    async fn save(&self, config: &NumberingConfig) -> Result<(), StoreError>;
}

/// In-memory configuration store
#[derive(Debug, Default)]
pub struct MemoryNumberingConfigStore {
    configs: RwLock<HashMap<TenantId, NumberingConfig>>,
}

impl MemoryNumberingConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NumberingConfigStore for MemoryNumberingConfigStore {
    async fn load(&self, tenant_id: TenantId) -> Result<NumberingConfig, StoreError> {
        let configs = self
            .configs
            .read()
            .map_err(|_| StoreError::InvalidData("config lock poisoned".to_string()))?;

        Ok(configs
            .get(&tenant_id)
            .cloned()
            .unwrap_or_else(|| NumberingConfig::new(tenant_id)))
    }

    async fn save(&self, config: &NumberingConfig) -> Result<(), StoreError> {
        let mut configs = self
            .configs
            .write()
            .map_err(|_| StoreError::InvalidData("config lock poisoned".to_string()))?;

        configs.insert(config.tenant_id, config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefixes() {
        let config = NumberingConfig::new(TenantId::new());

        assert_eq!(config.prefix_for(&CounterKind::quotation()), "Q");
        assert_eq!(config.prefix_for(&CounterKind::job()), "J");
        assert_eq!(config.prefix_for(&CounterKind::estimate()), "E");
        assert_eq!(config.prefix_for(&CounterKind::challan()), "C");
    }

    #[test]
    fn test_unknown_kind_falls_back_to_tag() {
        let config = NumberingConfig::new(TenantId::new());
        let kind = CounterKind::new("invoice").unwrap();

        assert_eq!(config.prefix_for(&kind), "INVOICE");
    }

    #[test]
    fn test_override_and_clear() {
        let mut config = NumberingConfig::new(TenantId::new());
        config.set_prefix(CounterKind::quotation(), " QT ").unwrap();
        assert_eq!(config.prefix_for(&CounterKind::quotation()), "QT");
        // Other kinds untouched
        assert_eq!(config.prefix_for(&CounterKind::job()), "J");

        assert!(config.clear_prefix(&CounterKind::quotation()));
        assert_eq!(config.prefix_for(&CounterKind::quotation()), "Q");
    }

    #[test]
    fn test_invalid_prefixes_rejected() {
        let mut config = NumberingConfig::new(TenantId::new());

        assert!(config.set_prefix(CounterKind::job(), "").is_err());
        assert!(config.set_prefix(CounterKind::job(), "A B").is_err());
        assert!(config
            .set_prefix(CounterKind::job(), &"P".repeat(17))
            .is_err());
        assert!(matches!(
            config.set_prefix(CounterKind::job(), "--"),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(config.prefixes.is_empty());

        // A dash inside a prefix is fine
        config.set_prefix(CounterKind::job(), "JB-K").unwrap();
        assert_eq!(config.prefix_for(&CounterKind::job()), "JB-K");
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryNumberingConfigStore::new();
        let tenant = TenantId::new();

        let loaded = store.load(tenant).await.unwrap();
        assert!(loaded.prefixes.is_empty());

        let mut config = loaded;
        config.set_prefix(CounterKind::challan(), "DN").unwrap();
        store.save(&config).await.unwrap();

        let reloaded = store.load(tenant).await.unwrap();
        assert_eq!(reloaded.prefix_for(&CounterKind::challan()), "DN");

        // Tenants are isolated
        let other = store.load(TenantId::new()).await.unwrap();
        assert_eq!(other.prefix_for(&CounterKind::challan()), "C");
    }
}
