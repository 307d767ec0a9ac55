//! Identifiers
//!
//! Tenant and stock item ids are opaque UUIDs; counter kinds are short tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::DomainError;

/// Identifier of a tenant (isolation boundary).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

/// Identifier of a stock item within a tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockItemId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty) => {
        impl $t {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

impl_uuid_newtype!(TenantId);
impl_uuid_newtype!(StockItemId);

/// Maximum length of a counter kind tag
const MAX_KIND_LEN: usize = 32;

/// A named category of document numbering.
///
/// The set is open: tenants may introduce their own tags. Tags are stored
/// trimmed and lowercased so `"Job"` and `"job "` address the same counter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterKind(String);

impl CounterKind {
    pub const QUOTATION: &'static str = "quotation";
    pub const JOB: &'static str = "job";
    pub const ESTIMATE: &'static str = "estimate";
    pub const CHALLAN: &'static str = "challan";

    /// Create a validated counter kind.
    pub fn new(tag: &str) -> Result<Self, DomainError> {
        let tag = tag.trim().to_lowercase();

        if tag.is_empty() {
            return Err(DomainError::invalid("counter kind must not be empty"));
        }
        if tag.len() > MAX_KIND_LEN {
            return Err(DomainError::invalid(format!(
                "counter kind exceeds {MAX_KIND_LEN} characters"
            )));
        }
        if !tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::invalid(format!(
                "counter kind '{tag}' contains unsupported characters"
            )));
        }

        Ok(Self(tag))
    }

    pub fn quotation() -> Self {
        Self(Self::QUOTATION.to_string())
    }

    pub fn job() -> Self {
        Self(Self::JOB.to_string())
    }

    pub fn estimate() -> Self {
        Self(Self::ESTIMATE.to_string())
    }

    pub fn challan() -> Self {
        Self(Self::CHALLAN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CounterKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CounterKind {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CounterKind> for String {
    fn from(kind: CounterKind) -> Self {
        kind.0
    }
}
