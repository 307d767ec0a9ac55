//! VAT mode

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Fixed VAT rate (13%)
pub const VAT_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 2);

/// How VAT relates to a document's quoted prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// VAT is added on top of the price
    Excluded,
    /// Prices already include VAT; it is extracted, then re-added after discount
    Included,
    /// No VAT
    None,
}

impl VatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VatMode::Excluded => "excluded",
            VatMode::Included => "included",
            VatMode::None => "none",
        }
    }

    /// Whether a VAT amount is charged on the final price
    pub fn charges_vat(&self) -> bool {
        !matches!(self, VatMode::None)
    }
}

impl fmt::Display for VatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VatMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excluded" => Ok(VatMode::Excluded),
            "included" => Ok(VatMode::Included),
            "none" => Ok(VatMode::None),
            other => Err(DomainError::invalid(format!("unknown VAT mode '{other}'"))),
        }
    }
}
