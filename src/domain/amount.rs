//! Amount helpers
//!
//! Decimal primitives shared by the ledger and pricing modules.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Monetary values carry 2 decimal places
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Round to 2 decimal places, half away from zero.
///
/// Every stage of the pricing pipeline goes through this before the next
/// stage reads it.
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Stock quantities carry at most 4 decimal places
pub const QUANTITY_DECIMAL_PLACES: u32 = 4;

/// Largest storable stock quantity, `9_999_999_999_999_999.9999`
/// (a `NUMERIC(20,4)` column).
pub const MAX_QUANTITY: Decimal =
    Decimal::from_parts(1_661_992_959, 1_808_227_885, 5, false, QUANTITY_DECIMAL_PLACES);

/// A stock quantity (issued, wasted or on hand).
///
/// # Invariants
/// - `0 <= value <= MAX_QUANTITY`
/// - At most `QUANTITY_DECIMAL_PLACES` significant decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    pub const ZERO: Quantity = Quantity(Decimal::ZERO);

    /// Create a quantity, rejecting negative, oversized or over-precise
    /// values.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value < Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "quantity must not be negative (got {value})"
            )));
        }
        if value > MAX_QUANTITY {
            return Err(DomainError::invalid(format!(
                "quantity exceeds {MAX_QUANTITY} (got {value})"
            )));
        }
        if value.normalize().scale() > QUANTITY_DECIMAL_PLACES {
            return Err(DomainError::invalid(format!(
                "quantity has more than {QUANTITY_DECIMAL_PLACES} decimal places (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Take `rhs` out of this quantity, clamping at zero. Returns the
    /// clamped result and whether the clamp was hit.
    pub fn saturating_sub(&self, rhs: Quantity) -> (Quantity, bool) {
        if rhs.0 > self.0 {
            (Quantity::ZERO, true)
        } else {
            (Quantity(self.0 - rhs.0), false)
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s)
            .map_err(|e| DomainError::invalid(format!("invalid quantity '{s}': {e}")))?;
        Quantity::new(value)
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}
