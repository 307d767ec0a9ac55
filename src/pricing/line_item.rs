//! Priced particulars

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{round2, DomainError};

/// One priced row of a quotation or estimate.
///
/// `amount` is normally `quantity * rate` but is taken as given so that
/// pre-rounded amounts from stored documents price identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    /// Line item with an explicit amount
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            rate,
            amount,
        }
    }

    /// Line item whose amount is `round2(quantity * rate)`
    ///
    /// # Errors
    /// - `DomainError::InvalidArgument` if the product does not fit a decimal
    pub fn priced(
        description: impl Into<String>,
        quantity: Decimal,
        rate: Decimal,
    ) -> Result<Self, DomainError> {
        let description = description.into();
        let amount = quantity.checked_mul(rate).ok_or_else(|| {
            DomainError::invalid(format!("amount out of range for '{description}'"))
        })?;
        Ok(Self::new(description, quantity, rate, round2(amount)))
    }

    /// Check quantity and rate are positive
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "quantity must be positive for '{}' (got {})",
                self.description, self.quantity
            )));
        }
        if self.rate <= Decimal::ZERO {
            return Err(DomainError::invalid(format!(
                "rate must be positive for '{}' (got {})",
                self.description, self.rate
            )));
        }
        Ok(())
    }
}
