//! Pricing engine
//!
//! Discount → VAT → totals → words, with every stage rounded to 2 decimal
//! places (half away from zero) before the next stage reads it. Stored
//! documents were priced this way, so the staging must not be collapsed
//! into a single final rounding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{round2, DomainError};

use super::line_item::LineItem;
use super::vat::{VatMode, VAT_RATE};
use super::words::{AmountInWords, RupeeWords};

/// Computed totals for a priced document. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Sum of line item amounts
    pub total: Decimal,
    /// Total with VAT backed out when prices were VAT-inclusive
    pub base_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
    pub price_after_discount: Decimal,
    pub vat_mode: VatMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,
    pub grand_total: Decimal,
    pub amount_in_words: String,
}

fn out_of_range(stage: &str) -> DomainError {
    DomainError::invalid(format!("{stage} amount out of range"))
}

/// Prices quotations and estimates
#[derive(Debug, Clone, Default)]
pub struct PricingEngine<W = RupeeWords> {
    words: W,
}

impl PricingEngine<RupeeWords> {
    pub fn new() -> Self {
        Self { words: RupeeWords }
    }
}

impl<W: AmountInWords> PricingEngine<W> {
    /// Use a different amount-in-words renderer
    pub fn with_renderer(words: W) -> Self {
        Self { words }
    }

    /// Compute totals for a list of particulars.
    ///
    /// # Errors
    /// - `DomainError::InvalidArgument` if there are no line items, any line
    ///   item has a non-positive quantity or rate, the discount is outside
    ///   `[0, 100]`, or a stage exceeds the decimal range
    pub fn compute_pricing(
        &self,
        line_items: &[LineItem],
        discount_percentage: Option<Decimal>,
        vat_mode: VatMode,
    ) -> Result<PricingResult, DomainError> {
        if line_items.is_empty() {
            return Err(DomainError::invalid("at least one line item is required"));
        }
        for item in line_items {
            item.validate()?;
        }

        let discount = match discount_percentage {
            Some(pct) if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED => {
                return Err(DomainError::invalid(format!(
                    "discount percentage must be between 0 and 100 (got {pct})"
                )));
            }
            Some(pct) if pct > Decimal::ZERO => Some(pct),
            _ => None,
        };

        // 1. Total as given
        let total = line_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.amount))
            .ok_or_else(|| out_of_range("total"))?;

        // 2. Back out VAT from inclusive prices
        let base_price = match vat_mode {
            VatMode::Included => total
                .checked_div(Decimal::ONE + VAT_RATE)
                .map(round2)
                .ok_or_else(|| out_of_range("base"))?,
            VatMode::Excluded | VatMode::None => total,
        };

        // 3. Discount
        let (discount_amount, price_after_discount) = match discount {
            Some(pct) => {
                let amount = base_price
                    .checked_mul(pct / Decimal::ONE_HUNDRED)
                    .map(round2)
                    .ok_or_else(|| out_of_range("discount"))?;
                let after = base_price
                    .checked_sub(amount)
                    .map(round2)
                    .ok_or_else(|| out_of_range("discounted"))?;
                (Some(amount), after)
            }
            None => (None, base_price),
        };

        // 4. VAT on the discounted price
        let (vat_amount, grand_total) = if vat_mode.charges_vat() {
            let vat = price_after_discount
                .checked_mul(VAT_RATE)
                .map(round2)
                .ok_or_else(|| out_of_range("VAT"))?;
            let grand_total = price_after_discount
                .checked_add(vat)
                .map(round2)
                .ok_or_else(|| out_of_range("grand total"))?;
            (Some(vat), grand_total)
        } else {
            (None, price_after_discount)
        };

        let amount_in_words = self.words.render(grand_total);

        tracing::debug!(
            total = %total,
            vat_mode = %vat_mode,
            grand_total = %grand_total,
            "Pricing computed"
        );

        Ok(PricingResult {
            total,
            base_price,
            discount_percentage: discount,
            discount_amount,
            price_after_discount,
            vat_mode,
            vat_amount,
            grand_total,
            amount_in_words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn items(amounts: &[Decimal]) -> Vec<LineItem> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| LineItem::new(format!("item {i}"), dec!(1), *amount, *amount))
            .collect()
    }

    #[test]
    fn test_vat_excluded_no_discount() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(600), dec!(400)]), None, VatMode::Excluded)
            .unwrap();

        assert_eq!(result.total, dec!(1000.00));
        assert_eq!(result.base_price, dec!(1000.00));
        assert_eq!(result.discount_amount, None);
        assert_eq!(result.vat_amount, Some(dec!(130.00)));
        assert_eq!(result.grand_total, dec!(1130.00));
        assert_eq!(
            result.amount_in_words,
            "Rupees One Thousand One Hundred Thirty Only"
        );
    }

    #[test]
    fn test_vat_included_round_trip() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(1130.00)]), None, VatMode::Included)
            .unwrap();

        assert_eq!(result.base_price, dec!(1000.00));
        assert_eq!(result.vat_amount, Some(dec!(130.00)));
        assert_eq!(result.grand_total, dec!(1130.00));
    }

    #[test]
    fn test_discount_then_vat() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(1000.00)]), Some(dec!(10)), VatMode::Excluded)
            .unwrap();

        assert_eq!(result.discount_amount, Some(dec!(100.00)));
        assert_eq!(result.price_after_discount, dec!(900.00));
        assert_eq!(result.vat_amount, Some(dec!(117.00)));
        assert_eq!(result.grand_total, dec!(1017.00));
    }

    #[test]
    fn test_included_staged_rounding() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(1000)]), None, VatMode::Included)
            .unwrap();

        // 1000 / 1.13 = 884.9557… → 884.96; VAT 115.0448 → 115.04
        assert_eq!(result.base_price, dec!(884.96));
        assert_eq!(result.vat_amount, Some(dec!(115.04)));
        assert_eq!(result.grand_total, dec!(1000.00));
    }

    #[test]
    fn test_included_with_discount() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(1000)]), Some(dec!(12.5)), VatMode::Included)
            .unwrap();

        assert_eq!(result.discount_amount, Some(dec!(110.62)));
        assert_eq!(result.price_after_discount, dec!(774.34));
        assert_eq!(result.vat_amount, Some(dec!(100.66)));
        assert_eq!(result.grand_total, dec!(875.00));
    }

    #[test]
    fn test_midpoint_rounds_away_from_zero() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(10.05)]), Some(dec!(50)), VatMode::Excluded)
            .unwrap();

        assert_eq!(result.discount_amount, Some(dec!(5.03)));
        assert_eq!(result.price_after_discount, dec!(5.02));
        assert_eq!(result.vat_amount, Some(dec!(0.65)));
        assert_eq!(result.grand_total, dec!(5.67));
    }

    #[test]
    fn test_vat_none() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(250), dec!(250)]), Some(dec!(20)), VatMode::None)
            .unwrap();

        assert_eq!(result.price_after_discount, dec!(400.00));
        assert_eq!(result.vat_amount, None);
        assert_eq!(result.grand_total, dec!(400.00));
    }

    #[test]
    fn test_zero_discount_omitted() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(100)]), Some(Decimal::ZERO), VatMode::None)
            .unwrap();

        assert_eq!(result.discount_percentage, None);
        assert_eq!(result.discount_amount, None);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("discount_amount").is_none());
        assert!(json.get("vat_amount").is_none());
    }

    #[test]
    fn test_full_discount() {
        let engine = PricingEngine::new();
        let result = engine
            .compute_pricing(&items(&[dec!(100)]), Some(dec!(100)), VatMode::Excluded)
            .unwrap();

        assert_eq!(result.price_after_discount, dec!(0));
        assert_eq!(result.grand_total, dec!(0));
        assert_eq!(result.amount_in_words, "Rupees Zero Only");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let engine = PricingEngine::new();

        let over_hundred =
            engine.compute_pricing(&items(&[dec!(100)]), Some(dec!(100.01)), VatMode::None);
        assert!(matches!(over_hundred, Err(DomainError::InvalidArgument(_))));

        let negative = engine.compute_pricing(&items(&[dec!(100)]), Some(dec!(-5)), VatMode::None);
        assert!(matches!(negative, Err(DomainError::InvalidArgument(_))));

        let empty = engine.compute_pricing(&[], None, VatMode::None);
        assert!(matches!(empty, Err(DomainError::InvalidArgument(_))));

        let bad_rate = vec![LineItem::new("free sample", dec!(1), dec!(0), dec!(0))];
        let result = engine.compute_pricing(&bad_rate, None, VatMode::Excluded);
        assert!(matches!(result, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_overflowing_amounts_rejected() {
        let engine = PricingEngine::new();
        let half = Decimal::MAX / dec!(2) + Decimal::ONE;

        let sum = engine.compute_pricing(&items(&[half, half]), None, VatMode::None);
        assert!(matches!(sum, Err(DomainError::InvalidArgument(_))));

        // VAT pushes the grand total past the decimal range
        let grand = engine.compute_pricing(&items(&[Decimal::MAX]), None, VatMode::Excluded);
        assert!(matches!(grand, Err(DomainError::InvalidArgument(_))));
    }

    #[test]
    fn test_huge_amount_with_full_discount() {
        let engine = PricingEngine::new();
        let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let result = engine
            .compute_pricing(&items(&[huge]), Some(dec!(100)), VatMode::Excluded)
            .unwrap();

        assert_eq!(result.discount_amount, Some(huge));
        assert_eq!(result.price_after_discount, Decimal::ZERO);
        assert_eq!(result.grand_total, Decimal::ZERO);
    }

    struct Plain;

    impl AmountInWords for Plain {
        fn render(&self, amount: Decimal) -> String {
            format!("NPR {}", amount.normalize())
        }
    }

    #[test]
    fn test_custom_renderer() {
        let engine = PricingEngine::with_renderer(Plain);
        let result = engine
            .compute_pricing(&items(&[dec!(1000.00)]), None, VatMode::Excluded)
            .unwrap();

        assert_eq!(result.amount_in_words, "NPR 1130");
    }
}
