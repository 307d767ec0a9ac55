//! Amount in words
//!
//! Rendering a grand total as a currency phrase is a presentation concern;
//! [`AmountInWords`] is the seam for plugging in a locale-specific renderer.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::round2;

/// Renders a monetary amount as words
pub trait AmountInWords: Send + Sync {
    fn render(&self, amount: Decimal) -> String;
}

const ONES: [&str; 20] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
    "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Rupee/paisa phrasing with thousand, lakh and crore grouping
///
/// `1130.00` renders as `"Rupees One Thousand One Hundred Thirty Only"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RupeeWords;

impl RupeeWords {
    fn below_hundred(n: u128) -> String {
        let n = n as usize;
        if n < 20 {
            return ONES[n].to_string();
        }
        match n % 10 {
            0 => TENS[n / 10].to_string(),
            unit => format!("{} {}", TENS[n / 10], ONES[unit]),
        }
    }

    fn integer(n: u128) -> String {
        if n == 0 {
            return ONES[0].to_string();
        }

        let mut parts = Vec::new();
        let crore = n / 10_000_000;
        let mut rest = n % 10_000_000;

        if crore > 0 {
            parts.push(format!("{} Crore", Self::integer(crore)));
        }

        for (divisor, label) in [(100_000u128, "Lakh"), (1_000, "Thousand"), (100, "Hundred")] {
            let count = rest / divisor;
            rest %= divisor;
            if count > 0 {
                parts.push(format!("{} {}", Self::below_hundred(count), label));
            }
        }

        if rest > 0 {
            parts.push(Self::below_hundred(rest));
        }

        parts.join(" ")
    }
}

impl AmountInWords for RupeeWords {
    fn render(&self, amount: Decimal) -> String {
        let amount = round2(amount);
        let sign = if amount.is_sign_negative() && !amount.is_zero() {
            "Minus "
        } else {
            ""
        };
        let amount = amount.abs();

        let rupees = amount.trunc();
        let paisa = ((amount - rupees) * Decimal::ONE_HUNDRED).round();

        let (Some(rupees), Some(paisa)) = (rupees.to_u128(), paisa.to_u128()) else {
            return format!("Rupees {sign}{amount} Only");
        };

        match paisa {
            0 => format!("Rupees {sign}{} Only", Self::integer(rupees)),
            _ => format!(
                "Rupees {sign}{} and {} Paisa Only",
                Self::integer(rupees),
                Self::below_hundred(paisa)
            ),
        }
    }
}
