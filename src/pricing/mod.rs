//! Pricing module
//!
//! Staged discount/VAT pipeline for quotations and estimates.

pub mod engine;
pub mod line_item;
pub mod vat;
pub mod words;

pub use engine::{PricingEngine, PricingResult};
pub use line_item::LineItem;
pub use vat::{VatMode, VAT_RATE};
pub use words::{AmountInWords, RupeeWords};
