//! Number formatting
//!
//! Renders an allocated sequence value as a display document number.

/// Minimum number of digits in the numeric part
pub const MIN_WIDTH: usize = 3;

/// Format `number` with `prefix` as `"{prefix}-{number}"`, zero padding the
/// numeric part to [`MIN_WIDTH`] digits. Wider numbers are rendered in full.
///
/// # Example
/// ```
/// use numbering_ledger::numbering::format_number;
///
/// assert_eq!(format_number("Q", 7), "Q-007");
/// assert_eq!(format_number("Q", 1042), "Q-1042");
/// ```
pub fn format_number(prefix: &str, number: u64) -> String {
    format!("{}-{:0>width$}", prefix, number, width = MIN_WIDTH)
}
