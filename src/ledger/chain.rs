//! Running-balance chain
//!
//! Pure ledger arithmetic. Entries are kept ordered by `(date, insertion_seq)`
//! and `remaining[i] = max(0, remaining[i-1] - issued[i] - wastage[i])`, with
//! the stock item's original stock standing in for `remaining[-1]`.
//!
//! Stores call into this module while holding their per-item critical
//! section; nothing here performs I/O.

use crate::domain::Quantity;

use super::entry::{AppendOutcome, NewLedgerEntry, StockItem, StockLedgerEntry};

/// A stored entry whose balance disagrees with a fresh recomputation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDrift {
    pub insertion_seq: i64,
    pub stored_remaining: Quantity,
    pub expected_remaining: Quantity,
    pub stored_over_issued: bool,
    pub expected_over_issued: bool,
}

/// Sequence number for the next entry of a chain
pub fn next_insertion_seq(entries: &[StockLedgerEntry]) -> i64 {
    entries.iter().map(|e| e.insertion_seq).max().unwrap_or(0) + 1
}

/// Put entries into ledger order
pub fn sort_chain(entries: &mut [StockLedgerEntry]) {
    entries.sort_by_key(StockLedgerEntry::ordering_key);
}

fn is_ordered(entries: &[StockLedgerEntry]) -> bool {
    entries
        .windows(2)
        .all(|w| w[0].ordering_key() < w[1].ordering_key())
}

/// Balance after the last entry, or the original stock for an empty chain
pub fn current_balance(original_stock: Quantity, entries: &[StockLedgerEntry]) -> Quantity {
    entries.last().map(|e| e.remaining).unwrap_or(original_stock)
}

/// Recompute `remaining` and `over_issued` for `entries[start..]`.
///
/// Returns the indices whose stored values changed.
pub fn recompute_from(
    original_stock: Quantity,
    entries: &mut [StockLedgerEntry],
    start: usize,
) -> Vec<usize> {
    if start > entries.len() {
        return Vec::new();
    }

    let mut balance = match start {
        0 => original_stock,
        _ => entries[start - 1].remaining,
    };
    let mut changed = Vec::new();

    for (idx, entry) in entries.iter_mut().enumerate().skip(start) {
        let (after_issue, issue_clamped) = balance.saturating_sub(entry.issued);
        let (remaining, waste_clamped) = after_issue.saturating_sub(entry.wastage);
        let clamped = issue_clamped || waste_clamped;

        if entry.remaining != remaining || entry.over_issued != clamped {
            changed.push(idx);
        }
        entry.remaining = remaining;
        entry.over_issued = clamped;
        balance = remaining;
    }

    changed
}

/// Insert a new movement into an ordered chain and recompute every entry
/// from its position onward.
///
/// The new entry receives the next insertion sequence, so it sorts after
/// every existing entry sharing its date.
pub fn apply_append(
    item: &StockItem,
    entries: &mut Vec<StockLedgerEntry>,
    new: NewLedgerEntry,
) -> AppendOutcome {
    debug_assert!(is_ordered(entries), "ledger chain out of order");

    let entry = StockLedgerEntry {
        tenant_id: item.tenant_id,
        stock_item_id: item.id,
        date: new.date,
        issued: new.issued,
        wastage: new.wastage,
        remaining: Quantity::ZERO,
        insertion_seq: next_insertion_seq(entries),
        over_issued: false,
    };

    let key = entry.ordering_key();
    let position = entries.partition_point(|e| e.ordering_key() < key);
    entries.insert(position, entry);

    let changed = recompute_from(item.original_stock, entries, position);
    let recomputed = changed
        .into_iter()
        .filter(|&idx| idx != position)
        .map(|idx| entries[idx].clone())
        .collect();

    AppendOutcome {
        entry: entries[position].clone(),
        later_entries: entries.len() - position - 1,
        recomputed,
    }
}

/// Compare stored balances with a fresh recomputation of the whole chain
pub fn verify_chain(original_stock: Quantity, entries: &[StockLedgerEntry]) -> Vec<ChainDrift> {
    let mut expected = entries.to_vec();
    sort_chain(&mut expected);
    recompute_from(original_stock, &mut expected, 0);

    expected
        .iter()
        .filter_map(|exp| {
            let stored = entries
                .iter()
                .find(|e| e.insertion_seq == exp.insertion_seq)?;
            if stored.remaining == exp.remaining && stored.over_issued == exp.over_issued {
                return None;
            }
            Some(ChainDrift {
                insertion_seq: exp.insertion_seq,
                stored_remaining: stored.remaining,
                expected_remaining: exp.remaining,
                stored_over_issued: stored.over_issued,
                expected_over_issued: exp.over_issued,
            })
        })
        .collect()
}
