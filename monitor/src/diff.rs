//! Differencing of successive snapshots.
//!
//! Both functions build fresh collections and never mutate their inputs.

use std::collections::{BTreeSet, HashMap};

use crate::types::SessionRecord;

/// Returns the records in `current` that are not accounted for by `previous`.
///
/// Matching is one-for-one: each record in `previous` cancels at most one
/// equal record in `current`, earliest first. Two identical games logged
/// twice are therefore reported twice, but a record already seen is never
/// reported again. Order of `current` is preserved.
#[must_use]
pub fn new_records(previous: &[SessionRecord], current: &[SessionRecord]) -> Vec<SessionRecord> {
    let mut unmatched: HashMap<&SessionRecord, usize> = HashMap::with_capacity(previous.len());
    for record in previous {
        *unmatched.entry(record).or_insert(0) += 1;
    }

    current
        .iter()
        .filter(|record| match unmatched.get_mut(record) {
            Some(count) if *count > 0 => {
                *count -= 1;
                false
            }
            _ => true,
        })
        .cloned()
        .collect()
}

/// Returns the players present in `previous` but absent from `current`.
#[must_use]
pub fn finished_users(previous: &BTreeSet<String>, current: &BTreeSet<String>) -> Vec<String> {
    previous.difference(current).cloned().collect()
}
