use std::fmt::Write;

use itertools::Itertools;

use crate::Item;

/// Generates a core list string that [`parse()`][crate::parse] recognizes.
///
/// The input is deduplicated and sorted before emission, so the output is a normalized
/// rendering of the set of integers rather than of the exact input sequence. Consecutive
/// runs of three or more integers are coalesced into ranges.
#[must_use]
pub fn emit(items: impl IntoIterator<Item = impl Into<Item>>) -> String {
    let sorted = items
        .into_iter()
        .map(Into::into)
        .sorted_unstable()
        .dedup()
        .collect::<Vec<_>>();

    // Consecutive runs, each as (start, inclusive end).
    let mut runs: Vec<(Item, Item)> = Vec::new();

    for value in sorted {
        match runs.last_mut() {
            Some((_, end)) if value.checked_sub(1) == Some(*end) => *end = value,
            _ => runs.push((value, value)),
        }
    }

    let mut result = String::new();

    for (start, end) in runs {
        if !result.is_empty() {
            result.push(',');
        }

        if start == end {
            write!(result, "{start}").expect("writing to a String cannot fail");
        } else if end == start + 1 {
            // A two-item run reads better as "5,6" than as "5-6".
            write!(result, "{start},{end}").expect("writing to a String cannot fail");
        } else {
            write!(result, "{start}-{end}").expect("writing to a String cannot fail");
        }
    }

    result
}
