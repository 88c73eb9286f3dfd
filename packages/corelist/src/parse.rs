use crate::Item;

/// Outcome of parsing a core list string.
///
/// Parsing is best-effort, so the outcome carries both the integers that were recognized
/// and the number of malformed items that had to be skipped to produce them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Parsed {
    values: Vec<Item>,
    skipped: usize,
}

impl Parsed {
    /// The integers named by the input, in the order they appeared.
    ///
    /// Duplicates arising from overlapping items are preserved.
    #[must_use]
    pub fn values(&self) -> &[Item] {
        &self.values
    }

    /// Consumes the outcome, returning the integers named by the input.
    #[must_use]
    pub fn into_values(self) -> Vec<Item> {
        self.values
    }

    /// How many non-empty items were skipped because they could not be parsed.
    ///
    /// Empty items (e.g. from a stray comma or an all-whitespace input) are ignored
    /// without being counted.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Parses a [core list][crate] string, skipping malformed items instead of failing.
///
/// An empty or all-whitespace string is valid input and returns an empty result.
///
/// See [package-level documentation][crate] for details.
#[must_use]
pub fn parse(text: &str) -> Parsed {
    let mut parsed = Parsed::default();

    for item in text.split(',') {
        let item = item.trim();

        if item.is_empty() {
            continue;
        }

        if parse_item(item, &mut parsed.values).is_none() {
            parsed.skipped = parsed.skipped.saturating_add(1);
        }
    }

    parsed
}

fn parse_item(item: &str, values: &mut Vec<Item>) -> Option<()> {
    if !item.contains('-') {
        values.push(item.parse::<Item>().ok()?);
        return Some(());
    }

    // An inclusive range. Anything other than exactly two non-empty endpoints
    // (e.g. "3-", "-3" or "1-2-3") is malformed.
    let mut endpoints = item.split('-').map(str::trim).filter(|part| !part.is_empty());

    let start = endpoints.next()?.parse::<Item>().ok()?;
    let end = endpoints.next()?.parse::<Item>().ok()?;

    if endpoints.next().is_some() {
        return None;
    }

    // An inverted range (e.g. "5-2") names no integers. It is not treated as
    // malformed, matching the kernel's own tolerance for such inputs.
    values.extend(start..=end);

    Some(())
}
