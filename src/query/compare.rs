//! Value comparison used by column sorting and totals.

use std::cmp::Ordering;

/// Parse a cell as a decimal number.
///
/// Surrounding whitespace is ignored. Anything else that is not a plain
/// decimal or exponent literal (currency symbols, thousands separators,
/// trailing units) is not a number. Non-finite results are rejected so that
/// `"NaN"` and `"inf"` stay textual.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compare two cells: numerically when both parse, textually otherwise.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => locale_compare(a, b),
    }
}

/// Collation-style string comparison.
///
/// Primary level: whitespace and punctuation sort before digits, digits
/// before letters, letters compare case-insensitively. Ties are broken
/// case-sensitively with lowercase before uppercase, then by code point.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    primary_keys(a)
        .cmp(primary_keys(b))
        .then_with(|| tertiary(a, b))
        .then_with(|| a.cmp(b))
}

fn primary_keys(s: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    s.chars()
        .flat_map(|c| c.to_lowercase())
        .map(|c| (char_class(c), c))
}

fn char_class(c: char) -> u8 {
    if c.is_whitespace() || c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_control()) {
        0
    } else if c.is_numeric() {
        1
    } else {
        2
    }
}

fn tertiary(a: &str, b: &str) -> Ordering {
    a.chars()
        .zip(b.chars())
        .find(|(x, y)| x != y)
        .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) if y.is_uppercase() => Ordering::Less,
            (false, true) if x.is_uppercase() => Ordering::Greater,
            _ => Ordering::Equal,
        })
        .unwrap_or(Ordering::Equal)
}

/// Stable top-down merge sort that only asks `compare` for pairwise answers.
///
/// `compare_values` is not transitive across mixed numeric and textual cells
/// (`"9" < "10"`, `"10" < "1a"`, `"1a" < "9"`), and `slice::sort_by` may
/// panic on such comparators. Here an inconsistent answer only affects the
/// resulting order. On ties the element from the left run is kept first.
pub(crate) fn merge_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => compare(b, a) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}
