//! Numeric-priority ordering for file names.
//!
//! Names starting with a run of decimal digits sort by that number first
//! ("2-intro" before "10-outro"); names without one sort after every numbered
//! name. Ties fall back to a case-insensitive, locale-aware collation of the
//! full name, so "éclair" sorts with the other e's rather than after "z".

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};

use super::model::MediaItem;

/// Return the leading run of ASCII digits in `name`, if any.
pub fn leading_digits(name: &str) -> Option<&str> {
    let end = name
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(name.len());
    (end > 0).then(|| &name[..end])
}

/// Parse the leading number of `name`, when it fits in a `u64`.
pub fn leading_number(name: &str) -> Option<u64> {
    leading_digits(name).and_then(|d| d.parse().ok())
}

/// Compare two digit runs by numeric value without parsing them.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

thread_local! {
    /// Root-locale collator at secondary strength: accents count, case does not.
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(&Default::default(), options).ok()
    };
}

fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(c) => c.compare(a, b),
        // Only reachable if the compiled collation data fails to load.
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    })
}

/// Total order used for playlists.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let by_number = match (leading_digits(a), leading_digits(b)) {
        (Some(da), Some(db)) => compare_digit_runs(da, db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_number.then_with(|| collate(a, b))
}

/// Sort `items` in place. Stable: names that compare equal keep their order.
pub fn sort_items(items: &mut [MediaItem]) {
    items.sort_by(|a, b| compare_names(&a.name, &b.name));
}
