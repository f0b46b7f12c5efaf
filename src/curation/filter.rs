//! Item filtering against resolved ruleset constraints.

use crate::catalog::CatalogItem;
use crate::ruleset::{resolve_window, Ruleset};
use std::collections::HashSet;

/// Apply a ruleset's criteria to a list of items.
///
/// A missing ruleset or an empty input passes through unchanged. When either
/// resolved year bound is active, items without a parseable release year are
/// dropped. When a genre filter is active, an item is kept only if one of the
/// filter genres case-insensitively matches (substring or equality) one of
/// the genres across the item's artists. Order is preserved.
pub fn filter_items(
    items: Vec<CatalogItem>,
    ruleset: Option<&Ruleset>,
    current_year: i32,
) -> Vec<CatalogItem> {
    let ruleset = match ruleset {
        Some(ruleset) => ruleset,
        None => return items,
    };
    if items.is_empty() {
        return items;
    }

    let window = resolve_window(&ruleset.criteria, current_year);
    let genre_filter: Vec<String> = ruleset
        .criteria
        .genre_filter
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|g| g.to_lowercase())
        .collect();

    items
        .into_iter()
        .filter(|item| {
            if !window.is_unbounded() {
                match item.release_year() {
                    Some(year) if window.contains(year) => {}
                    _ => return false,
                }
            }

            if !genre_filter.is_empty() {
                let item_genres: Vec<String> =
                    item.genres().iter().map(|g| g.to_lowercase()).collect();
                let matches = genre_filter.iter().any(|wanted| {
                    item_genres
                        .iter()
                        .any(|genre| genre.contains(wanted.as_str()))
                });
                if !matches {
                    return false;
                }
            }

            true
        })
        .collect()
}

/// Drop later duplicates, keyed by item URI, keeping first occurrences in
/// order.
pub fn dedupe_by_uri(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.uri()))
        .collect()
}
