pub mod highlight;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::config::FeedConfig;
use crate::error::AppError;
use crate::listing::{Listing, ListingCriteria};
use crate::store::Store;
use highlight::{find_highlights, HighlightRange};

const DEFAULT_LIMIT: usize = 8;

/// A single quick-search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub listing: Listing,
    /// Matches of the query within `listing.name`.
    pub highlights: Vec<HighlightRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<SearchItem>,
    pub has_more: bool,
}

impl SearchResult {
    fn empty() -> Self {
        SearchResult {
            items: vec![],
            has_more: false,
        }
    }
}

/// Whether `query` is long enough to be worth sending, counted in grapheme
/// clusters after trimming.
pub fn meets_minimum_length(query: &str, min_chars: usize) -> bool {
    query.trim().graphemes(true).count() >= min_chars
}

/// Quick search over approved listings (search-as-you-type).
pub fn search(
    store: &Store,
    query: &str,
    limit: Option<usize>,
    config: &FeedConfig,
) -> Result<SearchResult, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let query_trimmed = query.trim();

    if query_trimmed.is_empty() || !meets_minimum_length(query_trimmed, config.min_query_chars) {
        log::debug!("skipping search for short query {:?}", query_trimmed);
        return Ok(SearchResult::empty());
    }

    let criteria = ListingCriteria::all().with_search_term(query_trimmed);

    // Fetch limit+1 to detect if there's more
    let mut listings = store.list_listings_range(&criteria, 0, limit + 1)?;
    let has_more = listings.len() > limit;
    listings.truncate(limit);

    let items = listings
        .into_iter()
        .map(|listing| {
            let highlights = find_highlights(&listing.name, query_trimmed);
            SearchItem {
                listing,
                highlights,
            }
        })
        .collect();

    Ok(SearchResult { items, has_more })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::product::fixtures::{product, seed_approved, vendor};

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn test_minimum_length_counts_graphemes() {
        assert!(!meets_minimum_length("a", 2));
        assert!(!meets_minimum_length("  a  ", 2));
        assert!(meets_minimum_length("ab", 2));
        // one grapheme made of two code points
        assert!(!meets_minimum_length("e\u{301}", 2));
        assert!(meets_minimum_length("한국", 2));
    }

    #[test]
    fn test_short_query_skips_store() {
        let store = test_store();
        seed_approved(&store, "catering", 3);
        let result = search(&store, "p", None, &FeedConfig::default()).unwrap();
        assert!(result.items.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn test_empty_query_with_no_minimum() {
        let store = test_store();
        seed_approved(&store, "catering", 3);
        let config = FeedConfig {
            min_query_chars: 0,
            ..FeedConfig::default()
        };
        assert!(search(&store, "   ", None, &config)
            .unwrap()
            .items
            .is_empty());
    }

    #[test]
    fn test_search_with_highlights() {
        let store = test_store();
        vendor(&store, "v-1");
        store
            .insert_product(&product("p-1", "v-1", "Paket Gedung Melati", "venue", 2))
            .unwrap();
        store
            .insert_product(&product("p-2", "v-1", "Katering Prasmanan", "catering", 1))
            .unwrap();

        let result = search(&store, " gedung ", None, &FeedConfig::default()).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].listing.id, "p-1");
        assert_eq!(
            result.items[0].highlights,
            vec![HighlightRange { start: 6, end: 12 }]
        );
    }

    #[test]
    fn test_non_ascii_match_agrees_with_highlights() {
        let store = test_store();
        vendor(&store, "v-1");
        store
            .insert_product(&product("p-1", "v-1", "ÉLÉGANCE Décor", "decoration", 1))
            .unwrap();

        let result = search(&store, "élégance", None, &FeedConfig::default()).unwrap();
        assert_eq!(result.items.len(), 1);
        assert_eq!(
            result.items[0].highlights,
            vec![HighlightRange { start: 0, end: 10 }]
        );
    }

    #[test]
    fn test_search_has_more() {
        let store = test_store();
        seed_approved(&store, "catering", 5);

        let page = search(&store, "paket", Some(3), &FeedConfig::default()).unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.has_more);

        let all = search(&store, "paket", Some(5), &FeedConfig::default()).unwrap();
        assert_eq!(all.items.len(), 5);
        assert!(!all.has_more);
    }

    #[test]
    fn test_match_outside_name_has_no_highlights() {
        let store = test_store();
        seed_approved(&store, "catering", 1);
        let result = search(&store, "jakarta", None, &FeedConfig::default()).unwrap();
        assert_eq!(result.items.len(), 1);
        assert!(result.items[0].highlights.is_empty());
    }
}
