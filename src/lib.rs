//! Listing core of a wedding-vendor marketplace: injection-safe search filters,
//! an infinite-scroll listing feed, and the embedded store behind them.

pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod listing;
pub mod logging;
pub mod search;
pub mod store;

pub use config::FeedConfig;
pub use error::AppError;
pub use feed::{FeedSnapshot, FeedStatus, FetchError, ListingFeed, ListingSource, PageRequest};
pub use filter::{build_safe_filter_expression, SearchableField};
pub use listing::{Listing, ListingCriteria, ListingPage};
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::StoreSource;
    use crate::store::product::fixtures::seed_approved;
    use std::sync::{Arc, Mutex};

    // Server renders page 1, the client feed pulls the rest from the same store.
    #[tokio::test]
    async fn test_feed_over_store_end_to_end() {
        let store = Store::open_in_memory().unwrap();
        seed_approved(&store, "catering", 30);
        store.set_setting("feed.page_size", "12").unwrap();
        let config = FeedConfig::load(&store).unwrap();

        let criteria = ListingCriteria::all().with_category("catering");
        let first = store
            .listing_page(&criteria, 1, config.page_size)
            .unwrap();
        assert!(!first.is_last_page);

        let store = Arc::new(Mutex::new(store));
        let feed = ListingFeed::new(
            StoreSource::new(Arc::clone(&store)),
            config,
            first.items,
            criteria,
        );

        feed.load_more().await;
        feed.load_more().await;
        let snap = feed.snapshot();
        assert_eq!(snap.items.len(), 30);
        assert_eq!(snap.page, 3);
        assert!(!snap.has_more);
        assert_eq!(snap.items[0].id, "p-029");
        assert_eq!(snap.items[29].id, "p-000");

        feed.initialize(vec![], ListingCriteria::all().with_search_term("zzz"));
        feed.load_more().await;
        let empty = feed.snapshot();
        assert!(empty.items.is_empty());
        assert_eq!(feed.status(), FeedStatus::Exhausted);
    }
}
