//! Infinite-scroll listing feed.
//!
//! A [`ListingFeed`] starts from a page rendered elsewhere (usually the server's
//! first load) and grows by fetching further pages from an injected
//! [`ListingSource`]. At most one fetch is in flight per feed; results that
//! arrive after the criteria changed are dropped.

mod controller;
pub mod source;
mod trigger;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Serialize;

use crate::error::AppError;
use crate::listing::{Listing, ListingCriteria};

pub use controller::ListingFeed;
pub use source::StoreSource;

/// What the feed asks its source for: page `page` (1-indexed) of `page_size`
/// listings matching `criteria`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub criteria: ListingCriteria,
    pub page: usize,
    pub page_size: usize,
}

/// Supplies pages to a feed. Implementations must return at most `page_size`
/// listings ordered the same way as the initial page.
pub trait ListingSource: Send + Sync {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<Listing>, FetchError>> + Send;
}

#[derive(Debug)]
pub enum FetchError {
    Timeout(Duration),
    Service(String),
}

impl FetchError {
    /// Message shown next to the retry button.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Timeout(_) => {
                "Loading more listings took too long. Please try again.".to_string()
            }
            FetchError::Service(_) => "Failed to load more listings. Please try again.".to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(d) => write!(f, "fetch timed out after {:?}", d),
            FetchError::Service(e) => write!(f, "fetch failed: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<AppError> for FetchError {
    fn from(e: AppError) -> Self {
        FetchError::Service(e.to_string())
    }
}

impl From<sqlite::Error> for FetchError {
    fn from(e: sqlite::Error) -> Self {
        FetchError::Service(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Idle,
    Loading,
    Exhausted,
    Errored,
}

/// Read-only view of the feed handed to the view layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub items: Vec<Listing>,
    pub page: usize,
    pub is_loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
}

impl FeedSnapshot {
    pub fn status(&self) -> FeedStatus {
        if self.is_loading_more {
            FeedStatus::Loading
        } else if self.error.is_some() {
            FeedStatus::Errored
        } else if !self.has_more {
            FeedStatus::Exhausted
        } else {
            FeedStatus::Idle
        }
    }
}
