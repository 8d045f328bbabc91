use serde::{Deserialize, Serialize};

/// Price range of a vendor's product, e.g. "from 5,000,000 to 12,000,000 per package".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub unit: Option<String>,
}

/// A vendor's product as shown to end-users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub location: String,
    pub price: Option<PriceRange>,
    pub thumbnail: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
}

/// One page of listings, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    pub items: Vec<Listing>,
    pub page: usize,
    pub is_last_page: bool,
}

/// Filter key for a listing view. A change in either field starts a new feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingCriteria {
    pub category: Option<String>,
    pub search_term: Option<String>,
}

impl ListingCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// The search term with surrounding whitespace removed, if anything remains.
    pub fn normalized_search_term(&self) -> Option<&str> {
        self.search_term
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The category, ignoring blank values.
    pub fn normalized_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}
