use std::future::Future;
use std::sync::{Arc, Mutex};

use super::{FetchError, ListingSource, PageRequest};
use crate::listing::Listing;
use crate::store::Store;

/// Pages served straight from the local store.
#[derive(Clone)]
pub struct StoreSource {
    store: Arc<Mutex<Store>>,
}

impl StoreSource {
    pub fn new(store: Arc<Mutex<Store>>) -> Self {
        StoreSource { store }
    }
}

impl ListingSource for StoreSource {
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Vec<Listing>, FetchError>> + Send {
        let store = Arc::clone(&self.store);
        async move {
            // SQLite calls block; keep them off the runtime's worker threads.
            tokio::task::spawn_blocking(move || -> Result<Vec<Listing>, FetchError> {
                let store = store
                    .lock()
                    .map_err(|e| FetchError::Service(e.to_string()))?;
                let items =
                    store.list_listings(&request.criteria, request.page, request.page_size)?;
                Ok(items)
            })
            .await
            .map_err(|e| FetchError::Service(e.to_string()))?
        }
    }
}
