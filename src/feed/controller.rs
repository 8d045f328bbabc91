use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::trigger;
use super::{FeedSnapshot, FeedStatus, FetchError, ListingSource, PageRequest};
use crate::config::FeedConfig;
use crate::listing::{Listing, ListingCriteria};

struct FeedState {
    criteria: ListingCriteria,
    items: Vec<Listing>,
    seen: HashSet<String>,
    page: usize,
    has_more: bool,
    is_loading_more: bool,
    error: Option<String>,
    /// Bumped by every `initialize`; a fetch only lands if it still matches.
    generation: u64,
}

impl FeedState {
    fn seeded(items: Vec<Listing>, criteria: ListingCriteria, generation: u64) -> Self {
        let mut state = FeedState {
            criteria,
            items: Vec::with_capacity(items.len()),
            seen: HashSet::new(),
            page: 1,
            has_more: true,
            is_loading_more: false,
            error: None,
            generation,
        };
        state.append(items);
        state
    }

    fn append(&mut self, items: Vec<Listing>) {
        for item in items {
            if self.seen.insert(item.id.clone()) {
                self.items.push(item);
            } else {
                log::debug!("skipping duplicate listing {}", item.id);
            }
        }
    }

    fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            page: self.page,
            is_loading_more: self.is_loading_more,
            has_more: self.has_more,
            error: self.error.clone(),
        }
    }
}

pub(super) struct Shared<S> {
    source: S,
    config: FeedConfig,
    state: Mutex<FeedState>,
    updates: watch::Sender<FeedSnapshot>,
}

impl<S: ListingSource> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        // FeedState has no invariant a panic mid-update could break badly
        // enough to justify taking the whole feed down.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &FeedState) {
        self.updates.send_replace(state.snapshot());
    }

    /// Whether an auto-trigger should start a load right now.
    pub(super) fn ready_for_auto_load(&self) -> bool {
        let state = self.lock();
        state.has_more && !state.is_loading_more && state.error.is_none()
    }

    pub(super) async fn load_more(&self) {
        let (request, generation) = {
            let mut state = self.lock();
            if state.is_loading_more {
                log::debug!("load_more ignored: page {} in flight", state.page + 1);
                return;
            }
            if !state.has_more {
                log::debug!("load_more ignored: feed exhausted at page {}", state.page);
                return;
            }
            state.is_loading_more = true;
            state.error = None;
            self.publish(&state);

            let request = PageRequest {
                criteria: state.criteria.clone(),
                page: state.page + 1,
                page_size: self.config.page_size,
            };
            (request, state.generation)
        };

        let page = request.page;
        let mut in_flight = InFlight {
            shared: self,
            generation,
            settled: false,
        };

        let timeout = self.config.fetch_timeout;
        let outcome = match tokio::time::timeout(timeout, self.source.fetch_page(request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(timeout)),
        };
        in_flight.settled = true;

        let mut state = self.lock();
        if state.generation != generation {
            log::debug!("discarding page {} fetched for replaced criteria", page);
            return;
        }

        match outcome {
            Ok(items) => {
                let fetched = items.len();
                state.append(items);
                state.page = page;
                if fetched < self.config.page_size {
                    state.has_more = false;
                }
                log::info!(
                    "loaded page {} ({} listings, {} total)",
                    page,
                    fetched,
                    state.items.len()
                );
            }
            Err(e) => {
                log::warn!("failed to load page {}: {}", page, e);
                state.error = Some(e.user_message());
            }
        }
        state.is_loading_more = false;
        self.publish(&state);
    }
}

// Clears the loading flag if a load is dropped before its fetch settles
// (caller cancelled, or the auto-trigger task was aborted).
struct InFlight<'a, S: ListingSource> {
    shared: &'a Shared<S>,
    generation: u64,
    settled: bool,
}

impl<S: ListingSource> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.shared.lock();
        if state.generation == self.generation && state.is_loading_more {
            log::debug!("page {} load cancelled", state.page + 1);
            state.is_loading_more = false;
            self.shared.publish(&state);
        }
    }
}

/// Infinite-scroll controller over one listing view.
///
/// Must be used from within a tokio runtime when an auto-trigger is registered.
pub struct ListingFeed<S> {
    shared: Arc<Shared<S>>,
    trigger: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ListingSource + 'static> ListingFeed<S> {
    /// Create a feed seeded with the first page, already rendered for `criteria`.
    pub fn new(
        source: S,
        config: FeedConfig,
        initial_items: Vec<Listing>,
        criteria: ListingCriteria,
    ) -> Self {
        let state = FeedState::seeded(initial_items, criteria, 0);
        let (updates, _) = watch::channel(state.snapshot());
        ListingFeed {
            shared: Arc::new(Shared {
                source,
                config,
                state: Mutex::new(state),
                updates,
            }),
            trigger: Mutex::new(None),
        }
    }

    /// Start over for new criteria. Accumulated items are discarded and any
    /// page still in flight will be ignored when it arrives.
    pub fn initialize(&self, initial_items: Vec<Listing>, criteria: ListingCriteria) {
        let mut state = self.shared.lock();
        if state.is_loading_more {
            log::debug!("criteria changed while page {} in flight", state.page + 1);
        }
        let generation = state.generation + 1;
        *state = FeedState::seeded(initial_items, criteria, generation);
        self.shared.publish(&state);
    }

    /// Fetch the next page unless one is already loading or the feed is
    /// exhausted. Failures end up in the snapshot's `error`, never here.
    pub async fn load_more(&self) {
        self.shared.load_more().await;
    }

    pub async fn retry(&self) {
        {
            let mut state = self.shared.lock();
            state.error = None;
            self.shared.publish(&state);
        }
        self.shared.load_more().await;
    }

    /// Load the next page whenever `visibility` turns true (the sentinel below
    /// the last item scrolled into view). Replaces any previous registration.
    pub fn register_auto_trigger(&self, visibility: watch::Receiver<bool>) {
        let handle = tokio::spawn(trigger::watch_visibility(
            Arc::clone(&self.shared),
            visibility,
        ));
        if let Some(previous) = self.trigger_slot().replace(handle) {
            previous.abort();
        }
    }

    pub fn unregister_auto_trigger(&self) {
        if let Some(handle) = self.trigger_slot().take() {
            handle.abort();
        }
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.shared.lock().snapshot()
    }

    pub fn status(&self) -> FeedStatus {
        self.snapshot().status()
    }

    pub fn criteria(&self) -> ListingCriteria {
        self.shared.lock().criteria.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.shared.updates.subscribe()
    }
}

impl<S> ListingFeed<S> {
    fn trigger_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.trigger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for ListingFeed<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.trigger_slot().take() {
            handle.abort();
        }
    }
}
