use std::sync::Arc;

use tokio::sync::watch;

use super::controller::Shared;
use super::ListingSource;

/// Runs until the visibility sender goes away or the task is aborted.
/// Loads once per hidden -> visible edge; a sentinel that is already visible
/// when registered counts as an edge.
pub(super) async fn watch_visibility<S: ListingSource>(
    shared: Arc<Shared<S>>,
    mut visibility: watch::Receiver<bool>,
) {
    let mut was_visible = false;
    loop {
        let visible = *visibility.borrow_and_update();
        if visible && !was_visible {
            if shared.ready_for_auto_load() {
                shared.load_more().await;
            } else {
                log::debug!("sentinel visible but feed is loading, exhausted or errored");
            }
        }
        was_visible = visible;

        if visibility.changed().await.is_err() {
            log::debug!("visibility signal closed; auto-trigger stopped");
            break;
        }
    }
}
