//! Search input policy: minimum length, debounce, explicit submit.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::ViewConfig;
use crate::view::page::{PageController, SearchQuery};

/// Owns at most one pending debounced search for a search page.
pub struct SearchController {
    page: Arc<PageController<SearchQuery>>,
    debounce: Duration,
    min_chars: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchController {
    pub fn new(page: Arc<PageController<SearchQuery>>, debounce: Duration, min_chars: usize) -> Self {
        Self {
            page,
            debounce,
            min_chars,
            pending: Mutex::new(None),
        }
    }

    pub fn from_config(page: Arc<PageController<SearchQuery>>, config: &ViewConfig) -> Self {
        Self::new(
            page,
            Duration::from_millis(config.search_debounce_ms),
            config.min_search_chars,
        )
    }

    pub fn page(&self) -> &Arc<PageController<SearchQuery>> {
        &self.page
    }

    /// Trimmed query when it is long enough to send.
    pub fn searchable(&self, text: &str) -> Option<SearchQuery> {
        let trimmed = text.trim();
        (trimmed.chars().count() >= self.min_chars).then(|| SearchQuery {
            text: trimmed.to_string(),
        })
    }

    /// The input changed. Replaces any pending search; schedules a new one
    /// after the debounce window when the text is long enough.
    pub fn input(&self, text: &str) {
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let Some(query) = self.searchable(text) else {
            return;
        };

        let page = self.page.clone();
        let debounce = self.debounce;
        // The task owns only the timer; the request itself belongs to the
        // page so that cancelling here never strands it mid-flight.
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            page.spawn_load(query);
        }));
    }

    /// Explicit submit: skips the debounce. Returns whether a request was issued.
    pub async fn submit(&self, text: &str) -> bool {
        self.cancel_pending();
        match self.searchable(text) {
            Some(query) => {
                self.page.load(query).await;
                true
            }
            None => false,
        }
    }

    /// The input was cleared. Drops the pending timer without issuing a
    /// search; a request already sent still settles.
    pub fn clear(&self) {
        self.cancel_pending();
    }

    /// True while a debounce timer has not fired yet.
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_pending(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
