//! Data-fetch driver for a single content page.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError, SearchResults, SurahDetail, SurahList, VerseDetail};
use crate::preferences::PreferenceStore;
use crate::view::fetch::{FetchIntent, FetchReducer, PageState};
use crate::view::mvi::Reducer;

/// Parameters of a page plus how to fetch its data.
pub trait ContentQuery: Clone + PartialEq + Send + Sync + 'static {
    type Output: Clone + PartialEq + Send + Sync + 'static;

    /// Shown when a failure carries no message of its own.
    const FAILURE_MESSAGE: &'static str;

    fn fetch<'a>(
        &'a self,
        api: &'a ApiClient,
        lang: &'a str,
    ) -> impl Future<Output = Result<Self::Output, ApiError>> + Send + 'a;
}

/// The surah index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurahListQuery;

impl ContentQuery for SurahListQuery {
    type Output = SurahList;
    const FAILURE_MESSAGE: &'static str = "Failed to load surahs";

    fn fetch<'a>(
        &'a self,
        api: &'a ApiClient,
        lang: &'a str,
    ) -> impl Future<Output = Result<SurahList, ApiError>> + Send + 'a {
        api.fetch_all_surahs(Some(lang))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurahQuery {
    pub surah: u16,
}

impl ContentQuery for SurahQuery {
    type Output = SurahDetail;
    const FAILURE_MESSAGE: &'static str = "Failed to load surah";

    fn fetch<'a>(
        &'a self,
        api: &'a ApiClient,
        lang: &'a str,
    ) -> impl Future<Output = Result<SurahDetail, ApiError>> + Send + 'a {
        api.fetch_surah(self.surah, Some(lang))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseQuery {
    pub surah: u16,
    pub verse: u32,
}

impl ContentQuery for VerseQuery {
    type Output = VerseDetail;
    const FAILURE_MESSAGE: &'static str = "Failed to load verse";

    fn fetch<'a>(
        &'a self,
        api: &'a ApiClient,
        lang: &'a str,
    ) -> impl Future<Output = Result<VerseDetail, ApiError>> + Send + 'a {
        api.fetch_verse(self.surah, self.verse, Some(lang))
    }
}

/// An already-validated, trimmed search string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
}

impl ContentQuery for SearchQuery {
    type Output = SearchResults;
    const FAILURE_MESSAGE: &'static str = "Search failed";

    fn fetch<'a>(
        &'a self,
        api: &'a ApiClient,
        lang: &'a str,
    ) -> impl Future<Output = Result<SearchResults, ApiError>> + Send + 'a {
        api.search(&self.text, Some(lang))
    }
}

/// Drives one page through loading / loaded / failed.
///
/// Every request gets a fresh generation; settles for anything but the
/// latest generation are dropped by the reducer. The `spawn_*` variants
/// additionally abort the previous in-flight task.
pub struct PageController<Q: ContentQuery> {
    api: Arc<ApiClient>,
    preferences: Arc<PreferenceStore>,
    state: watch::Sender<PageState<Q::Output>>,
    query: Mutex<Option<Q>>,
    next_generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<Q: ContentQuery> PageController<Q> {
    pub fn new(api: Arc<ApiClient>, preferences: Arc<PreferenceStore>) -> Self {
        let (state, _) = watch::channel(PageState::default());
        Self {
            api,
            preferences,
            state,
            query: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PageState<Q::Output> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState<Q::Output>> {
        self.state.subscribe()
    }

    /// Parameters of the most recent load.
    pub fn query(&self) -> Option<Q> {
        self.query.lock().clone()
    }

    /// Load `query` with the active language and wait for it to settle.
    pub async fn load(&self, query: Q) -> PageState<Q::Output> {
        *self.query.lock() = Some(query.clone());
        self.issue(query).await
    }

    /// Re-issue the last request. `None` when nothing was loaded yet.
    pub async fn retry(&self) -> Option<PageState<Q::Output>> {
        let query = self.query()?;
        Some(self.issue(query).await)
    }

    /// Like [`load`](Self::load) but in the background, aborting any
    /// request this controller still has in flight.
    pub fn spawn_load(self: &Arc<Self>, query: Q) {
        *self.query.lock() = Some(query.clone());
        let this = self.clone();
        self.replace_in_flight(tokio::spawn(async move {
            this.issue(query).await;
        }));
    }

    /// Background re-issue of the last request, if any.
    pub fn spawn_retry(self: &Arc<Self>) {
        if let Some(query) = self.query() {
            self.spawn_load(query);
        }
    }

    /// Re-issue the current request whenever the active language changes.
    ///
    /// The task stops once the controller is dropped; abort the handle to
    /// stop it earlier.
    pub fn follow_language(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.preferences.subscribe();
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(this) = weak.upgrade() else {
                    break;
                };
                tracing::debug!(language = %*changes.borrow(), "Reloading page for new language");
                this.spawn_retry();
            }
        })
    }

    fn replace_in_flight(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.in_flight.lock().replace(handle) {
            previous.abort();
        }
    }

    async fn issue(&self, query: Q) -> PageState<Q::Output> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let lang = self.preferences.language();

        self.apply(FetchIntent::Started { generation });

        let intent = match query.fetch(&self.api, &lang).await {
            Ok(data) => FetchIntent::Succeeded { generation, data },
            Err(err) => {
                let message = err.to_string();
                FetchIntent::Failed {
                    generation,
                    message: if message.trim().is_empty() {
                        Q::FAILURE_MESSAGE.to_string()
                    } else {
                        message
                    },
                }
            }
        };

        self.apply(intent);
        self.state()
    }

    fn apply(&self, intent: FetchIntent<Q::Output>) {
        self.state.send_if_modified(|state| {
            let next = <FetchReducer<Q::Output> as Reducer>::reduce(state.clone(), intent);
            if next == *state {
                return false;
            }
            *state = next;
            true
        });
    }
}

impl<Q: ContentQuery> Drop for PageController<Q> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.lock().take() {
            handle.abort();
        }
    }
}
