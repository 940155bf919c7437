//! Client core for the asset management console: query state, debounced
//! search, and last-request-wins fetching over a remote asset directory.

use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use shared::{
    domain::{AssetId, AssetState, CategoryId, SortField},
    error::FetchError,
    protocol::{AssetDetail, AssetListQuery, AssetPage, CategorySummary},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

pub mod debounce;
pub mod fetch;
pub mod navigation;
pub mod query;
pub mod session;

pub use debounce::Debouncer;
pub use fetch::{AssetDirectory, HttpAssetDirectory, REQUEST_TIMEOUT};
pub use navigation::{navigation_for, NavEntry};
pub use query::{QueryState, PAGE_SIZE};
pub use session::Session;

/// How long the search text must stay unchanged before it feeds a fetch.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(700);

/// Where the displayed result set stands relative to the derived query.
///
/// `Failed` keeps the previously loaded page visible (stale-but-valid); the
/// presentation layer uses the phase to tell an empty page from a loading
/// or failed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum BrowserEvent {
    PageLoaded {
        query: AssetListQuery,
        page: AssetPage,
    },
    FetchFailed {
        query: AssetListQuery,
        message: String,
    },
    SelectionChanged(Option<AssetId>),
}

/// Point-in-time view of the controller for rendering.
#[derive(Debug, Clone)]
pub struct BrowserSnapshot {
    pub query: QueryState,
    pub debounced_search: String,
    pub page: AssetPage,
    pub phase: LoadPhase,
    pub selected_asset: Option<AssetId>,
}

struct BrowserState {
    query: QueryState,
    debounced_search: String,
    last_issued: Option<AssetListQuery>,
    applied_seq: u64,
    page: AssetPage,
    phase: LoadPhase,
    selected_asset: Option<AssetId>,
    fetch_task: Option<JoinHandle<()>>,
}

/// The query-state controller for the asset list.
///
/// Owns pagination, search, filter, and sort state; derives the fetch
/// parameter tuple from it; and issues exactly one fetch per distinct tuple.
/// Overlapping in-flight fetches caused by rapid changes resolve by
/// last-request-wins: a completion only lands if no newer fetch has been
/// issued since, and the superseded task is aborted outright.
pub struct AssetBrowser {
    directory: Arc<dyn AssetDirectory>,
    inner: Mutex<BrowserState>,
    seq: AtomicU64,
    search_debounce: Debouncer<String>,
    events: broadcast::Sender<BrowserEvent>,
}

impl AssetBrowser {
    pub fn new(directory: Arc<dyn AssetDirectory>) -> Arc<Self> {
        Self::with_debounce(directory, SEARCH_DEBOUNCE)
    }

    pub fn with_debounce(directory: Arc<dyn AssetDirectory>, delay: Duration) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let search_debounce = Debouncer::new(String::new(), delay);
        let browser = Arc::new(Self {
            directory,
            inner: Mutex::new(BrowserState {
                query: QueryState::new(),
                debounced_search: String::new(),
                last_issued: None,
                applied_seq: 0,
                page: AssetPage::empty(),
                phase: LoadPhase::Idle,
                selected_asset: None,
                fetch_task: None,
            }),
            seq: AtomicU64::new(0),
            search_debounce,
            events,
        });
        browser.spawn_debounce_watcher();
        browser
    }

    fn spawn_debounce_watcher(self: &Arc<Self>) {
        let mut debounced = self.search_debounce.subscribe();
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while debounced.changed().await.is_ok() {
                let value = debounced.borrow_and_update().clone();
                let Some(browser) = weak.upgrade() else {
                    break;
                };
                browser.apply_debounced_search(value).await;
            }
        });
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<BrowserEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> BrowserSnapshot {
        let guard = self.inner.lock().await;
        BrowserSnapshot {
            query: guard.query.clone(),
            debounced_search: guard.debounced_search.clone(),
            page: guard.page.clone(),
            phase: guard.phase.clone(),
            selected_asset: guard.selected_asset,
        }
    }

    /// Jumps to a page of the current result set. Rejects page 0; no other
    /// query field is touched.
    pub async fn set_page(self: &Arc<Self>, page: u32) -> Result<(), FetchError> {
        if page == 0 {
            return Err(FetchError::Validation("page must be >= 1".into()));
        }
        {
            let mut guard = self.inner.lock().await;
            guard.query.set_page(page);
        }
        self.sync().await;
        Ok(())
    }

    /// Records new search text. The page resets to 1 immediately while the
    /// debounced value trails behind; the intermediate (old search, page 1)
    /// fetch this can issue is superseded by the post-debounce fetch under
    /// last-request-wins.
    pub async fn set_search(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        {
            let mut guard = self.inner.lock().await;
            guard.query.set_search(text.clone());
        }
        self.search_debounce.set(text);
        self.sync().await;
    }

    pub async fn set_selected_states(self: &Arc<Self>, states: BTreeSet<AssetState>) {
        {
            let mut guard = self.inner.lock().await;
            guard.query.set_selected_states(states);
        }
        self.sync().await;
    }

    pub async fn set_selected_category_ids(self: &Arc<Self>, category_ids: BTreeSet<CategoryId>) {
        {
            let mut guard = self.inner.lock().await;
            guard.query.set_selected_category_ids(category_ids);
        }
        self.sync().await;
    }

    pub async fn toggle_sort(self: &Arc<Self>, field: SortField) {
        {
            let mut guard = self.inner.lock().await;
            guard.query.toggle_sort(field);
        }
        self.sync().await;
    }

    /// Re-issues the current derived query even if it is unchanged.
    pub async fn refresh(self: &Arc<Self>) {
        {
            let mut guard = self.inner.lock().await;
            guard.last_issued = None;
        }
        self.sync().await;
    }

    /// Marks an asset as selected for detail viewing and resolves its
    /// detail record.
    pub async fn open_asset(&self, asset_id: AssetId) -> Result<AssetDetail, FetchError> {
        {
            let mut guard = self.inner.lock().await;
            guard.selected_asset = Some(asset_id);
        }
        let _ = self
            .events
            .send(BrowserEvent::SelectionChanged(Some(asset_id)));
        self.directory.get_asset(asset_id).await
    }

    /// Clears the pending selection when the detail dialog closes.
    pub async fn close_asset(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.selected_asset = None;
        }
        let _ = self.events.send(BrowserEvent::SelectionChanged(None));
    }

    /// All categories, for populating the category filter.
    pub async fn categories(&self) -> Result<Vec<CategorySummary>, FetchError> {
        self.directory.list_categories().await
    }

    async fn apply_debounced_search(self: &Arc<Self>, value: String) {
        {
            let mut guard = self.inner.lock().await;
            if guard.debounced_search == value {
                return;
            }
            guard.debounced_search = value;
        }
        self.sync().await;
    }

    /// Recomputes the derived query and issues a fetch iff the tuple
    /// changed since the last issued fetch.
    async fn sync(self: &Arc<Self>) {
        let (seq, query) = {
            let mut guard = self.inner.lock().await;
            let query = guard.query.to_list_query(&guard.debounced_search);
            if guard.last_issued.as_ref() == Some(&query) {
                return;
            }
            guard.last_issued = Some(query.clone());
            guard.phase = LoadPhase::Loading;
            if let Some(task) = guard.fetch_task.take() {
                task.abort();
            }
            let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, query)
        };

        debug!(
            page = query.page,
            search = %query.search,
            "issuing asset list fetch"
        );

        let browser = Arc::clone(self);
        let task_query = query.clone();
        let task = tokio::spawn(async move {
            let result = browser.directory.list_assets(&task_query).await;
            browser.apply_fetch_result(seq, task_query, result).await;
        });

        let mut guard = self.inner.lock().await;
        // The task may have been superseded while we were unlocked.
        if self.seq.load(Ordering::SeqCst) == seq {
            guard.fetch_task = Some(task);
        } else {
            task.abort();
        }
    }

    async fn apply_fetch_result(
        &self,
        seq: u64,
        query: AssetListQuery,
        result: Result<AssetPage, FetchError>,
    ) {
        let event = {
            let mut guard = self.inner.lock().await;
            // Last request wins: drop completions for superseded fetches.
            if seq < self.seq.load(Ordering::SeqCst) || seq <= guard.applied_seq {
                return;
            }
            guard.applied_seq = seq;
            match result {
                Ok(page) => {
                    guard.page = page.clone();
                    guard.phase = LoadPhase::Ready;
                    BrowserEvent::PageLoaded { query, page }
                }
                Err(err) => {
                    // Keep the stale page visible; only the phase flips.
                    let message = err.to_string();
                    guard.phase = LoadPhase::Failed(message.clone());
                    warn!(page = query.page, %message, "asset list fetch failed");
                    BrowserEvent::FetchFailed { query, message }
                }
            }
        };
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
