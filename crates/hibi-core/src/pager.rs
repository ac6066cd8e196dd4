//! Pagination controller: turns paged store reads into successive
//! `GroupedList` snapshots.
//!
//! At most one load is in flight per pager. `load_first_page` supersedes an
//! outstanding load via a generation counter (the superseded worker's
//! publishes are dropped, never surfaced as errors); `load_next_page` and
//! `refresh` are instead guarded — a call arriving while a load is
//! outstanding is dropped, not queued. The list and its total count are
//! published together as one unit, in order, through a single-writer holder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::group::GroupedList;
use crate::model::{Dated, ListEntry, SearchRow};
use crate::store::{DiaryStore, StoreError};

/// One page-oriented query shape against the diary store: either the full
/// diary list or the rows matching a search word.
pub trait PageSource: Send + Sync + 'static {
    type Row: Dated + Clone + PartialEq + Send + Sync + 'static;

    fn count(&self) -> Result<usize, StoreError>;
    fn page(
        &self,
        limit: usize,
        offset: usize,
        anchor: Option<NaiveDate>,
    ) -> Result<Vec<Self::Row>, StoreError>;
}

/// The plain diary list.
pub struct AllEntries {
    store: Arc<dyn DiaryStore>,
}

impl AllEntries {
    pub fn new(store: Arc<dyn DiaryStore>) -> Self {
        AllEntries { store }
    }
}

impl PageSource for AllEntries {
    type Row = ListEntry;

    fn count(&self) -> Result<usize, StoreError> {
        self.store.count_all()
    }

    fn page(
        &self,
        limit: usize,
        offset: usize,
        anchor: Option<NaiveDate>,
    ) -> Result<Vec<ListEntry>, StoreError> {
        self.store.select_page(limit, offset, anchor)
    }
}

/// Rows matching one search word, with match spans extracted.
pub struct SearchQuery {
    store: Arc<dyn DiaryStore>,
    word: String,
}

impl SearchQuery {
    pub fn new(store: Arc<dyn DiaryStore>, word: impl Into<String>) -> Self {
        SearchQuery {
            store,
            word: word.into(),
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }
}

impl PageSource for SearchQuery {
    type Row = SearchRow;

    fn count(&self) -> Result<usize, StoreError> {
        self.store.count_matching(&self.word)
    }

    // The anchor applies to the plain list only; a search refresh re-runs
    // the word query from the top.
    fn page(
        &self,
        limit: usize,
        offset: usize,
        _anchor: Option<NaiveDate>,
    ) -> Result<Vec<SearchRow>, StoreError> {
        let hits = self.store.select_search_page(limit, offset, &self.word)?;
        Ok(hits
            .iter()
            .map(|hit| SearchRow::from_hit(hit, &self.word))
            .collect())
    }
}

/// The list and its total-matching count, published together as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<R> {
    pub list: GroupedList<R>,
    pub total_matching: usize,
}

impl<R> Default for ListState<R> {
    fn default() -> Self {
        ListState {
            list: GroupedList::default(),
            total_matching: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PagerEvent<R> {
    /// A new consistent snapshot.
    State(ListState<R>),
    /// A load failed; the last published snapshot still stands.
    Failure(StoreError),
}

type Listener<R> = Box<dyn Fn(&PagerEvent<R>) + Send>;

/// Single-writer state holder. Value, generation, and listener delivery all
/// live under one lock so subscribers observe snapshots in publication order
/// and a superseded worker can never slip a publish in.
struct StateHolder<R> {
    inner: Mutex<HolderInner<R>>,
}

struct HolderInner<R> {
    latest: ListState<R>,
    generation: u64,
    listeners: Vec<Listener<R>>,
}

impl<R: Clone> StateHolder<R> {
    fn new() -> Self {
        StateHolder {
            inner: Mutex::new(HolderInner {
                latest: ListState::default(),
                generation: 0,
                listeners: Vec::new(),
            }),
        }
    }

    fn subscribe(&self, listener: Listener<R>) {
        self.inner.lock().expect("poisoned").listeners.push(listener);
    }

    fn latest(&self) -> ListState<R> {
        self.inner.lock().expect("poisoned").latest.clone()
    }

    fn generation(&self) -> u64 {
        self.inner.lock().expect("poisoned").generation
    }

    fn bump_generation(&self) -> u64 {
        let mut inner = self.inner.lock().expect("poisoned");
        inner.generation += 1;
        inner.generation
    }

    /// Publishes unless `generation` has been superseded. Returns whether the
    /// event went out.
    fn publish_state(&self, generation: u64, state: ListState<R>) -> bool {
        let mut inner = self.inner.lock().expect("poisoned");
        if inner.generation != generation {
            return false;
        }
        inner.latest = state.clone();
        let event = PagerEvent::State(state);
        for listener in &inner.listeners {
            listener(&event);
        }
        true
    }

    fn publish_failure(&self, generation: u64, err: StoreError) -> bool {
        let inner = self.inner.lock().expect("poisoned");
        if inner.generation != generation {
            return false;
        }
        let event = PagerEvent::Failure(err);
        for listener in &inner.listeners {
            listener(&event);
        }
        true
    }
}

/// Orchestrates first-page / next-page / refresh loads for one screen or one
/// search query. Store reads run on a worker thread; the total count is
/// re-queried on every load so concurrent inserts and deletes move the
/// "more remains" determination instead of going stale.
pub struct Pager<Q: PageSource> {
    source: Arc<Q>,
    page_size: usize,
    state: Arc<StateHolder<Q::Row>>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
    refreshing: Arc<AtomicBool>,
}

pub type DiaryListPager = Pager<AllEntries>;
pub type SearchPager = Pager<SearchQuery>;

impl<Q: PageSource> Pager<Q> {
    pub fn new(source: Q, page_size: usize) -> Self {
        assert!(page_size >= 1, "page size must be at least 1");
        Pager {
            source: Arc::new(source),
            page_size,
            state: Arc::new(StateHolder::new()),
            in_flight: Mutex::new(None),
            refreshing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Registers an observer for every subsequent event. Listeners run on the
    /// publishing thread while the state lock is held; they must not call
    /// back into the pager.
    pub fn subscribe(&self, listener: impl Fn(&PagerEvent<Q::Row>) + Send + 'static) {
        self.state.subscribe(Box::new(listener));
    }

    /// Last published snapshot.
    pub fn current(&self) -> ListState<Q::Row> {
        self.state.latest()
    }

    /// True iff no load is outstanding.
    pub fn can_load_more(&self) -> bool {
        let guard = self.in_flight.lock().expect("poisoned");
        guard.as_ref().map_or(true, |h| h.is_finished())
    }

    pub fn is_loading(&self) -> bool {
        !self.can_load_more()
    }

    /// True while a `refresh` worker is running; the UI shows a non-blocking
    /// updating indicator instead of the full spinner.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Blocks until the outstanding load, if any, has completed and
    /// published. Used by synchronous hosts and tests.
    pub fn wait_idle(&self) {
        let handle = self.in_flight.lock().expect("poisoned").take();
        if let Some(h) = handle {
            let _ = h.join();
        }
    }

    /// Loads the first page, superseding any outstanding load. A placeholder
    /// spinner list goes out immediately; on failure the pre-call snapshot is
    /// restored and a failure signal follows.
    pub fn load_first_page(&self) {
        let mut guard = self.in_flight.lock().expect("poisoned");
        let generation = self.state.bump_generation();
        let previous = self.state.latest();
        self.state.publish_state(
            generation,
            ListState {
                list: GroupedList::loading_placeholder(),
                total_matching: 0,
            },
        );
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let page_size = self.page_size;
        let handle = std::thread::spawn(move || {
            match fetch(source.as_ref(), page_size, 0, None) {
                Ok((rows, total)) => {
                    let more = rows.len() < total;
                    debug!(loaded = rows.len(), total, more, "first page loaded");
                    let list = GroupedList::from_rows(rows, more);
                    state.publish_state(
                        generation,
                        ListState {
                            list,
                            total_matching: total,
                        },
                    );
                }
                Err(err) => {
                    warn!(%err, "first page load failed; rolling back");
                    state.publish_state(generation, previous);
                    state.publish_failure(generation, err);
                }
            }
        });
        *guard = Some(handle);
    }

    /// Loads the page after the currently loaded rows and combines it onto
    /// the list. Dropped silently while another load is outstanding; calling
    /// it when the list does not end in the progress row is a caller bug.
    pub fn load_next_page(&self) {
        let mut guard = self.in_flight.lock().expect("poisoned");
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("load_next_page dropped; load already in flight");
            return;
        }
        let current = self.state.latest();
        assert!(
            current.list.ends_in_loading(),
            "load_next_page requires a list ending in the progress row"
        );
        let generation = self.state.generation();
        let offset = current.list.real_row_count();
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let page_size = self.page_size;
        let handle = std::thread::spawn(move || {
            match fetch(source.as_ref(), page_size, offset, None) {
                Ok((rows, total)) => {
                    let more = offset + rows.len() < total;
                    debug!(loaded = rows.len(), offset, total, more, "next page loaded");
                    let list = if rows.is_empty() {
                        current.list.with_completion(!more)
                    } else {
                        current
                            .list
                            .combine(GroupedList::from_rows(rows, more), !more)
                    };
                    state.publish_state(
                        generation,
                        ListState {
                            list,
                            total_matching: total,
                        },
                    );
                }
                Err(err) => {
                    warn!(%err, "next page load failed");
                    state.publish_failure(generation, err);
                }
            }
        });
        *guard = Some(handle);
    }

    /// Re-fetches everything loaded so far in one query and replaces the
    /// list, anchored at the newest loaded date so rows added with newer
    /// dates do not shift the window. Dropped silently while another load is
    /// outstanding; calling it with nothing loaded is a caller bug.
    pub fn refresh(&self) {
        let mut guard = self.in_flight.lock().expect("poisoned");
        if guard.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("refresh dropped; load already in flight");
            return;
        }
        let current = self.state.latest();
        assert!(
            current.list.real_row_count() > 0,
            "refresh requires loaded rows"
        );
        let generation = self.state.generation();
        let limit = self.page_size.max(current.list.real_row_count());
        let anchor = current.list.first_date();
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let refreshing = Arc::clone(&self.refreshing);
        refreshing.store(true, Ordering::Release);
        let handle = std::thread::spawn(move || {
            let result = fetch(source.as_ref(), limit, 0, anchor);
            refreshing.store(false, Ordering::Release);
            match result {
                Ok((rows, total)) => {
                    let more = rows.len() < total;
                    debug!(loaded = rows.len(), total, more, "refresh loaded");
                    let list = GroupedList::from_rows(rows, more);
                    state.publish_state(
                        generation,
                        ListState {
                            list,
                            total_matching: total,
                        },
                    );
                }
                Err(err) => {
                    warn!(%err, "refresh failed");
                    state.publish_failure(generation, err);
                }
            }
        });
        *guard = Some(handle);
    }
}

fn fetch<Q: PageSource>(
    source: &Q,
    limit: usize,
    offset: usize,
    anchor: Option<NaiveDate>,
) -> Result<(Vec<Q::Row>, usize), StoreError> {
    let rows = source.page(limit, offset, anchor)?;
    let total = source.count()?;
    Ok((rows, total))
}
