///! Pagination state over the query cache
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::FetchError;
use crate::types::{PageResult, PokemonRecord};

use super::QueryClient;

/// What the view renders for the list: the held page's entries plus derived
/// navigation state.
///
/// `is_placeholder` is true while a navigation is in flight and the held
/// entries still belong to the previously displayed page (kept visible to
/// avoid layout flicker).
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub entries: Vec<PokemonRecord>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_entries: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub is_placeholder: bool,
}

impl PageSnapshot {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            current_page: 0,
            total_pages: 0,
            total_entries: 0,
            has_next: false,
            has_previous: false,
            is_placeholder: false,
        }
    }
}

struct HeldPage {
    page: u32,
    result: PageResult,
}

struct PagerState {
    current_page: u32,
    held: Option<HeldPage>,
}

/// Page navigation over [`QueryClient::page`].
///
/// Owns the current page index and the last successfully resolved page.
/// Cheap to clone; clones share state. Navigating past either bound is a
/// no-op: no request is issued and the state does not change. After each
/// successful navigation the next page is prefetched in the background.
#[derive(Clone)]
pub struct Pager {
    client: QueryClient,
    page_size: u32,
    state: Arc<RwLock<PagerState>>,
}

fn total_pages(count: u64, page_size: u32) -> u32 {
    // Floor division by contract; the remainder tail still renders as the
    // last addressable page.
    (count / page_size.max(1) as u64) as u32
}

impl Pager {
    pub fn new(client: QueryClient, page_size: u32) -> Self {
        Self {
            client,
            page_size,
            state: Arc::new(RwLock::new(PagerState {
                current_page: 0,
                held: None,
            })),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Current view state without issuing any request.
    pub async fn snapshot(&self) -> PageSnapshot {
        let state = self.state.read().await;
        self.snapshot_locked(&state)
    }

    fn snapshot_locked(&self, state: &PagerState) -> PageSnapshot {
        let Some(held) = &state.held else {
            let mut snapshot = PageSnapshot::empty();
            snapshot.current_page = state.current_page;
            return snapshot;
        };

        let total = total_pages(held.result.count, self.page_size);
        PageSnapshot {
            entries: held.result.results.clone(),
            current_page: state.current_page,
            total_pages: total,
            total_entries: held.result.count,
            has_next: held.page < total && held.result.next,
            has_previous: held.page > 0 && held.result.previous,
            is_placeholder: held.page != state.current_page,
        }
    }

    /// Navigate to an absolute page index.
    ///
    /// Out-of-range targets are a no-op returning the unchanged snapshot.
    /// Before any page has resolved the bound is unknown, so a cold-start
    /// overshoot is detected from the response count and treated the same
    /// way. While the fetch is in flight the previous page stays held,
    /// flagged as placeholder; on failure the page index rolls back and the
    /// error is surfaced.
    pub async fn goto(&self, page: u32) -> Result<PageSnapshot, FetchError> {
        let previous_page = {
            let mut state = self.state.write().await;
            if let Some(held) = &state.held {
                if page > total_pages(held.result.count, self.page_size) {
                    return Ok(self.snapshot_locked(&state));
                }
            }
            let previous = state.current_page;
            state.current_page = page;
            previous
        };

        match self.client.page(page, self.page_size).await {
            Ok(result) => {
                // The snapshot is built inside the same lock scope that
                // stores the page, so a concurrent navigation cannot slip
                // in between and get reflected in this response.
                let (snapshot, stored) = {
                    let mut state = self.state.write().await;
                    if page > total_pages(result.count, self.page_size) {
                        // The bound was unknowable before the first fetch
                        // resolved; treat the overshoot as the usual no-op.
                        if state.current_page == page {
                            state.current_page = previous_page;
                        }
                        (self.snapshot_locked(&state), false)
                    } else {
                        state.held = Some(HeldPage { page, result });
                        (self.snapshot_locked(&state), true)
                    }
                };
                if stored {
                    // Warm the cache for the page the user is most likely to
                    // ask for next. Failures are swallowed by the prefetch
                    // path.
                    self.client.prefetch_page(page.saturating_add(1), self.page_size);
                }
                Ok(snapshot)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                if state.current_page == page {
                    state.current_page = previous_page;
                }
                Err(err)
            }
        }
    }

    /// Advance one page; no-op when the displayed page has no successor.
    pub async fn next(&self) -> Result<PageSnapshot, FetchError> {
        let target = {
            let state = self.state.read().await;
            let snapshot = self.snapshot_locked(&state);
            if !snapshot.has_next || snapshot.is_placeholder {
                return Ok(snapshot);
            }
            state.current_page + 1
        };
        self.goto(target).await
    }

    /// Go back one page; no-op on the first page.
    pub async fn previous(&self) -> Result<PageSnapshot, FetchError> {
        let target = {
            let state = self.state.read().await;
            let snapshot = self.snapshot_locked(&state);
            if state.current_page == 0 || !snapshot.has_previous {
                return Ok(snapshot);
            }
            state.current_page - 1
        };
        self.goto(target).await
    }
}
