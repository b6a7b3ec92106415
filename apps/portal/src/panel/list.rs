//! Paginated, searchable list backed by a remote source.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use super::pager::{clamp_page, page_count};
use super::LoadState;
use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    /// Size of the whole filtered collection, not of this page.
    pub total: usize,
}

/// Where a list gets its pages from. Pagination and search filtering must
/// operate over the same collection.
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageSlice<T>, ApiError>;

    /// Drops anything the source cached locally so the next fetch hits the network.
    async fn invalidate(&self) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub query: String,
    pub state: LoadState,
    pub error: Option<String>,
}

struct ListState<T> {
    query: String,
    page: usize,
    items: Vec<T>,
    total: usize,
    state: LoadState,
    error: Option<String>,
    generation: u64,
}

pub struct PaginatedList<T, S> {
    source: S,
    page_size: usize,
    inner: Mutex<ListState<T>>,
}

impl<T, S> PaginatedList<T, S>
where
    T: Clone + Send,
    S: ListSource<T>,
{
    pub fn new(source: S, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            inner: Mutex::new(ListState {
                query: String::new(),
                page: 1,
                items: Vec::new(),
                total: 0,
                state: LoadState::Idle,
                error: None,
                generation: 0,
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Fetches the current page.
    pub async fn load(&self) {
        self.fetch_current().await;
    }

    /// Sets the search text, resets to page 1 and re-fetches.
    pub async fn set_query(&self, query: &str) {
        {
            let mut st = self.lock();
            st.query = query.to_string();
            st.page = 1;
        }
        self.fetch_current().await;
    }

    /// Moves to `page`, clamped to the known page range, and fetches it.
    pub async fn set_page(&self, page: usize) {
        {
            let mut st = self.lock();
            st.page = clamp_page(page, st.total, self.page_size);
        }
        self.fetch_current().await;
    }

    /// Re-fetches the current page, bypassing anything the source cached.
    pub async fn refresh(&self) {
        self.source.invalidate().await;
        self.fetch_current().await;
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let st = self.lock();
        ListSnapshot {
            items: st.items.clone(),
            total: st.total,
            page: st.page,
            page_count: page_count(st.total, self.page_size),
            query: st.query.clone(),
            state: st.state,
            error: st.error.clone(),
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }

    pub fn page(&self) -> usize {
        self.lock().page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ListState<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn fetch_current(&self) {
        // A shrunken collection can leave the page out of range; clamp and retry once.
        // The clamped page is only committed once its own fetch succeeds.
        let mut clamped_page = None;
        for attempt in 0..2 {
            let (request, generation) = {
                let mut st = self.lock();
                st.generation += 1;
                st.state = LoadState::Loading;
                (
                    PageRequest {
                        page: clamped_page.unwrap_or(st.page),
                        page_size: self.page_size,
                        query: st.query.clone(),
                    },
                    st.generation,
                )
            };

            let result = self.source.fetch_page(&request).await;

            let mut st = self.lock();
            if st.generation != generation {
                return;
            }
            match result {
                Ok(slice) => {
                    let clamped = clamp_page(request.page, slice.total, self.page_size);
                    if attempt == 0 && clamped != request.page {
                        clamped_page = Some(clamped);
                        continue;
                    }
                    st.page = request.page;
                    st.items = slice.items;
                    st.total = slice.total;
                    st.state = LoadState::Loaded;
                    st.error = None;
                }
                Err(e) => {
                    warn!("list fetch for page {} failed: {e}", request.page);
                    st.state = LoadState::Error;
                    st.error = Some(e.user_message());
                }
            }
            return;
        }
    }
}
