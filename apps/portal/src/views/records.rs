//! Existing CV records browser.
//!
//! The service returns every id at once, so filtering and paging happen here
//! over the same fetched id list. Details are kept in a local cache keyed by
//! id; that cache feeds list labels and repeat selections, and a detail
//! refresh always goes back to the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::warn;

use crate::api::models::CvDetails;
use crate::api::{ApiError, CvApi};
use crate::panel::pager::slice;
use crate::panel::{
    DetailLoader, DetailSnapshot, ListItem, ListSnapshot, ListSource, PageRequest, PageSlice,
    PaginatedList, Ticket,
};

pub const RECORDS_PAGE_SIZE: usize = 10;

/// Case-insensitive substring filter over CV ids. An empty query keeps everything.
pub fn filter_ids(ids: &[String], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return ids.to_vec();
    }
    ids.iter()
        .filter(|id| id.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Serves pages of CV ids from one fetched id list.
pub struct CvIdSource {
    api: Arc<dyn CvApi>,
    ids: Mutex<Option<Vec<String>>>,
}

impl CvIdSource {
    pub fn new(api: Arc<dyn CvApi>) -> Self {
        Self {
            api,
            ids: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ListSource<String> for CvIdSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageSlice<String>, ApiError> {
        let cached = self.ids.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let ids = match cached {
            Some(ids) => ids,
            None => {
                let fetched = self.api.cv_ids().await?.ids;
                *self.ids.lock().unwrap_or_else(|e| e.into_inner()) = Some(fetched.clone());
                fetched
            }
        };
        let filtered = filter_ids(&ids, &request.query);
        Ok(PageSlice {
            items: slice(&filtered, request.page, request.page_size),
            total: filtered.len(),
        })
    }

    async fn invalidate(&self) {
        *self.ids.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

pub struct RecordsView {
    api: Arc<dyn CvApi>,
    list: PaginatedList<String, CvIdSource>,
    detail: Mutex<DetailLoader<CvDetails>>,
    known: Mutex<HashMap<String, CvDetails>>,
}

impl RecordsView {
    pub fn new(api: Arc<dyn CvApi>) -> Self {
        Self {
            list: PaginatedList::new(CvIdSource::new(api.clone()), RECORDS_PAGE_SIZE),
            api,
            detail: Mutex::new(DetailLoader::new()),
            known: Mutex::new(HashMap::new()),
        }
    }

    pub async fn load(&self) {
        self.list.load().await;
    }

    pub async fn set_query(&self, query: &str) {
        self.list.set_query(query).await;
    }

    pub async fn set_page(&self, page: usize) {
        self.list.set_page(page).await;
    }

    /// Re-fetches the id list from the service.
    pub async fn refresh_list(&self) {
        self.list.refresh().await;
    }

    /// Current page with labels resolved from whatever details are known.
    pub fn page(&self) -> ListSnapshot<ListItem> {
        let snapshot = self.list.snapshot();
        let known = self.known.lock().unwrap_or_else(|e| e.into_inner());
        ListSnapshot {
            items: snapshot
                .items
                .iter()
                .map(|id| ListItem::resolve(id, known.get(id).and_then(|cv| cv.person_name())))
                .collect(),
            total: snapshot.total,
            page: snapshot.page,
            page_count: snapshot.page_count,
            query: snapshot.query,
            state: snapshot.state,
            error: snapshot.error,
        }
    }

    /// Selects a record. A detail already known locally is shown without a fetch.
    pub async fn select(&self, id: &str) {
        let Some(ticket) = self.detail_lock().select(id) else {
            return;
        };
        let known = self
            .known
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned();
        match known {
            Some(cv) => {
                self.detail_lock().resolve(ticket, Ok(cv));
            }
            None => self.fetch(ticket).await,
        }
    }

    /// Re-fetches the selected record, bypassing the local cache.
    pub async fn refresh_detail(&self) {
        let ticket = self.detail_lock().refresh();
        if let Some(ticket) = ticket {
            self.fetch(ticket).await;
        }
    }

    pub fn detail(&self) -> DetailSnapshot<CvDetails> {
        self.detail_lock().snapshot()
    }

    async fn fetch(&self, ticket: Ticket) {
        let result = self.api.cv_details(&ticket.id).await;
        let result = match result {
            Ok(cv) => {
                self.known
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .insert(ticket.id.clone(), cv.clone());
                Ok(cv)
            }
            Err(e) => {
                warn!("loading CV {} failed: {e}", ticket.id);
                Err(e.user_message())
            }
        };
        self.detail_lock().resolve(ticket, result);
    }

    fn detail_lock(&self) -> std::sync::MutexGuard<'_, DetailLoader<CvDetails>> {
        self.detail.lock().unwrap_or_else(|e| e.into_inner())
    }
}
