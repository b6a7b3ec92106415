//! Job postings browser with server-side search and paging.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};

use super::job_form::{CreateJobError, JobDraft};
use crate::api::models::{Job, JobQuery};
use crate::api::{ApiError, CvApi};
use crate::panel::{
    DetailLoader, DetailSnapshot, ListSnapshot, ListSource, PageRequest, PageSlice,
    PaginatedList, Ticket,
};

pub const JOBS_PAGE_SIZE: usize = 10;

pub struct JobSource {
    api: Arc<dyn CvApi>,
}

impl JobSource {
    pub fn new(api: Arc<dyn CvApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ListSource<Job> for JobSource {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageSlice<Job>, ApiError> {
        let page = self
            .api
            .jobs(&JobQuery {
                page: request.page,
                limit: request.page_size,
                search: request.query.trim().to_string(),
            })
            .await?;
        Ok(PageSlice {
            items: page.jobs,
            total: page.pagination.total,
        })
    }
}

pub struct JobsView {
    api: Arc<dyn CvApi>,
    list: PaginatedList<Job, JobSource>,
    detail: Mutex<DetailLoader<Job>>,
}

impl JobsView {
    pub fn new(api: Arc<dyn CvApi>) -> Self {
        Self {
            list: PaginatedList::new(JobSource::new(api.clone()), JOBS_PAGE_SIZE),
            api,
            detail: Mutex::new(DetailLoader::new()),
        }
    }

    pub async fn load(&self) {
        self.list.load().await;
        self.sync_selected();
    }

    pub async fn set_query(&self, query: &str) {
        self.list.set_query(query).await;
        self.sync_selected();
    }

    pub async fn set_page(&self, page: usize) {
        self.list.set_page(page).await;
        self.sync_selected();
    }

    pub async fn refresh_list(&self) {
        self.list.refresh().await;
        self.sync_selected();
    }

    pub fn page(&self) -> ListSnapshot<Job> {
        self.list.snapshot()
    }

    /// Selects a job. A job on the current page is shown as-is; anything else
    /// is fetched by id.
    pub async fn select(&self, id: &str) {
        let Some(ticket) = self.detail_lock().select(id) else {
            return;
        };
        let on_page = self.list.items().into_iter().find(|j| j.id == id);
        match on_page {
            Some(job) => {
                self.detail_lock().resolve(ticket, Ok(job));
            }
            None => self.fetch(ticket).await,
        }
    }

    pub async fn refresh_detail(&self) {
        let ticket = self.detail_lock().refresh();
        if let Some(ticket) = ticket {
            self.fetch(ticket).await;
        }
    }

    pub fn detail(&self) -> DetailSnapshot<Job> {
        self.detail_lock().snapshot()
    }

    /// Validates and submits a new posting, then reloads the list.
    pub async fn create_job(&self, draft: JobDraft) -> Result<Job, CreateJobError> {
        let new_job = draft.into_new_job().map_err(CreateJobError::Invalid)?;
        let created = self.api.create_job(&new_job).await?;
        info!("created job {} ({})", created.id, created.title);
        self.refresh_list().await;
        Ok(created)
    }

    async fn fetch(&self, ticket: Ticket) {
        let result = self.api.job(&ticket.id).await.map_err(|e| {
            warn!("loading job {} failed: {e}", ticket.id);
            e.user_message()
        });
        self.detail_lock().resolve(ticket, result);
    }

    /// Keeps the shown detail in step with a freshly loaded page.
    fn sync_selected(&self) {
        let mut detail = self.detail_lock();
        let Some(selected) = detail.selected_id().map(str::to_string) else {
            return;
        };
        if let Some(job) = self.list.items().into_iter().find(|j| j.id == selected) {
            detail.replace_detail(&selected, job);
        }
    }

    fn detail_lock(&self) -> std::sync::MutexGuard<'_, DetailLoader<Job>> {
        self.detail.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{job, FakeApi, Reply};
    use crate::panel::LoadState;

    fn postings() -> Vec<Job> {
        let mut jobs: Vec<Job> = (1..=23)
            .map(|i| job(&format!("eng-{i}"), &format!("Software Engineer {i}")))
            .collect();
        jobs.extend((1..=4).map(|i| job(&format!("des-{i}"), &format!("Designer {i}"))));
        jobs
    }

    #[tokio::test]
    async fn test_search_spans_three_pages() {
        let api = Arc::new(FakeApi::new().with_jobs(postings()));
        let view = JobsView::new(api);
        view.load().await;
        assert_eq!(view.page().total, 27);

        view.set_query("engineer").await;
        let page = view.page();
        assert_eq!(page.total, 23);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.page, 1);

        view.set_page(3).await;
        let page = view.page();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].id, "eng-21");

        view.set_page(9).await;
        assert_eq!(view.page().page, 3);
    }

    #[tokio::test]
    async fn test_selecting_listed_job_skips_fetch() {
        let api = Arc::new(FakeApi::new().with_jobs(postings()));
        let view = JobsView::new(api.clone());
        view.load().await;
        view.select("eng-2").await;
        let detail = view.detail();
        assert_eq!(detail.state, LoadState::Loaded);
        assert_eq!(detail.detail.unwrap().title, "Software Engineer 2");
        assert_eq!(api.calls("job"), 0);

        view.refresh_detail().await;
        assert_eq!(api.calls("job"), 1);
    }

    #[tokio::test]
    async fn test_unknown_job_reports_not_found() {
        let api = Arc::new(FakeApi::new().with_jobs(postings()));
        let view = JobsView::new(api);
        view.select("missing").await;
        let detail = view.detail();
        assert_eq!(detail.state, LoadState::Error);
        assert_eq!(detail.error.as_deref(), Some("Job not found"));
    }

    #[tokio::test]
    async fn test_reload_updates_selected_detail() {
        let api = Arc::new(FakeApi::new().with_jobs(postings()));
        let view = JobsView::new(api.clone());
        view.load().await;
        view.select("eng-1").await;

        api.jobs.lock().unwrap()[0].title = "Staff Engineer".into();
        view.refresh_list().await;
        assert_eq!(view.detail().detail.unwrap().title, "Staff Engineer");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_items() {
        let api = Arc::new(FakeApi::new().with_jobs(postings()));
        let view = JobsView::new(api.clone());
        view.load().await;
        *api.jobs_failure.lock().unwrap() = Some(Reply::Offline);
        view.refresh_list().await;
        let page = view.page();
        assert_eq!(page.state, LoadState::Error);
        assert_eq!(page.items.len(), 10);
    }

    #[tokio::test]
    async fn test_create_job_validates_then_reloads() {
        let api = Arc::new(FakeApi::new());
        let view = JobsView::new(api.clone());

        let err = view.create_job(JobDraft::default()).await.unwrap_err();
        assert!(matches!(err, CreateJobError::Invalid(_)));
        assert_eq!(api.calls("create_job"), 0);

        let draft = JobDraft {
            title: "Platform Engineer".into(),
            company: "Acme".into(),
            remote: true,
            description: "Build things".into(),
            salary_currency: "USD".into(),
            employment_type: "Full-time".into(),
            ..Default::default()
        };
        let created = view.create_job(draft).await.unwrap();
        assert_eq!(created.title, "Platform Engineer");
        assert_eq!(view.page().total, 1);
        assert_eq!(api.created.lock().unwrap()[0].company, "Acme");
    }
}
