//! Match panels for both directions, plus score colouring.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::api::models::{CvJobMatches, JobCvMatches};
use crate::api::{ApiError, DEFAULT_CV_MATCH_LIMIT, DEFAULT_JOB_MATCH_LIMIT};
use crate::matching::MatchService;
use crate::panel::{LoadState, MatchPanel};

/// Colour band of a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Teal,
    Blue,
    Yellow,
    Red,
}

impl ScoreBand {
    /// Bands used when listing jobs for a CV.
    pub fn for_job_match(score: f64) -> Self {
        if score >= 80.0 {
            ScoreBand::Green
        } else if score >= 60.0 {
            ScoreBand::Yellow
        } else {
            ScoreBand::Red
        }
    }

    /// Finer bands used when listing CVs for a job.
    pub fn for_cv_match(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ScoreBand::Green,
            s if s >= 70.0 => ScoreBand::Teal,
            s if s >= 60.0 => ScoreBand::Blue,
            s if s >= 50.0 => ScoreBand::Yellow,
            _ => ScoreBand::Red,
        }
    }
}

/// Fetches the ranked matches for one target entity.
#[async_trait]
pub trait MatchSource: Send + Sync {
    type Payload: Clone + Send;

    async fn fetch(&self, target: &str, limit: u32, refresh: bool)
        -> Result<Self::Payload, ApiError>;
}

/// Jobs ranked against a CV.
pub struct JobsForCv(pub Arc<MatchService>);

#[async_trait]
impl MatchSource for JobsForCv {
    type Payload = CvJobMatches;

    async fn fetch(&self, cv_id: &str, limit: u32, refresh: bool) -> Result<CvJobMatches, ApiError> {
        self.0.matching_jobs(cv_id, limit, refresh).await
    }
}

/// CVs ranked against a job.
pub struct CvsForJob(pub Arc<MatchService>);

#[async_trait]
impl MatchSource for CvsForJob {
    type Payload = JobCvMatches;

    async fn fetch(&self, job_id: &str, limit: u32, refresh: bool) -> Result<JobCvMatches, ApiError> {
        self.0.matching_cvs(job_id, limit, refresh).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot<P> {
    pub target: Option<String>,
    pub state: LoadState,
    pub refreshing: bool,
    pub matches: Option<P>,
    pub error: Option<String>,
}

pub struct MatchesView<S: MatchSource> {
    source: S,
    limit: u32,
    panel: Mutex<MatchPanel<S::Payload>>,
}

pub type MatchingJobsView = MatchesView<JobsForCv>;
pub type MatchingCvsView = MatchesView<CvsForJob>;

impl MatchingJobsView {
    pub fn for_cvs(service: Arc<MatchService>) -> Self {
        MatchesView::new(JobsForCv(service), DEFAULT_JOB_MATCH_LIMIT)
    }
}

impl MatchingCvsView {
    pub fn for_jobs(service: Arc<MatchService>) -> Self {
        MatchesView::new(CvsForJob(service), DEFAULT_CV_MATCH_LIMIT)
    }
}

impl<S: MatchSource> MatchesView<S> {
    pub fn new(source: S, limit: u32) -> Self {
        Self {
            source,
            limit,
            panel: Mutex::new(MatchPanel::new()),
        }
    }

    /// Shows matches for `target`, from cache when fresh.
    pub async fn show(&self, target: &str) {
        self.run(target, false).await;
    }

    /// Recomputes matches for the current target.
    pub async fn refresh(&self) {
        let target = self.lock().target().map(str::to_string);
        if let Some(target) = target {
            self.run(&target, true).await;
        }
    }

    pub fn snapshot(&self) -> MatchSnapshot<S::Payload> {
        let panel = self.lock();
        MatchSnapshot {
            target: panel.target().map(str::to_string),
            state: panel.state(),
            refreshing: panel.is_refreshing(),
            matches: panel.payload().cloned(),
            error: panel.error().map(str::to_string),
        }
    }

    async fn run(&self, target: &str, refresh: bool) {
        let ticket = self.lock().request(target, refresh);
        let Some(ticket) = ticket else {
            return;
        };
        let result = self
            .source
            .fetch(&ticket.id, self.limit, refresh)
            .await
            .map_err(|e| {
                warn!("match lookup for {} failed: {e}", ticket.id);
                e.user_message()
            });
        self.lock().resolve(ticket, result);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MatchPanel<S::Payload>> {
        self.panel.lock().unwrap_or_else(|e| e.into_inner())
    }
}
