//! Refreshable match lookups in both directions.
//!
//! Matching CVs for a job stay fresh for 5 minutes; matching jobs for a CV
//! for 1 hour. A refresh always goes to the network and overwrites the entry.

use std::future::Future;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use crate::api::models::{CvJobMatches, JobCvMatches};
use crate::api::{ApiError, CvApi};
use crate::cache::{Clock, MatchCache, MatchKey, TtlCache};

pub fn cv_matches_ttl() -> Duration {
    Duration::minutes(5)
}

pub fn job_matches_ttl() -> Duration {
    Duration::hours(1)
}

pub struct MatchService {
    api: Arc<dyn CvApi>,
    /// Jobs ranked for a CV, keyed by CV id.
    jobs_for_cv: Arc<dyn MatchCache<CvJobMatches>>,
    /// CVs ranked for a job, keyed by job id.
    cvs_for_job: Arc<dyn MatchCache<JobCvMatches>>,
}

impl MatchService {
    /// Builds the service with the default TTL caches.
    pub fn new(api: Arc<dyn CvApi>, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self::with_caches(
            api,
            Arc::new(TtlCache::new(job_matches_ttl(), capacity, clock.clone())),
            Arc::new(TtlCache::new(cv_matches_ttl(), capacity, clock)),
        )
    }

    pub fn with_caches(
        api: Arc<dyn CvApi>,
        jobs_for_cv: Arc<dyn MatchCache<CvJobMatches>>,
        cvs_for_job: Arc<dyn MatchCache<JobCvMatches>>,
    ) -> Self {
        Self {
            api,
            jobs_for_cv,
            cvs_for_job,
        }
    }

    /// Jobs matching a CV. Served from cache unless `refresh` is set or the entry is stale.
    pub async fn matching_jobs(
        &self,
        cv_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<CvJobMatches, ApiError> {
        lookup(
            self.jobs_for_cv.as_ref(),
            MatchKey::new(cv_id, limit),
            refresh,
            || self.api.matching_jobs(cv_id, limit, refresh),
        )
        .await
    }

    /// CVs matching a job. Served from cache unless `refresh` is set or the entry is stale.
    pub async fn matching_cvs(
        &self,
        job_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<JobCvMatches, ApiError> {
        lookup(
            self.cvs_for_job.as_ref(),
            MatchKey::new(job_id, limit),
            refresh,
            || self.api.matching_cvs(job_id, limit, refresh),
        )
        .await
    }
}

async fn lookup<V, F, Fut>(
    cache: &dyn MatchCache<V>,
    key: MatchKey,
    refresh: bool,
    fetch: F,
) -> Result<V, ApiError>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, ApiError>>,
{
    if refresh {
        cache.invalidate(&key);
    } else if let Some(hit) = cache.get(&key) {
        debug!("match cache hit for {} (limit {})", key.entity_id, key.limit);
        return Ok(hit);
    }

    let payload = fetch().await?;
    info!(
        "fetched matches for {} (limit {}, refresh {})",
        key.entity_id, key.limit, refresh
    );
    cache.put(key, payload.clone());
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{job_match, FakeApi, Reply};
    use crate::cache::ManualClock;

    fn service() -> (Arc<FakeApi>, Arc<ManualClock>, MatchService) {
        let api = Arc::new(FakeApi::new());
        let clock = Arc::new(ManualClock::new());
        let service = MatchService::new(api.clone(), 16, clock.clone());
        (api, clock, service)
    }

    #[tokio::test]
    async fn test_second_lookup_within_ttl_hits_cache() {
        let (api, _clock, service) = service();
        service.matching_cvs("job-1", 8, false).await.unwrap();
        service.matching_cvs("job-1", 8, false).await.unwrap();
        assert_eq!(api.calls("matching_cvs"), 1);
    }

    #[tokio::test]
    async fn test_refresh_always_calls_and_overwrites() {
        let (api, _clock, service) = service();
        service.matching_jobs("cv-1", 10, false).await.unwrap();

        api.set_job_matches(
            "cv-1",
            Reply::Ok(CvJobMatches {
                cv_id: "cv-1".into(),
                matches: vec![job_match("job-9", 91.0)],
            }),
        );
        let refreshed = service.matching_jobs("cv-1", 10, true).await.unwrap();
        assert_eq!(refreshed.matches[0].job.id, "job-9");
        assert_eq!(api.calls("matching_jobs"), 2);

        // The overwritten entry now serves plain lookups.
        let cached = service.matching_jobs("cv-1", 10, false).await.unwrap();
        assert_eq!(cached.matches[0].job.id, "job-9");
        assert_eq!(api.calls("matching_jobs"), 2);
    }

    #[tokio::test]
    async fn test_directions_have_distinct_ttls() {
        let (api, clock, service) = service();
        service.matching_cvs("job-1", 8, false).await.unwrap();
        service.matching_jobs("cv-1", 10, false).await.unwrap();

        clock.advance(Duration::minutes(6));
        service.matching_cvs("job-1", 8, false).await.unwrap();
        service.matching_jobs("cv-1", 10, false).await.unwrap();
        assert_eq!(api.calls("matching_cvs"), 2);
        assert_eq!(api.calls("matching_jobs"), 1);

        clock.advance(Duration::minutes(55));
        service.matching_jobs("cv-1", 10, false).await.unwrap();
        assert_eq!(api.calls("matching_jobs"), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (api, _clock, service) = service();
        api.set_cv_matches("job-1", Reply::Rejected("scoring engine busy".into()));
        let err = service.matching_cvs("job-1", 8, false).await.unwrap_err();
        assert_eq!(err.user_message(), "scoring engine busy");

        api.set_cv_matches(
            "job-1",
            Reply::Ok(JobCvMatches {
                job_id: "job-1".into(),
                matches: vec![],
            }),
        );
        service.matching_cvs("job-1", 8, false).await.unwrap();
        assert_eq!(api.calls("matching_cvs"), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_drops_stale_entry() {
        let (api, _clock, service) = service();
        service.matching_cvs("job-1", 8, false).await.unwrap();
        api.set_cv_matches("job-1", Reply::Offline);
        assert!(service.matching_cvs("job-1", 8, true).await.is_err());
        assert!(service.matching_cvs("job-1", 8, false).await.is_err());
        assert_eq!(api.calls("matching_cvs"), 3);
    }
}
