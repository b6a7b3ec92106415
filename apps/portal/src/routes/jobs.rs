use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::api::models::{Job, JobCvMatches, JobPage, JobQuery};
use crate::api::{ActionResult, DEFAULT_CV_MATCH_LIMIT};
use crate::errors::AppError;
use crate::routes::MatchQuery;
use crate::state::AppState;
use crate::views::{CreateJobError, JobDraft};

#[derive(Debug, Deserialize)]
pub struct JobsParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub search: String,
}

/// GET /actions/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobsParams>,
) -> Json<ActionResult<JobPage>> {
    let defaults = JobQuery::default();
    let query = JobQuery {
        page: params.page.unwrap_or(defaults.page).max(1),
        limit: params.limit.unwrap_or(defaults.limit).max(1),
        search: params.search.trim().to_string(),
    };
    Json(ActionResult::from_result(
        state.api.jobs(&query).await,
        "Successfully fetched jobs",
        "listing jobs",
    ))
}

/// GET /actions/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ActionResult<Job>> {
    Json(ActionResult::from_result(
        state.api.job(&id).await,
        "Successfully fetched job details",
        "loading job details",
    ))
}

/// POST /actions/jobs
/// The draft is validated here; only a valid posting reaches the service.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(draft): Json<JobDraft>,
) -> Result<Json<ActionResult<Job>>, AppError> {
    let new_job = draft.into_new_job().map_err(CreateJobError::Invalid)?;
    let result = state.api.create_job(&new_job).await;
    if let Ok(job) = &result {
        info!("created job {} ({})", job.id, job.title);
    }
    Ok(Json(ActionResult::from_result(
        result,
        "Job created successfully",
        "creating job",
    )))
}

/// GET /actions/jobs/:id/matches
pub async fn handle_matching_cvs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MatchQuery>,
) -> Json<ActionResult<JobCvMatches>> {
    let limit = params.limit.unwrap_or(DEFAULT_CV_MATCH_LIMIT);
    Json(ActionResult::from_result(
        state.matches.matching_cvs(&id, limit, params.refresh).await,
        "Successfully fetched matching CVs",
        "matching CVs for job",
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::fake::{job, FakeApi};
    use crate::routes::test_support::{app, get, post_json};

    fn api_with_jobs() -> Arc<FakeApi> {
        let jobs = (1..=23)
            .map(|i| job(&format!("job-{i}"), &format!("Backend Engineer {i}")))
            .collect();
        Arc::new(FakeApi::new().with_jobs(jobs))
    }

    #[tokio::test]
    async fn test_list_jobs_with_search() {
        let (status, body) = get(app(api_with_jobs()), "/actions/jobs?search=engineer&page=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["jobs"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"]["pagination"]["totalPages"], 3);
    }

    #[tokio::test]
    async fn test_missing_job_reports_status_message() {
        let (status, body) = get(app(api_with_jobs()), "/actions/jobs/nope").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Job not found");
    }

    #[tokio::test]
    async fn test_create_job_validates_draft() {
        let api = Arc::new(FakeApi::new());
        let (status, body) = post_json(app(api.clone()), "/actions/jobs", json!({ "title": "Dev" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Company name is required"));
        assert_eq!(api.calls("create_job"), 0);
    }

    #[tokio::test]
    async fn test_create_job() {
        let api = Arc::new(FakeApi::new());
        let draft = json!({
            "title": "Data Engineer",
            "company": "Acme",
            "location": "Lisbon",
            "description": "Pipelines",
            "skills": ["SQL", "Rust"],
            "salaryMin": 50000,
            "salaryMax": 70000,
            "salaryCurrency": "EUR",
            "employmentType": "Full-time",
            "experienceLevel": "Senior"
        });
        let (status, body) = post_json(app(api.clone()), "/actions/jobs", draft).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["title"], "Data Engineer");
        let created = api.created.lock().unwrap();
        assert_eq!(created[0].experience_level.as_deref(), Some("Senior"));
    }

    #[tokio::test]
    async fn test_matching_cvs_default_limit_and_refresh() {
        let api = Arc::new(FakeApi::new());
        let app = app(api.clone());
        let (_, body) = get(app.clone(), "/actions/jobs/job-1/matches").await;
        assert_eq!(body["data"]["jobId"], "job-1");
        get(app.clone(), "/actions/jobs/job-1/matches").await;
        get(app.clone(), "/actions/jobs/job-1/matches?limit=3").await;
        assert_eq!(api.calls("matching_cvs"), 2);
        get(app, "/actions/jobs/job-1/matches?refresh=true").await;
        assert_eq!(api.calls("matching_cvs"), 3);
    }
}
