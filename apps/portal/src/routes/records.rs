use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::models::{CvDetails, CvJobMatches};
use crate::api::{ActionResult, DEFAULT_JOB_MATCH_LIMIT};
use crate::errors::AppError;
use crate::panel::pager::{clamp_page, page_count, slice};
use crate::routes::MatchQuery;
use crate::state::AppState;
use crate::views::records::{filter_ids, RECORDS_PAGE_SIZE};
use crate::views::{UploadError, UploadForm};

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsPage {
    pub ids: Vec<String>,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

/// GET /actions/records
pub async fn handle_list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordsQuery>,
) -> Json<ActionResult<RecordsPage>> {
    let limit = params.limit.unwrap_or(RECORDS_PAGE_SIZE).max(1);
    let result = state.api.cv_ids().await.map(|all| {
        let filtered = filter_ids(&all.ids, &params.search);
        let page = clamp_page(params.page.unwrap_or(1), filtered.len(), limit);
        RecordsPage {
            ids: slice(&filtered, page, limit),
            total: filtered.len(),
            page,
            page_count: page_count(filtered.len(), limit),
        }
    });
    Json(ActionResult::from_result(
        result,
        "Successfully fetched CV IDs",
        "listing CV records",
    ))
}

/// GET /actions/records/:id
pub async fn handle_get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<ActionResult<CvDetails>> {
    Json(ActionResult::from_result(
        state.api.cv_details(&id).await,
        "Successfully fetched CV details",
        "loading CV details",
    ))
}

/// POST /actions/records/extract
/// Every multipart field carrying a file name is treated as an upload.
pub async fn handle_extract_records(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ActionResult<Vec<CvDetails>>>, AppError> {
    let mut form = UploadForm::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        form.add_file(&file_name, bytes)?;
    }
    info!("extracting {} uploaded file(s)", form.summaries().len());

    match form.submit(state.api.as_ref()).await {
        Ok(records) => Ok(Json(ActionResult::ok(
            records,
            "Successfully extracted CV data",
        ))),
        Err(UploadError::Api(e)) => Ok(Json(ActionResult::from_result(
            Err(e),
            "",
            "extracting CVs",
        ))),
        Err(e) => Err(e.into()),
    }
}

/// GET /actions/records/:id/jobs
pub async fn handle_matching_jobs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MatchQuery>,
) -> Json<ActionResult<CvJobMatches>> {
    let limit = params.limit.unwrap_or(DEFAULT_JOB_MATCH_LIMIT);
    Json(ActionResult::from_result(
        state.matches.matching_jobs(&id, limit, params.refresh).await,
        "Successfully fetched matching jobs",
        "matching jobs for CV",
    ))
}
