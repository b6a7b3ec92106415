//! CV service client, the single point of entry for every remote call.
//!
//! No other module talks to the remote API directly; views and route
//! handlers depend on the `CvApi` trait so they can be driven by a fake.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub mod error;
#[cfg(test)]
pub mod fake;
pub mod models;

pub use error::{ActionResult, ApiError};

use models::{
    ChatHistory, ChatReply, ChatRequest, CvDetails, CvIds, CvJobMatches, CvRecord, Envelope,
    ErrorBody, Job, JobCvMatches, JobPage, JobQuery, NewJob, OneOrMany, UploadFile,
};

/// Limit used by the matching-jobs panel when none is given.
pub const DEFAULT_JOB_MATCH_LIMIT: u32 = 10;
/// Limit used by the matching-CVs panel when none is given.
pub const DEFAULT_CV_MATCH_LIMIT: u32 = 8;

/// Operations offered by the remote CV service.
#[async_trait]
pub trait CvApi: Send + Sync {
    async fn cv_ids(&self) -> Result<CvIds, ApiError>;

    async fn cv_details(&self, id: &str) -> Result<CvDetails, ApiError>;

    async fn extract_cvs(&self, files: Vec<UploadFile>) -> Result<Vec<CvDetails>, ApiError>;

    async fn matching_jobs(
        &self,
        cv_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<CvJobMatches, ApiError>;

    async fn chat_history(&self) -> Result<ChatHistory, ApiError>;

    async fn send_chat(&self, message: &str) -> Result<ChatReply, ApiError>;

    async fn clear_chat_history(&self) -> Result<(), ApiError>;

    async fn jobs(&self, query: &JobQuery) -> Result<JobPage, ApiError>;

    async fn job(&self, id: &str) -> Result<Job, ApiError>;

    async fn create_job(&self, job: &NewJob) -> Result<Job, ApiError>;

    async fn matching_cvs(
        &self,
        job_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<JobCvMatches, ApiError>;
}

/// reqwest-backed implementation of `CvApi`.
#[derive(Clone)]
pub struct HttpCvApi {
    client: Client,
    base_url: Url,
}

impl HttpCvApi {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid API base URL: {e}")))?;
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest("API base URL cannot hold a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }
}

#[async_trait]
impl CvApi for HttpCvApi {
    async fn cv_ids(&self) -> Result<CvIds, ApiError> {
        self.get(self.endpoint(&["cv", "ids"])?).await
    }

    async fn cv_details(&self, id: &str) -> Result<CvDetails, ApiError> {
        let record: CvRecord = self.get(self.endpoint(&["cv", id])?).await?;
        record
            .data
            .personal_info
            .validate()
            .map_err(|snippet| ApiError::Malformed { snippet })?;
        Ok(record.into_details(id))
    }

    async fn extract_cvs(&self, files: Vec<UploadFile>) -> Result<Vec<CvDetails>, ApiError> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.file_name)
                .mime_str(&file.content_type)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid content type: {e}")))?;
            form = form.part("files", part);
        }
        let url = self.endpoint(&["cv", "extract"])?;
        debug!("POST {url}");
        let response = self.client.post(url).multipart(form).send().await?;
        let records: OneOrMany<CvRecord> = decode(response).await?;
        Ok(records
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(i, record)| record.into_details(&format!("upload-{}", i + 1)))
            .collect())
    }

    async fn matching_jobs(
        &self,
        cv_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<CvJobMatches, ApiError> {
        let mut url = self.endpoint(&["cv", cv_id, "jobs"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("refresh", &refresh.to_string());
        self.get(url).await
    }

    async fn chat_history(&self) -> Result<ChatHistory, ApiError> {
        self.get(self.endpoint(&["cv", "chat", "history"])?).await
    }

    async fn send_chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        let url = self.endpoint(&["cv", "chat"])?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(&ChatRequest {
                message: message.to_string(),
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn clear_chat_history(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["cv", "chat", "history"])?;
        debug!("DELETE {url}");
        let response = self.client.delete(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            // Some deployments answer 2xx with an empty body.
            return match serde_json::from_str::<Envelope<serde_json::Value>>(&body) {
                Ok(envelope) if !envelope.success => Err(ApiError::Rejected {
                    message: envelope
                        .message
                        .unwrap_or_else(|| "Failed to clear chat".to_string()),
                }),
                _ => Ok(()),
            };
        }
        Err(status_error(status, &body))
    }

    async fn jobs(&self, query: &JobQuery) -> Result<JobPage, ApiError> {
        let mut url = self.endpoint(&["jobs"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("limit", &query.limit.to_string());
            if !query.search.is_empty() {
                pairs.append_pair("search", &query.search);
            }
        }
        self.get(url).await
    }

    async fn job(&self, id: &str) -> Result<Job, ApiError> {
        self.get(self.endpoint(&["jobs", id])?).await
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, ApiError> {
        let url = self.endpoint(&["jobs"])?;
        debug!("POST {url}");
        let response = self.client.post(url).json(job).send().await?;
        decode(response).await
    }

    async fn matching_cvs(
        &self,
        job_id: &str,
        limit: u32,
        refresh: bool,
    ) -> Result<JobCvMatches, ApiError> {
        let mut url = self.endpoint(&["jobs", job_id, "matches"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("refresh", &refresh.to_string());
        self.get(url).await
    }
}

/// Reads a response body and unwraps its envelope into `T`.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    decode_body(&body)
}

/// Envelope handling shared by every endpoint: `success: false` is a
/// rejection carrying the service's message; anything that does not fit the
/// expected shape is malformed.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|_| ApiError::malformed(body))?;

    if !envelope.success {
        return Err(ApiError::Rejected {
            message: envelope
                .message
                .unwrap_or_else(|| "The request was not successful".to_string()),
        });
    }

    let data = envelope.data.ok_or_else(|| ApiError::malformed(body))?;
    serde_json::from_value(data).map_err(|e| {
        warn!("Response did not match the expected shape: {e}");
        ApiError::malformed(body)
    })
}

fn status_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
