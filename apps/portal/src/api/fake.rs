//! In-memory `CvApi` used by unit tests across the crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Notify;

use super::models::{
    ChatExchange, ChatHistory, ChatReply, CvData, CvDetails, CvIds, CvJobMatches, CvMatch,
    CvSummary, Job, JobCvMatches, JobMatch, JobPage, JobQuery, JobSummary, MatchAnalysis,
    MatchDetails, NewJob, Pagination, PersonalInfo, UploadFile,
};
use super::{ApiError, CvApi};

/// Canned outcome for one endpoint.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Rejected(String),
    Offline,
}

impl<T: Clone> Reply<T> {
    fn to_result(&self) -> Result<T, ApiError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Rejected(message) => Err(ApiError::Rejected {
                message: message.clone(),
            }),
            Reply::Offline => Err(ApiError::Transport("connection refused".into())),
        }
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub ids: Mutex<Option<Reply<CvIds>>>,
    pub cvs: Mutex<HashMap<String, Reply<CvDetails>>>,
    pub jobs: Mutex<Vec<Job>>,
    pub jobs_failure: Mutex<Option<Reply<JobPage>>>,
    pub job_matches: Mutex<HashMap<String, Reply<CvJobMatches>>>,
    pub cv_matches: Mutex<HashMap<String, Reply<JobCvMatches>>>,
    pub history: Mutex<Vec<ChatExchange>>,
    pub chat_reply: Mutex<Option<Reply<ChatReply>>>,
    pub created: Mutex<Vec<NewJob>>,
    pub uploads: Mutex<Vec<String>>,
    /// Detail fetches for these ids wait until the gate is notified.
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(self, ids: &[&str]) -> Self {
        *self.ids.lock().unwrap() = Some(Reply::Ok(CvIds {
            count: ids.len(),
            ids: ids.iter().map(|s| s.to_string()).collect(),
        }));
        self
    }

    pub fn with_cv(self, id: &str, name: Option<&str>) -> Self {
        self.cvs
            .lock()
            .unwrap()
            .insert(id.to_string(), Reply::Ok(cv(id, name)));
        self
    }

    pub fn with_jobs(self, jobs: Vec<Job>) -> Self {
        *self.jobs.lock().unwrap() = jobs;
        self
    }

    pub fn set_ids(&self, reply: Reply<CvIds>) {
        *self.ids.lock().unwrap() = Some(reply);
    }

    pub fn set_cv(&self, id: &str, reply: Reply<CvDetails>) {
        self.cvs.lock().unwrap().insert(id.to_string(), reply);
    }

    pub fn set_job_matches(&self, cv_id: &str, reply: Reply<CvJobMatches>) {
        self.job_matches
            .lock()
            .unwrap()
            .insert(cv_id.to_string(), reply);
    }

    pub fn set_cv_matches(&self, job_id: &str, reply: Reply<JobCvMatches>) {
        self.cv_matches
            .lock()
            .unwrap()
            .insert(job_id.to_string(), reply);
    }

    /// Holds fetches keyed by `id` (a CV, a job, a match target, or `"chat_history"`)
    /// until the returned gate is notified.
    pub fn gate(&self, id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(id.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
    }

    async fn wait_gate(&self, id: &str) {
        let gate = self.gates.lock().unwrap().remove(id);
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl CvApi for FakeApi {
    async fn cv_ids(&self) -> Result<CvIds, ApiError> {
        self.record("cv_ids");
        self.ids
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Reply::Ok(CvIds {
                count: 0,
                ids: vec![],
            }))
            .to_result()
    }

    async fn cv_details(&self, id: &str) -> Result<CvDetails, ApiError> {
        self.record("cv_details");
        self.wait_gate(id).await;
        let reply = self.cvs.lock().unwrap().get(id).cloned();
        reply
            .unwrap_or_else(|| Reply::Rejected(format!("CV {id} not found")))
            .to_result()
    }

    async fn extract_cvs(&self, files: Vec<UploadFile>) -> Result<Vec<CvDetails>, ApiError> {
        self.record("extract_cvs");
        let mut uploads = self.uploads.lock().unwrap();
        Ok(files
            .into_iter()
            .map(|f| {
                uploads.push(f.file_name.clone());
                cv(&format!("cv-{}", uploads.len()), Some(&f.file_name))
            })
            .collect())
    }

    async fn matching_jobs(
        &self,
        cv_id: &str,
        _limit: u32,
        _refresh: bool,
    ) -> Result<CvJobMatches, ApiError> {
        self.record("matching_jobs");
        self.wait_gate(cv_id).await;
        let reply = self.job_matches.lock().unwrap().get(cv_id).cloned();
        reply
            .unwrap_or_else(|| {
                Reply::Ok(CvJobMatches {
                    cv_id: cv_id.to_string(),
                    matches: vec![job_match("job-1", 82.0)],
                })
            })
            .to_result()
    }

    async fn chat_history(&self) -> Result<ChatHistory, ApiError> {
        self.record("chat_history");
        self.wait_gate("chat_history").await;
        Ok(ChatHistory {
            history: self.history.lock().unwrap().clone(),
        })
    }

    async fn send_chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.record("send_chat");
        let reply = self.chat_reply.lock().unwrap().clone();
        reply
            .unwrap_or_else(|| {
                Reply::Ok(ChatReply {
                    response: format!("[CV] You asked: {message}"),
                })
            })
            .to_result()
    }

    async fn clear_chat_history(&self) -> Result<(), ApiError> {
        self.record("clear_chat_history");
        self.history.lock().unwrap().clear();
        Ok(())
    }

    async fn jobs(&self, query: &JobQuery) -> Result<JobPage, ApiError> {
        self.record("jobs");
        if let Some(failure) = self.jobs_failure.lock().unwrap().clone() {
            return failure.to_result();
        }
        let needle = query.search.to_lowercase();
        let matching: Vec<Job> = self
            .jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| needle.is_empty() || j.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = matching.len();
        let total_pages = total.div_ceil(query.limit.max(1));
        let jobs = matching
            .into_iter()
            .skip((query.page.saturating_sub(1)) * query.limit)
            .take(query.limit)
            .collect();
        Ok(JobPage {
            jobs,
            pagination: Pagination {
                total,
                page: query.page,
                limit: query.limit,
                total_pages,
                has_next: query.page < total_pages,
                has_prev: query.page > 1,
            },
        })
    }

    async fn job(&self, id: &str) -> Result<Job, ApiError> {
        self.record("job");
        self.wait_gate(id).await;
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                message: "Job not found".into(),
            })
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job, ApiError> {
        self.record("create_job");
        self.created.lock().unwrap().push(job.clone());
        let mut jobs = self.jobs.lock().unwrap();
        let created = self::job(&format!("job-{}", jobs.len() + 1), &job.title);
        jobs.push(created.clone());
        Ok(created)
    }

    async fn matching_cvs(
        &self,
        job_id: &str,
        _limit: u32,
        _refresh: bool,
    ) -> Result<JobCvMatches, ApiError> {
        self.record("matching_cvs");
        self.wait_gate(job_id).await;
        let reply = self.cv_matches.lock().unwrap().get(job_id).cloned();
        reply
            .unwrap_or_else(|| {
                Reply::Ok(JobCvMatches {
                    job_id: job_id.to_string(),
                    matches: vec![cv_match("cv-1", 74.0)],
                })
            })
            .to_result()
    }
}

pub fn cv(id: &str, name: Option<&str>) -> CvDetails {
    CvDetails {
        id: id.to_string(),
        file_name: Some(format!("{id}.pdf")),
        extracted_data: CvData {
            personal_info: PersonalInfo {
                name: name.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        },
    }
}

pub fn job(id: &str, title: &str) -> Job {
    Job {
        id: id.to_string(),
        title: title.to_string(),
        company: Some("Acme".into()),
        description: None,
        requirements: vec![],
        skills: vec![],
        responsibilities: vec![],
        location: Some("Remote".into()),
        salary: None,
        job_type: None,
        employment_type: None,
        remote: Some(true),
        industry: None,
        experience_level: None,
        education_level: None,
        active: Some(true),
        created_at: None,
        updated_at: None,
    }
}

fn analysis(score: f64) -> MatchAnalysis {
    MatchAnalysis {
        score,
        analysis: String::new(),
    }
}

fn details(score: f64) -> MatchDetails {
    MatchDetails {
        skills: analysis(score),
        experience: analysis(score),
        education: analysis(score),
        overall: analysis(score),
    }
}

pub fn job_match(job_id: &str, score: f64) -> JobMatch {
    JobMatch {
        job: JobSummary {
            id: job_id.to_string(),
            title: "Engineer".into(),
            company: Some("Acme".into()),
        },
        score,
        match_details: details(score),
        from_cache: false,
    }
}

pub fn cv_match(cv_id: &str, score: f64) -> CvMatch {
    CvMatch {
        cv: CvSummary {
            id: cv_id.to_string(),
            name: Some("Jane Smith".into()),
            email: None,
        },
        score,
        match_details: details(score),
        from_cache: false,
    }
}

pub fn exchange(message: &str, response: &str, minute: u32) -> ChatExchange {
    ChatExchange {
        message: message.to_string(),
        response: response.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
    }
}
