//! Typed payloads exchanged with the remote CV service.
//!
//! Deserializing into these types is the schema check at the API boundary:
//! a body that does not fit fails with `ApiError::Malformed` instead of
//! leaking half-populated values into the views.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Envelope
// ────────────────────────────────────────────────────────────────────────────

/// `{ success, message?, data? }` wrapper around every response.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Treats an explicit `null` the same as a missing list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

// ────────────────────────────────────────────────────────────────────────────
// CV records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvIds {
    pub count: usize,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub summary: Option<String>,
}

impl PersonalInfo {
    /// Checks the one field with a format constraint: `email`, when present,
    /// must look like an address.
    pub fn validate(&self) -> Result<(), String> {
        match self.email.as_deref() {
            Some(email) if !looks_like_email(email) => {
                Err(format!("personalInfo.email '{email}' is not a valid email"))
            }
            _ => Ok(()),
        }
    }
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillGroup {
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub expires: Option<bool>,
    pub expiration_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Language {
    pub language: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub technologies: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Publication {
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authors: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Award {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    pub name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub contact: Option<String>,
    pub relationship: Option<String>,
}

/// Structured sections extracted from one CV.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvData {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub experience: Vec<Experience>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<SkillGroup>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub certifications: Vec<Certification>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub languages: Vec<Language>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub projects: Vec<Project>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publications: Vec<Publication>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub awards: Vec<Award>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<Reference>,
}

/// CV record as stored by the remote service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub file_name: Option<String>,
    #[serde(flatten)]
    pub data: CvData,
    pub raw_text: Option<String>,
    pub extracted_at: Option<String>,
}

impl CvRecord {
    /// Projects the stored record into the shape the views render.
    /// The requested id stands in when the record carries no `_id`.
    pub fn into_details(self, fallback_id: &str) -> CvDetails {
        CvDetails {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            file_name: self.file_name,
            extracted_data: self.data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvDetails {
    pub id: String,
    pub file_name: Option<String>,
    pub extracted_data: CvData,
}

impl CvDetails {
    /// The candidate's name, if extraction found a non-blank one.
    pub fn person_name(&self) -> Option<&str> {
        self.extracted_data
            .personal_info
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// `POST /cv/extract` answers with one record or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// A file queued for extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// Salary is either a structured range or free text, depending on how the job was created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Salary {
    Range { min: f64, max: f64, currency: String },
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub company: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub responsibilities: Vec<String>,
    pub location: Option<String>,
    pub salary: Option<Salary>,
    pub job_type: Option<String>,
    pub employment_type: Option<String>,
    pub remote: Option<bool>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
    pub active: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobPage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jobs: Vec<Job>,
    pub pagination: Pagination,
}

/// Query for `GET /jobs`. An empty search is omitted from the request.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub page: usize,
    pub limit: usize,
    pub search: String,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

/// Body of `POST /jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub salary: SalaryRange,
    pub employment_type: String,
    pub remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posting_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Matches
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchAnalysis {
    pub score: f64,
    #[serde(default)]
    pub analysis: String,
}

/// Per-criterion breakdown of one CV/job pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchDetails {
    pub skills: MatchAnalysis,
    pub experience: MatchAnalysis,
    pub education: MatchAnalysis,
    pub overall: MatchAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    pub job: JobSummary,
    pub score: f64,
    pub match_details: MatchDetails,
    #[serde(default)]
    pub from_cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CvSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvMatch {
    pub cv: CvSummary,
    pub score: f64,
    pub match_details: MatchDetails,
    #[serde(default)]
    pub from_cache: bool,
}

/// Jobs ranked against one CV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvJobMatches {
    pub cv_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub matches: Vec<JobMatch>,
}

/// CVs ranked against one job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobCvMatches {
    pub job_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub matches: Vec<CvMatch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Chat
// ────────────────────────────────────────────────────────────────────────────

/// One stored question/answer pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

/// History as returned by the service: latest exchange first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatHistory {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<ChatExchange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}
