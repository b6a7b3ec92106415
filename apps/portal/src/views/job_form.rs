//! Create-job form model and its validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::{NewJob, SalaryRange};
use crate::api::ApiError;

const REMOTE_LOCATION: &str = "Remote";

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CreateJobError {
    #[error("job form is invalid: {}", summarize(.0))]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CreateJobError {
    pub fn user_message(&self) -> String {
        match self {
            CreateJobError::Invalid(errors) => summarize(errors),
            CreateJobError::Api(e) => e.user_message(),
        }
    }
}

pub fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw form input. `industry`, `experienceLevel` and `educationLevel` are
/// optional and only sent when filled in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub skills: Vec<String>,
    pub salary_min: f64,
    pub salary_max: f64,
    pub salary_currency: String,
    pub employment_type: String,
    pub remote: bool,
    pub posting_date: Option<String>,
    pub application_deadline: Option<String>,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
    pub education_level: Option<String>,
}

impl JobDraft {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Job title is required"));
        }
        if self.company.trim().is_empty() {
            errors.push(FieldError::new("company", "Company name is required"));
        }
        if !self.remote && self.location.trim().is_empty() {
            errors.push(FieldError::new("location", "Location is required"));
        }
        if self.description.trim().is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if self.salary_min < 0.0 {
            errors.push(FieldError::new(
                "salaryMin",
                "Minimum salary cannot be negative",
            ));
        }
        if self.salary_max < self.salary_min {
            errors.push(FieldError::new(
                "salaryMax",
                "Maximum salary must be greater than or equal to minimum salary",
            ));
        }
        if self.salary_currency.trim().is_empty() {
            errors.push(FieldError::new("salaryCurrency", "Currency is required"));
        }
        if self.employment_type.trim().is_empty() {
            errors.push(FieldError::new(
                "employmentType",
                "Employment type is required",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates and converts the draft into the create-job payload.
    /// Remote postings are always sent with the location "Remote".
    pub fn into_new_job(self) -> Result<NewJob, Vec<FieldError>> {
        self.validate()?;
        let location = if self.remote {
            REMOTE_LOCATION.to_string()
        } else {
            self.location.trim().to_string()
        };
        Ok(NewJob {
            title: self.title.trim().to_string(),
            company: self.company.trim().to_string(),
            location,
            description: self.description.trim().to_string(),
            requirements: non_blank(self.requirements),
            skills: non_blank(self.skills),
            salary: SalaryRange {
                min: self.salary_min,
                max: self.salary_max,
                currency: self.salary_currency.trim().to_string(),
            },
            employment_type: self.employment_type.trim().to_string(),
            remote: self.remote,
            posting_date: filled(self.posting_date),
            application_deadline: filled(self.application_deadline),
            industry: filled(self.industry),
            experience_level: filled(self.experience_level),
            education_level: filled(self.education_level),
        })
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
