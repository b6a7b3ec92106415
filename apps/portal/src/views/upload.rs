//! CV upload form: file selection, type checks and submission.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::api::models::{CvDetails, UploadFile};
use crate::api::{ApiError, CvApi};

const ACCEPTED: &[&str] = &["application/pdf", "image/png", "image/jpeg"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{file_name} is not a PDF, PNG or JPEG file")]
    Unsupported { file_name: String },

    #[error("Please select at least one file")]
    NoFiles,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl UploadError {
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Content type for an accepted upload, guessed from the file extension.
pub fn detect_content_type(file_name: &str) -> Result<String, UploadError> {
    mime_guess::from_path(file_name)
        .iter()
        .map(|m| m.essence_str().to_string())
        .find(|m| ACCEPTED.contains(&m.as_str()))
        .ok_or_else(|| UploadError::Unsupported {
            file_name: file_name.to_string(),
        })
}

/// Human-readable size: kilobytes with one decimal.
pub fn size_label(len: usize) -> String {
    format!("{:.1} KB", len as f64 / 1024.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub file_name: String,
    pub size: String,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<UploadFile>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, file_name: &str, bytes: Bytes) -> Result<(), UploadError> {
        let content_type = detect_content_type(file_name)?;
        self.files.push(UploadFile {
            file_name: file_name.to_string(),
            content_type,
            bytes,
        });
        Ok(())
    }

    pub fn remove_file(&mut self, index: usize) -> Option<UploadFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|f| FileSummary {
                file_name: f.file_name.clone(),
                size: size_label(f.bytes.len()),
            })
            .collect()
    }

    /// Sends the selected files for extraction. The selection is cleared on success.
    pub async fn submit(&mut self, api: &dyn CvApi) -> Result<Vec<CvDetails>, UploadError> {
        if self.files.is_empty() {
            return Err(UploadError::NoFiles);
        }
        let records = api.extract_cvs(self.files.clone()).await?;
        info!("extracted {} CV record(s) from {} file(s)", records.len(), self.files.len());
        self.files.clear();
        Ok(records)
    }
}
