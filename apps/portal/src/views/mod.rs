// Headless view models for the portal screens.
// Each view composes the panel state machines over the `CvApi` client and
// owns its own state; renderers read snapshots and call the async actions.

pub mod chat;
pub mod job_form;
pub mod jobs;
pub mod matches;
pub mod records;
pub mod upload;

pub use chat::ChatView;
pub use job_form::{CreateJobError, FieldError, JobDraft};
pub use jobs::JobsView;
pub use matches::{MatchingCvsView, MatchingJobsView, ScoreBand};
pub use records::RecordsView;
pub use upload::{UploadError, UploadForm};
