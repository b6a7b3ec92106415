pub mod chat;
pub mod health;
pub mod jobs;
pub mod records;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::state::AppState;

/// `?limit&refresh` on the match endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MatchQuery {
    pub limit: Option<u32>,
    #[serde(default)]
    pub refresh: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV records
        .route("/actions/records", get(records::handle_list_records))
        .route(
            "/actions/records/extract",
            post(records::handle_extract_records),
        )
        .route("/actions/records/:id", get(records::handle_get_record))
        .route(
            "/actions/records/:id/jobs",
            get(records::handle_matching_jobs),
        )
        // Chat
        .route(
            "/actions/chat/history",
            get(chat::handle_chat_history).delete(chat::handle_clear_history),
        )
        .route("/actions/chat", post(chat::handle_send_message))
        // Jobs
        .route(
            "/actions/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/actions/jobs/:id", get(jobs::handle_get_job))
        .route("/actions/jobs/:id/matches", get(jobs::handle_matching_cvs))
        .with_state(state)
}
