use std::sync::Arc;

use crate::api::CvApi;
use crate::config::Config;
use crate::matching::MatchService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn CvApi>,
    /// Match lookups share one cache across requests.
    pub matches: Arc<MatchService>,
    pub config: Config,
}
