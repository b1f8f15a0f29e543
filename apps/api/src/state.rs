use std::sync::Arc;

use crate::config::Config;
use crate::screening::nlp::TextAnalyzer;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Language pipeline used for name, token and sentence extraction.
    pub analyzer: Arc<dyn TextAnalyzer>,
    /// Where screening sessions live between requests. Backend chosen by SESSION_BACKEND.
    pub sessions: Arc<dyn SessionStore>,
}
