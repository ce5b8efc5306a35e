pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod scraper;
pub mod summarizer;

use std::sync::Arc;
use crate::config::Config;
use crate::llm::TextGenerator;
use crate::scraper::PageFetcher;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Loaded once at startup, read-only afterwards.
    pub model: Arc<dyn TextGenerator>,
    pub fetcher: Arc<dyn PageFetcher>,
}
