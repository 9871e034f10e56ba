pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

use config::Settings;
use services::ResearchService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub research: Arc<ResearchService>,
}

impl AppState {
    pub fn new(settings: Settings, research: ResearchService) -> Self {
        Self {
            settings: Arc::new(settings),
            research: Arc::new(research),
        }
    }
}
