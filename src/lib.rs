pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::services::ai_service::{GeminiService, QuizGenerator};
use crate::utils::timing::QuizPolicy;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub quiz_generator: Arc<dyn QuizGenerator>,
    pub policy: Arc<QuizPolicy>,
}

impl AppState {
    pub fn new(config: &Config) -> error::Result<Self> {
        let timeout = Duration::from_secs(config.ai_timeout_secs);
        let http_client = Client::builder().timeout(timeout).build()?;

        let gemini = GeminiService::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_api_url.clone(),
            timeout,
            http_client,
        );

        Ok(Self::with_generator(Arc::new(gemini)))
    }

    pub fn with_generator(quiz_generator: Arc<dyn QuizGenerator>) -> Self {
        Self {
            quiz_generator,
            policy: Arc::new(QuizPolicy::default()),
        }
    }
}
