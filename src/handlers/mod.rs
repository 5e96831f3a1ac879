use std::sync::Arc;

use crate::{
    config::Config,
    database::Repository,
    errors::Result,
    event::EventResponse,
    services::metrics::MetricsService,
    storage::ObjectStore,
};

pub mod generate_video;
pub mod health;
pub mod metrics;
pub mod photos;
pub mod projects;
pub mod upload;
pub mod users;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub storage: Arc<dyn ObjectStore>,
    pub config: Config,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(
        config: Config,
        repository: Arc<dyn Repository>,
        storage: Arc<dyn ObjectStore>,
    ) -> Result<Self> {
        Ok(Self {
            repository,
            storage,
            config,
            metrics: Arc::new(MetricsService::new()?),
        })
    }

    /// Turns a handler outcome into the response sent back, logging and
    /// counting it on the way.
    pub fn finish(&self, handler: &'static str, result: Result<EventResponse>) -> EventResponse {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                if e.status_code().is_server_error() {
                    tracing::error!(handler, "Request failed: {}", e);
                } else {
                    tracing::debug!(handler, "Request rejected: {}", e);
                }
                EventResponse::error(&e)
            }
        };

        self.metrics.record_request(handler, response.status_code);
        tracing::info!(handler, status = response.status_code, "Handled request");
        response
    }
}
