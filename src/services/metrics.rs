use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::errors::{AppError, Result};

pub struct MetricsService {
    registry: Registry,
    requests: IntCounterVec,
    stored_bytes: IntCounterVec,
}

impl MetricsService {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("slideshow_requests_total", "Handled requests by handler and status"),
            &["handler", "status"],
        )
        .map_err(metrics_error)?;
        let stored_bytes = IntCounterVec::new(
            Opts::new("slideshow_stored_bytes_total", "Bytes written to object storage"),
            &["kind"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(requests.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(stored_bytes.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            requests,
            stored_bytes,
        })
    }

    pub fn record_request(&self, handler: &str, status: u16) {
        self.requests
            .with_label_values(&[handler, &status.to_string()])
            .inc();
    }

    pub fn record_stored_bytes(&self, kind: &str, bytes: usize) {
        self.stored_bytes
            .with_label_values(&[kind])
            .inc_by(bytes as u64);
    }

    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal(e.into()))
    }
}

fn metrics_error(e: prometheus::Error) -> AppError {
    AppError::Internal(e.into())
}
