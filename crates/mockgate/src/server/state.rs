//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use common::RequestConfig;

use crate::catalog::HttpOperation;
use crate::processor::{ExampleProcessor, Processor};

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped so that Axum can clone the state for each
/// request without copying the catalog. Nothing here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    /// Engine that mocks or validates each request.
    pub processor: Arc<dyn Processor>,
    /// Operation catalog loaded at startup.
    pub operations: Arc<[HttpOperation]>,
    /// Process-wide defaults, refined per request by the config resolver.
    pub config: Arc<RequestConfig>,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(
        processor: Arc<dyn Processor>,
        operations: Vec<HttpOperation>,
        config: RequestConfig,
    ) -> Self {
        Self {
            processor,
            operations: operations.into(),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    /// Example processor, empty catalog, default config; suitable for tests.
    fn default() -> Self {
        Self::new(
            Arc::new(ExampleProcessor),
            Vec::new(),
            RequestConfig::default(),
        )
    }
}
