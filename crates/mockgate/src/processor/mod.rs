//! The processor seam: the engine that mocks or validates a canonical request.
//!
//! The HTTP layer only knows the [`Processor`] trait. [`ExampleProcessor`] is
//! the bundled implementation that serves declared examples from the catalog.

pub mod examples;

pub use examples::ExampleProcessor;

use async_trait::async_trait;
use common::{CanonicalRequest, DomainError, ProcessorResponse, RequestConfig};

use crate::catalog::HttpOperation;

/// Engine invoked once per request with the normalized input.
///
/// Implementations own matching, validation and mocking; the caller only folds
/// the outcome into a reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Processor: Send + Sync {
    async fn request(
        &self,
        input: &CanonicalRequest,
        operations: &[HttpOperation],
        config: &RequestConfig,
    ) -> Result<ProcessorResponse, DomainError>;
}
