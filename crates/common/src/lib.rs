//! Canonical request, processor response, configuration and error types shared
//! across `mockgate` crates.

pub mod error;
pub mod protocol;
pub mod request_config;

pub use error::DomainError;
pub use protocol::{CanonicalRequest, ProblemPayload, ProcessorResponse};
pub use request_config::{MockConfig, MockOverride, MockSetting, RequestConfig};
