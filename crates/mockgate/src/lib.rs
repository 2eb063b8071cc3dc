//! `mockgate`: HTTP front end for an OpenAPI mock and validation processor.
//!
//! Incoming requests are classified by media type, normalized into a
//! [`common::CanonicalRequest`], paired with a per-request
//! [`common::RequestConfig`] and handed to a [`processor::Processor`]. The
//! processor outcome is folded into exactly one HTTP response.

pub mod catalog;
pub mod config;
pub mod processor;
pub mod server;
pub mod telemetry;
