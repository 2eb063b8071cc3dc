//! Operation catalog: the static list of API operations handed to the processor.
//!
//! # Responsibilities
//!
//! - Read an OpenAPI 3 document from disk at startup (YAML, falling back to JSON).
//! - Flatten every path item into one [`HttpOperation`] per method, with the
//!   servers, declared responses and examples the processor needs.
//!
//! The catalog is loaded once and shared read-only; nothing in the request
//! path mutates it.

pub mod resolver;

pub use resolver::operations_from_document;

use std::path::{Path, PathBuf};

use openapiv3::OpenAPI;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Errors from loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document could not be read from disk.
    #[error("failed to read OpenAPI document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is neither a YAML nor a JSON OpenAPI 3 document.
    #[error("failed to parse OpenAPI document {0}: not valid YAML or JSON")]
    Parse(PathBuf),
}

/// One API operation: a method on a path template, with its declared responses.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpOperation {
    pub id: Option<String>,
    /// Lower-cased HTTP method.
    pub method: String,
    /// Path template, e.g. `/widgets/{id}`.
    pub path: String,
    /// Server URLs, inherited operation → path item → document.
    pub servers: Vec<String>,
    /// Responses in declaration order.
    pub responses: Vec<ResponseSpec>,
}

/// Status code key of a declared response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Exact(u16),
    /// `1XX`..`5XX`; holds the leading digit.
    Range(u16),
    Default,
}

/// A declared response and its representations.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub code: ResponseCode,
    pub contents: Vec<ContentSpec>,
}

/// A representation of a response under one media type.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSpec {
    pub media_type: String,
    pub examples: Vec<NamedExample>,
}

/// A response example. A lone `example` is keyed `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedExample {
    pub key: String,
    pub value: Value,
}

/// Read and flatten the OpenAPI document at `path`.
///
/// # Errors
///
/// Returns [`CatalogError::Read`] if the file cannot be read and
/// [`CatalogError::Parse`] if it is not an OpenAPI 3 document.
pub async fn load(path: &Path) -> Result<Vec<HttpOperation>, CatalogError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CatalogError::Read {
            path: path.to_owned(),
            source,
        })?;

    let api = parse_document(&text).ok_or_else(|| CatalogError::Parse(path.to_owned()))?;
    let operations = operations_from_document(&api);
    info!(
        path = %path.display(),
        title = %api.info.title,
        operations = operations.len(),
        "operation catalog loaded"
    );
    Ok(operations)
}

/// Parse `text` as YAML, falling back to JSON.
pub fn parse_document(text: &str) -> Option<OpenAPI> {
    if let Ok(parsed) = serde_yaml::from_str(text) {
        Some(parsed)
    } else if let Ok(parsed) = serde_json::from_str(text) {
        Some(parsed)
    } else {
        None
    }
}
