//! Request and response types exchanged between the transport and the processor.
//!
//! These types are transport-independent: the HTTP layer builds a
//! [`CanonicalRequest`] from whatever its listener delivers and turns a
//! [`ProcessorResponse`] or [`ProblemPayload`] back into wire bytes.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Media type used for every problem payload.
pub const PROBLEM_JSON: &str = "application/problem+json";

// ---------------------------------------------------------------------------
// Canonical request
// ---------------------------------------------------------------------------

/// The normalized request handed to the processor.
///
/// Built fresh for every request and never mutated once the processor has it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRequest {
    /// Lower-cased HTTP verb (`"get"`, `"post"`, ...).
    pub method: String,
    pub url: RequestUrl,
    /// Header names as delivered by the transport, repeated values joined.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON, a raw form-urlencoded string, or nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Path, query and the optional server base URL of a [`CanonicalRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUrl {
    /// Request path with the query string stripped.
    pub path: String,
    pub query: BTreeMap<String, QueryValue>,
    /// Server base URL selected through the `__server` query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// A query parameter value: a single string, or every value of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Single(String),
    Multiple(Vec<String>),
}

impl QueryValue {
    /// The first value received for this key.
    pub fn first(&self) -> Option<&str> {
        match self {
            QueryValue::Single(v) => Some(v),
            QueryValue::Multiple(vs) => vs.first().map(String::as_str),
        }
    }

    /// Append another value, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                *self = QueryValue::Multiple(vec![std::mem::take(first), value]);
            }
            QueryValue::Multiple(vs) => vs.push(value),
        }
    }
}

impl CanonicalRequest {
    /// First value of query parameter `key`, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.url.query.get(key).and_then(QueryValue::first)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Processor response
// ---------------------------------------------------------------------------

/// Successful processor result: the output to send plus validation diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorResponse {
    pub output: ProcessorOutput,
    #[serde(default)]
    pub validations: Validations,
}

/// The response the processor wants written to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorOutput {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Diagnostics produced while validating the request and the generated output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validations {
    #[serde(default)]
    pub input: Vec<Diagnostic>,
    /// Output diagnostics, in the order the processor produced them.
    #[serde(default)]
    pub output: Vec<Diagnostic>,
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// One validation finding, located by a path into the validated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: Vec<String>,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(path: &[&str], message: impl Into<String>, severity: Severity) -> Self {
        Self {
            path: path.iter().map(|s| (*s).to_owned()).collect(),
            message: message.into(),
            severity,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.path.join(","), self.message)
    }
}

// ---------------------------------------------------------------------------
// Problem payload
// ---------------------------------------------------------------------------

/// Machine-readable error body sent as `application/problem+json`.
///
/// `headers` are written as HTTP response headers and also echoed in the body
/// when present. Extension members (e.g. `validation`) are flattened alongside
/// the standard fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemPayload {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(flatten, default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl ProblemPayload {
    /// Construct a [`ProblemPayload`] without extensions or headers.
    pub fn new(
        problem_type: impl Into<String>,
        title: impl Into<String>,
        status: u16,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            problem_type: problem_type.into(),
            title: title.into(),
            status,
            detail: detail.into(),
            extensions: Map::new(),
            headers: BTreeMap::new(),
        }
    }
}
