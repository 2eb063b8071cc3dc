//! Domain errors reported by a processor and their problem-payload form.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::protocol::{Diagnostic, ProblemPayload};

/// Prefix of every problem `type` URI.
pub const PROBLEM_TYPE_BASE: &str = "urn:mockgate:error:";

/// Failure decided by the processor.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`DomainError::NoPathMatched`], [`DomainError::NoServerMatched`],
///   [`DomainError::NotFound`] → 404
/// - [`DomainError::NoMethodMatched`] → 405
/// - [`DomainError::NotAcceptable`] → 406
/// - [`DomainError::Unauthorized`] → 401
/// - [`DomainError::UnprocessableEntity`] → 422
/// - [`DomainError::Unsupported`] → 501
/// - [`DomainError::Violations`], [`DomainError::Internal`] → 500
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// No operation declares the requested path.
    #[error("route not resolved, no path matched: {0}")]
    NoPathMatched(String),

    /// The path exists but not for the requested method.
    #[error("route resolved, but no method matched: {0}")]
    NoMethodMatched(String),

    /// The `__server` base URL is not among the operation's servers.
    #[error("route resolved, but no server matched: {0}")]
    NoServerMatched(String),

    /// The requested status code or example is not declared.
    #[error("the server cannot find the requested content: {0}")]
    NotFound(String),

    /// No declared representation satisfies the `Accept` header.
    #[error("the server cannot produce a representation for your accept header: {0}")]
    NotAcceptable(String),

    /// The request failed validation.
    #[error("invalid request: {detail}")]
    UnprocessableEntity {
        detail: String,
        validation: Vec<Diagnostic>,
    },

    /// The request does not satisfy the operation's security requirements.
    #[error("invalid security scheme used: {detail}")]
    Unauthorized {
        detail: String,
        www_authenticate: String,
    },

    /// The produced response violates the declared contract.
    #[error("response violates the declared contract: {0}")]
    Violations(String),

    /// The processor does not support what the configuration asks for.
    #[error("not supported: {0}")]
    Unsupported(String),

    /// An unexpected processor failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            DomainError::NoPathMatched(_)
            | DomainError::NoServerMatched(_)
            | DomainError::NotFound(_) => 404,
            DomainError::NoMethodMatched(_) => 405,
            DomainError::NotAcceptable(_) => 406,
            DomainError::Unauthorized { .. } => 401,
            DomainError::UnprocessableEntity { .. } => 422,
            DomainError::Unsupported(_) => 501,
            DomainError::Violations(_) | DomainError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable identifier appended to [`PROBLEM_TYPE_BASE`].
    pub fn slug(&self) -> &'static str {
        match self {
            DomainError::NoPathMatched(_) => "NO_PATH_MATCHED_ERROR",
            DomainError::NoMethodMatched(_) => "NO_METHOD_MATCHED_ERROR",
            DomainError::NoServerMatched(_) => "NO_SERVER_MATCHED_ERROR",
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::NotAcceptable(_) => "NOT_ACCEPTABLE",
            DomainError::Unauthorized { .. } => "UNAUTHORIZED",
            DomainError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            DomainError::Violations(_) => "VIOLATIONS",
            DomainError::Unsupported(_) => "NOT_IMPLEMENTED",
            DomainError::Internal(_) => "UNKNOWN",
        }
    }

    /// Short human-readable summary shared by every error of this kind.
    pub fn title(&self) -> &'static str {
        match self {
            DomainError::NoPathMatched(_) => "Route not resolved, no path matched",
            DomainError::NoMethodMatched(_) => "Route resolved, but no method matched",
            DomainError::NoServerMatched(_) => "Route resolved, but no server matched",
            DomainError::NotFound(_) => "The server cannot find the requested content",
            DomainError::NotAcceptable(_) => {
                "The server cannot produce a representation for your accept header"
            }
            DomainError::Unauthorized { .. } => "Invalid security scheme used",
            DomainError::UnprocessableEntity { .. } => "Invalid request",
            DomainError::Violations(_) => "Request/Response not valid",
            DomainError::Unsupported(_) => "Not implemented",
            DomainError::Internal(_) => "Internal error",
        }
    }

    /// Instance-specific explanation.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::NoPathMatched(d)
            | DomainError::NoMethodMatched(d)
            | DomainError::NoServerMatched(d)
            | DomainError::NotFound(d)
            | DomainError::NotAcceptable(d)
            | DomainError::Violations(d)
            | DomainError::Unsupported(d)
            | DomainError::Internal(d) => d,
            DomainError::UnprocessableEntity { detail, .. }
            | DomainError::Unauthorized { detail, .. } => detail,
        }
    }

    /// Response headers the error requires (e.g. `WWW-Authenticate` on 401).
    pub fn headers(&self) -> BTreeMap<String, String> {
        match self {
            DomainError::Unauthorized {
                www_authenticate, ..
            } => BTreeMap::from([("www-authenticate".to_owned(), www_authenticate.clone())]),
            _ => BTreeMap::new(),
        }
    }
}

impl From<&DomainError> for ProblemPayload {
    fn from(err: &DomainError) -> Self {
        let mut payload = ProblemPayload::new(
            format!("{PROBLEM_TYPE_BASE}{}", err.slug()),
            err.title(),
            err.http_status(),
            err.detail(),
        );
        if let DomainError::UnprocessableEntity { validation, .. } = err {
            if let Ok(v) = serde_json::to_value(validation) {
                payload.extensions.insert("validation".into(), v);
            }
        }
        payload.headers = err.headers();
        payload
    }
}
