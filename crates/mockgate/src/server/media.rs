//! Request body classification by declared media type.
//!
//! Only two families are accepted: JSON (`application/json` and
//! `application/*+json`), parsed strictly, and `application/x-www-form-urlencoded`,
//! passed through as a raw string. Anything else is rejected with 415 before
//! the processor is involved.

use async_trait::async_trait;
use axum::{
    extract::{rejection::BytesRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use common::{error::PROBLEM_TYPE_BASE, ProblemPayload};
use serde_json::Value;
use thiserror::Error;

use super::reply::ReplyChannel;

/// `application/x-www-form-urlencoded`.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Rejection produced while reading or classifying a request body.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The declared content type is not JSON or form-urlencoded.
    #[error("Unsupported media type `{0}`")]
    UnsupportedMediaType(String),

    /// The body claims to be JSON but does not parse.
    #[error("invalid JSON body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The transport failed to deliver the body (e.g. over the size limit).
    #[error(transparent)]
    Read(#[from] BytesRejection),
}

impl MediaError {
    /// Returns the HTTP status code that should be sent for this rejection.
    pub fn http_status(&self) -> StatusCode {
        match self {
            MediaError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            MediaError::Parse(_) => StatusCode::BAD_REQUEST,
            MediaError::Read(rejection) => rejection.status(),
        }
    }

    fn problem(&self) -> ProblemPayload {
        let (slug, title) = match self {
            MediaError::UnsupportedMediaType(_) => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
            MediaError::Parse(_) => ("INVALID_JSON_BODY", "Request body is not valid JSON"),
            MediaError::Read(_) => ("BODY_READ_FAILED", "Request body could not be read"),
        };
        ProblemPayload::new(
            format!("{PROBLEM_TYPE_BASE}{slug}"),
            title,
            self.http_status().as_u16(),
            self.to_string(),
        )
    }
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let mut reply = ReplyChannel::new();
        if let Err(e) = reply.send_problem(&self.problem()) {
            tracing::warn!(error = %e, "failed to write media rejection");
            return self.http_status().into_response();
        }
        reply.into_response()
    }
}

/// The request body after media-type classification.
///
/// `None` for an empty body, a JSON value for JSON bodies, and a
/// [`Value::String`] holding the raw text for form-urlencoded bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Option<Value>);

#[async_trait]
impl<S> FromRequest<S> for ParsedBody
where
    S: Send + Sync,
{
    type Rejection = MediaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = Bytes::from_request(req, state).await?;
        parse_body(content_type.as_deref(), &bytes).map(ParsedBody)
    }
}

/// Classify and parse `body` according to `content_type`.
///
/// # Errors
///
/// [`MediaError::Parse`] for malformed JSON and
/// [`MediaError::UnsupportedMediaType`] for any non-empty body outside the
/// accepted families, including one without a content type.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Option<Value>, MediaError> {
    if body.is_empty() {
        return Ok(None);
    }
    let declared = content_type.unwrap_or_default();
    if is_json(declared) {
        return Ok(Some(serde_json::from_slice(body)?));
    }
    if essence(declared) == FORM_URLENCODED {
        return Ok(Some(Value::String(String::from_utf8_lossy(body).into_owned())));
    }
    Err(MediaError::UnsupportedMediaType(declared.to_owned()))
}

/// `true` for `application/json` and any `application/*+json` type.
pub fn is_json(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json"
        || essence
            .strip_prefix("application/")
            .is_some_and(|sub| sub.ends_with("+json"))
}

/// Lower-cased `type/subtype` with parameters removed.
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_family_detection() {
        assert!(is_json("application/json"));
        assert!(is_json("application/JSON; charset=utf-8"));
        assert!(is_json("application/vnd.api+json"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/json+plain"));
        assert!(!is_json("text/plain"));
        assert!(!is_json(""));
    }

    #[test]
    fn json_body_parsed_exactly() {
        for value in [json!(1), json!("s"), json!(null), json!([1, {"a": true}]), json!({"id": 1})] {
            let raw = serde_json::to_vec(&value).unwrap();
            assert_eq!(parse_body(Some("application/json"), &raw).unwrap(), Some(value));
        }
    }

    #[test]
    fn vendor_json_accepted() {
        let parsed = parse_body(Some("application/merge-patch+json"), br#"{"a":1}"#).unwrap();
        assert_eq!(parsed, Some(json!({"a": 1})));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_body(Some("application/json"), b"{not valid").unwrap_err();
        assert!(matches!(err, MediaError::Parse(_)));
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn form_body_passed_through_raw() {
        let parsed = parse_body(Some(FORM_URLENCODED), b"a=1&b=%20x").unwrap();
        assert_eq!(parsed, Some(Value::String("a=1&b=%20x".into())));
    }

    #[test]
    fn other_types_rejected_with_415() {
        for ct in [Some("text/plain"), Some("application/xml"), None] {
            let err = parse_body(ct, b"<a/>").unwrap_err();
            assert_eq!(err.http_status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
    }

    #[test]
    fn empty_body_is_none_for_any_type() {
        assert_eq!(parse_body(Some("text/plain"), b"").unwrap(), None);
        assert_eq!(parse_body(None, b"").unwrap(), None);
    }

    #[test]
    fn rejection_renders_problem_json() {
        let resp = MediaError::UnsupportedMediaType("text/plain".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/problem+json");
    }
}
