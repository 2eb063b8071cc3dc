//! [`ReplyChannel`]: the single terminal response written for a request.
//!
//! The channel can be finalized exactly once. After [`ReplyChannel::send`]
//! succeeds, further sends fail with [`ReplyError::AlreadySent`] and status or
//! header changes are ignored. [`ReplyChannel::end`] marks the underlying
//! connection for termination without writing anything new.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use common::{protocol::PROBLEM_JSON, ProblemPayload};
use thiserror::Error;

/// Errors from writing to a [`ReplyChannel`].
#[derive(Debug, Error)]
pub enum ReplyError {
    /// The channel was already finalized.
    #[error("reply already sent")]
    AlreadySent,

    /// A header name is not a valid HTTP token.
    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),

    /// A header value contains bytes not allowed in HTTP headers.
    #[error("invalid value for header `{0}`")]
    InvalidHeaderValue(String),

    /// A problem payload could not be encoded.
    #[error("failed to encode problem payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Finalize-once builder for the response of a single request.
#[derive(Debug)]
pub struct ReplyChannel {
    status: StatusCode,
    headers: HeaderMap,
    /// `Some` once the reply has been sent.
    body: Option<Bytes>,
    close: bool,
}

impl ReplyChannel {
    /// Create an open channel with status 200 and no headers.
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
            close: false,
        }
    }

    /// Whether the channel has been finalized.
    pub fn is_sent(&self) -> bool {
        self.body.is_some()
    }

    /// Whether the connection is marked for termination.
    pub fn is_ended(&self) -> bool {
        self.close
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set the status code. Ignored once sent.
    pub fn code(&mut self, status: StatusCode) {
        if !self.is_sent() {
            self.status = status;
        }
    }

    /// Set (replace) a header. Ignored once sent.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::InvalidHeaderName`] or
    /// [`ReplyError::InvalidHeaderValue`] if the pair is not valid HTTP.
    pub fn header(&mut self, name: &str, value: &str) -> Result<(), ReplyError> {
        if self.is_sent() {
            return Ok(());
        }
        let name = HeaderName::try_from(name)
            .map_err(|_| ReplyError::InvalidHeaderName(name.to_owned()))?;
        let value = HeaderValue::try_from(value)
            .map_err(|_| ReplyError::InvalidHeaderValue(name.as_str().to_owned()))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// The `Content-Type` currently set, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Set the `Content-Type` header. Ignored once sent.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::InvalidHeaderValue`] for a malformed media type.
    pub fn set_content_type(&mut self, media_type: &str) -> Result<(), ReplyError> {
        self.header(header::CONTENT_TYPE.as_str(), media_type)
    }

    /// Finalize the channel with `body`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::AlreadySent`] if the channel was already finalized;
    /// the earlier reply is left untouched.
    pub fn send(&mut self, body: impl Into<Bytes>) -> Result<(), ReplyError> {
        if self.is_sent() {
            return Err(ReplyError::AlreadySent);
        }
        self.body = Some(body.into());
        Ok(())
    }

    /// Finalize the channel with a problem payload: `application/problem+json`,
    /// status and headers taken from the payload.
    ///
    /// Payload headers that are not valid HTTP are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::AlreadySent`] if the channel was already finalized.
    pub fn send_problem(&mut self, problem: &ProblemPayload) -> Result<(), ReplyError> {
        if self.is_sent() {
            return Err(ReplyError::AlreadySent);
        }
        let body = serde_json::to_vec(problem)?;
        self.code(
            StatusCode::from_u16(problem.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        );
        for (name, value) in &problem.headers {
            if let Err(e) = self.header(name, value) {
                tracing::warn!(error = %e, "skipping problem header");
            }
        }
        self.set_content_type(PROBLEM_JSON)?;
        self.send(body)
    }

    /// Terminate the underlying connection without writing a new reply.
    pub fn end(&mut self) {
        self.close = true;
    }
}

impl Default for ReplyChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoResponse for ReplyChannel {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        if self.close {
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
        }
        response
    }
}
