//! [`ExampleProcessor`]: serves the examples declared in the operation catalog.
//!
//! Deliberately shallow. No schema validation, no dynamic body generation and
//! no security checks; the diagnostics list is always empty.

use std::collections::BTreeMap;

use async_trait::async_trait;
use common::protocol::{ProcessorOutput, Validations};
use common::{CanonicalRequest, DomainError, MockSetting, ProcessorResponse, RequestConfig};
use serde_json::Value;

use super::Processor;
use crate::catalog::{ContentSpec, HttpOperation, ResponseCode, ResponseSpec};
use crate::server::media::essence;

/// Processor answering every request with a declared example.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleProcessor;

#[async_trait]
impl Processor for ExampleProcessor {
    async fn request(
        &self,
        input: &CanonicalRequest,
        operations: &[HttpOperation],
        config: &RequestConfig,
    ) -> Result<ProcessorResponse, DomainError> {
        let MockSetting::Enabled(mock) = &config.mock else {
            return Err(DomainError::Unsupported(
                "mocking is disabled and no upstream is configured".into(),
            ));
        };

        let operation = match_operation(input, operations)?;
        let response = select_response(operation, mock.code)?;
        let content = select_content(response, input.header("accept"), mock.example_key.as_deref())?;

        let (headers, body) = match content {
            Some((content, body)) => (
                Some(BTreeMap::from([(
                    "content-type".to_owned(),
                    content.media_type.clone(),
                )])),
                body,
            ),
            None => (None, None),
        };

        Ok(ProcessorResponse {
            output: ProcessorOutput {
                status_code: status_for(response.code, mock.code),
                headers,
                body,
            },
            validations: Validations::default(),
        })
    }
}

/// Find the operation for the request's path, method and server.
///
/// Literal segments beat `{param}` segments when several templates match.
fn match_operation<'a>(
    input: &CanonicalRequest,
    operations: &'a [HttpOperation],
) -> Result<&'a HttpOperation, DomainError> {
    let path = &input.url.path;
    let by_path: Vec<&HttpOperation> = operations
        .iter()
        .filter(|op| path_matches(&op.path, path))
        .collect();
    if by_path.is_empty() {
        return Err(DomainError::NoPathMatched(path.clone()));
    }

    let mut by_method: Vec<&HttpOperation> = by_path
        .into_iter()
        .filter(|op| op.method == input.method)
        .collect();
    if by_method.is_empty() {
        return Err(DomainError::NoMethodMatched(format!(
            "{} {path}",
            input.method.to_uppercase()
        )));
    }
    by_method.sort_by_key(|op| template_params(&op.path));

    match &input.url.base_url {
        Some(base) => by_method
            .into_iter()
            .find(|op| {
                op.servers.is_empty()
                    || op
                        .servers
                        .iter()
                        .any(|s| s.trim_end_matches('/') == base.trim_end_matches('/'))
            })
            .ok_or_else(|| DomainError::NoServerMatched(base.clone())),
        None => Ok(by_method[0]),
    }
}

fn path_matches(template: &str, path: &str) -> bool {
    let template: Vec<&str> = template.trim_end_matches('/').split('/').collect();
    let path: Vec<&str> = path.trim_end_matches('/').split('/').collect();
    template.len() == path.len()
        && template
            .iter()
            .zip(&path)
            .all(|(t, p)| is_param(t) || t == p)
}

fn is_param(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}')
}

fn template_params(template: &str) -> usize {
    template.split('/').filter(|s| is_param(s)).count()
}

/// Pick the response to serve.
///
/// A requested code matches an exact entry, then its `NXX` range, then
/// `default`. Without one: the lowest 2xx, else `2XX`, else `default`, else
/// whatever is declared first.
fn select_response(op: &HttpOperation, code: Option<u16>) -> Result<&ResponseSpec, DomainError> {
    if let Some(code) = code {
        return op
            .responses
            .iter()
            .find(|r| r.code == ResponseCode::Exact(code))
            .or_else(|| {
                op.responses
                    .iter()
                    .find(|r| r.code == ResponseCode::Range(code / 100))
            })
            .or_else(|| op.responses.iter().find(|r| r.code == ResponseCode::Default))
            .ok_or_else(|| {
                DomainError::NotFound(format!(
                    "requested status code {code} is not defined for {} {}",
                    op.method.to_uppercase(),
                    op.path
                ))
            });
    }

    op.responses
        .iter()
        .filter_map(|r| match r.code {
            ResponseCode::Exact(n) if (200..300).contains(&n) => Some((n, r)),
            _ => None,
        })
        .min_by_key(|(n, _)| *n)
        .map(|(_, r)| r)
        .or_else(|| op.responses.iter().find(|r| r.code == ResponseCode::Range(2)))
        .or_else(|| op.responses.iter().find(|r| r.code == ResponseCode::Default))
        .or_else(|| op.responses.first())
        .ok_or_else(|| {
            DomainError::NotFound(format!(
                "no response is declared for {} {}",
                op.method.to_uppercase(),
                op.path
            ))
        })
}

fn status_for(code: ResponseCode, requested: Option<u16>) -> u16 {
    match code {
        ResponseCode::Exact(n) => n,
        ResponseCode::Range(digit) => requested.unwrap_or(digit * 100),
        ResponseCode::Default => requested.unwrap_or(200),
    }
}

/// Pick the representation and example body.
///
/// A named example is searched across every acceptable representation.
fn select_content<'a>(
    response: &'a ResponseSpec,
    accept: Option<&str>,
    example_key: Option<&str>,
) -> Result<Option<(&'a ContentSpec, Option<Value>)>, DomainError> {
    let acceptable: Vec<&ContentSpec> = response
        .contents
        .iter()
        .filter(|c| accepts(accept, &c.media_type))
        .collect();
    if acceptable.is_empty() && !response.contents.is_empty() {
        return Err(DomainError::NotAcceptable(
            accept.unwrap_or_default().to_owned(),
        ));
    }

    match example_key {
        Some(key) => acceptable
            .into_iter()
            .find_map(|c| {
                c.examples
                    .iter()
                    .find(|e| e.key == key)
                    .map(|e| (c, Some(e.value.clone())))
            })
            .map(Some)
            .ok_or_else(|| DomainError::NotFound(format!("example `{key}` is not defined"))),
        None => Ok(acceptable
            .first()
            .map(|c| (*c, c.examples.first().map(|e| e.value.clone())))),
    }
}

fn accepts(accept: Option<&str>, media_type: &str) -> bool {
    let Some(accept) = accept else {
        return true;
    };
    let media_type = essence(media_type);
    accept.split(',').map(essence).any(|range| {
        range.is_empty()
            || range == "*/*"
            || range == media_type
            || range
                .strip_suffix("/*")
                .is_some_and(|ty| media_type.split('/').next() == Some(ty))
    })
}
