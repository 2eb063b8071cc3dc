//! Per-request [`RequestConfig`] derived from reserved query keys and `Prefer`.
//!
//! Signals: `__code`, `__example` and `__dynamic` query parameters, or the
//! `code=`, `example=` and `dynamic=` directives of a `Prefer` header. A query
//! parameter beats the matching header directive.

use common::{request_config::resolve_mock, CanonicalRequest, MockOverride, RequestConfig};
use tracing::debug;

pub const CODE_QUERY_KEY: &str = "__code";
pub const EXAMPLE_QUERY_KEY: &str = "__example";
pub const DYNAMIC_QUERY_KEY: &str = "__dynamic";

/// Effective configuration for `input`: the global one with the mock setting
/// resolved against the request's override.
pub fn request_config(global: &RequestConfig, input: &CanonicalRequest) -> RequestConfig {
    RequestConfig {
        mock: resolve_mock(&global.mock, mock_override(input)),
        ..global.clone()
    }
}

/// Extract the mock override a request asks for.
pub fn mock_override(input: &CanonicalRequest) -> MockOverride {
    let prefer = input.header("prefer").map(Prefer::parse).unwrap_or_default();

    MockOverride {
        code: parse_code(input.query_param(CODE_QUERY_KEY)).or_else(|| parse_code(prefer.code)),
        example_key: input
            .query_param(EXAMPLE_QUERY_KEY)
            .or(prefer.example)
            .map(str::to_owned),
        dynamic: input
            .query_param(DYNAMIC_QUERY_KEY)
            .or(prefer.dynamic)
            .map(|raw| raw == "true"),
    }
}

fn parse_code(raw: Option<&str>) -> Option<u16> {
    let raw = raw?;
    match raw.parse() {
        Ok(code) => Some(code),
        Err(_) => {
            debug!(code = raw, "ignoring unparseable mock status code");
            None
        }
    }
}

/// The mock directives of a `Prefer` header.
#[derive(Debug, Default, PartialEq, Eq)]
struct Prefer<'a> {
    code: Option<&'a str>,
    example: Option<&'a str>,
    dynamic: Option<&'a str>,
}

impl<'a> Prefer<'a> {
    fn parse(header: &'a str) -> Self {
        let mut prefer = Prefer::default();
        for directive in header.split([',', ';']) {
            let Some((name, value)) = directive.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match name.trim() {
                "code" => prefer.code = Some(value),
                "example" => prefer.example = Some(value),
                "dynamic" => prefer.dynamic = Some(value),
                _ => {}
            }
        }
        prefer
    }
}
