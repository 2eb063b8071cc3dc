//! Listener primitives → [`CanonicalRequest`].

use std::collections::{btree_map::Entry, BTreeMap};

use axum::http::HeaderMap;
use common::{
    protocol::{QueryValue, RequestUrl},
    CanonicalRequest,
};
use serde_json::Value;
use url::form_urlencoded;

/// Query parameter that selects which declared server base URL a request targets.
pub const SERVER_QUERY_KEY: &str = "__server";

/// The request as the listener delivers it.
#[derive(Debug, Clone, Copy)]
pub struct RawRequest<'a> {
    /// HTTP method in any case; empty means `GET`.
    pub method: &'a str,
    /// Path and query as received; empty means `/`.
    pub url: &'a str,
    pub headers: &'a HeaderMap,
}

/// Build the canonical request handed to the processor.
///
/// The `__server` parameter is lifted into `base_url` and also left in `query`.
pub fn canonical_request(raw: RawRequest<'_>, body: Option<Value>) -> CanonicalRequest {
    let method = if raw.method.is_empty() {
        "get".to_owned()
    } else {
        raw.method.to_ascii_lowercase()
    };

    let (path, query) = raw.url.split_once('?').unwrap_or((raw.url, ""));
    let path = if path.is_empty() { "/" } else { path };
    let query = parse_query(query);
    let base_url = query
        .get(SERVER_QUERY_KEY)
        .and_then(QueryValue::first)
        .map(str::to_owned);

    CanonicalRequest {
        method,
        url: RequestUrl {
            path: path.to_owned(),
            query,
            base_url,
        },
        headers: header_map(raw.headers),
        body,
    }
}

/// Decode a query string; repeated keys collect their values in arrival order.
pub fn parse_query(raw: &str) -> BTreeMap<String, QueryValue> {
    let mut query = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match query.entry(key.into_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(QueryValue::Single(value.into_owned()));
            }
            Entry::Occupied(mut slot) => slot.get_mut().push(value.into_owned()),
        }
    }
    query
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        match out.entry(name.as_str().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value.into_owned());
            }
            Entry::Occupied(mut slot) => {
                let joined = slot.get_mut();
                joined.push_str(", ");
                joined.push_str(&value);
            }
        }
    }
    out
}
