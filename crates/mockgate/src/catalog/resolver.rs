//! Flattening of a parsed [`openapiv3::OpenAPI`] document into [`HttpOperation`]s.

use openapiv3::{MediaType, OpenAPI, ReferenceOr, Response, Server, StatusCode};

use super::{ContentSpec, HttpOperation, NamedExample, ResponseCode, ResponseSpec};

const RESPONSES_PREFIX: &str = "#/components/responses/";
const EXAMPLES_PREFIX: &str = "#/components/examples/";

/// Walk every path item of `api` and produce one [`HttpOperation`] per method.
///
/// Only local component references are followed; anything else (path item
/// references, external files) is skipped.
pub fn operations_from_document(api: &OpenAPI) -> Vec<HttpOperation> {
    let mut operations = Vec::new();

    for (path, item) in &api.paths.paths {
        let ReferenceOr::Item(item) = item else {
            continue;
        };

        for (method, op) in item.iter() {
            let servers = if !op.servers.is_empty() {
                server_urls(&op.servers)
            } else if !item.servers.is_empty() {
                server_urls(&item.servers)
            } else {
                server_urls(&api.servers)
            };

            let mut responses = Vec::new();
            if let Some(default) = &op.responses.default {
                if let Some(resp) = resolve_response(api, default) {
                    responses.push(response_spec(api, ResponseCode::Default, resp));
                }
            }
            for (code, resp) in &op.responses.responses {
                let code = match code {
                    StatusCode::Code(n) => ResponseCode::Exact(*n),
                    StatusCode::Range(n) => ResponseCode::Range(*n),
                };
                if let Some(resp) = resolve_response(api, resp) {
                    responses.push(response_spec(api, code, resp));
                }
            }

            operations.push(HttpOperation {
                id: op.operation_id.clone(),
                method: method.to_owned(),
                path: path.clone(),
                servers,
                responses,
            });
        }
    }

    operations
}

fn server_urls(servers: &[Server]) -> Vec<String> {
    servers.iter().map(|s| s.url.clone()).collect()
}

fn response_spec(api: &OpenAPI, code: ResponseCode, resp: &Response) -> ResponseSpec {
    let contents = resp
        .content
        .iter()
        .map(|(media_type, content)| ContentSpec {
            media_type: media_type.clone(),
            examples: examples(api, content),
        })
        .collect();
    ResponseSpec { code, contents }
}

fn examples(api: &OpenAPI, content: &MediaType) -> Vec<NamedExample> {
    let mut out = Vec::new();
    if let Some(value) = &content.example {
        out.push(NamedExample {
            key: "default".into(),
            value: value.clone(),
        });
    }
    for (key, example) in &content.examples {
        let value = resolve(example, EXAMPLES_PREFIX, |name| {
            api.components.as_ref()?.examples.get(name)
        })
        .and_then(|ex| ex.value.clone());
        if let Some(value) = value {
            out.push(NamedExample {
                key: key.clone(),
                value,
            });
        }
    }
    out
}

fn resolve_response<'a>(api: &'a OpenAPI, resp: &'a ReferenceOr<Response>) -> Option<&'a Response> {
    resolve(resp, RESPONSES_PREFIX, |name| {
        api.components.as_ref()?.responses.get(name)
    })
}

/// Follow a single-level local `$ref` into a components table.
fn resolve<'a, T>(
    item: &'a ReferenceOr<T>,
    prefix: &str,
    lookup: impl FnOnce(&str) -> Option<&'a ReferenceOr<T>>,
) -> Option<&'a T> {
    match item {
        ReferenceOr::Item(value) => Some(value),
        ReferenceOr::Reference { reference } => match lookup(reference.strip_prefix(prefix)?)? {
            ReferenceOr::Item(value) => Some(value),
            ReferenceOr::Reference { .. } => None,
        },
    }
}
