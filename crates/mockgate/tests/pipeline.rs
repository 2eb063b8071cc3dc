//! End-to-end tests driving the full router through `axum-test`.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use bytes::Bytes;
use common::{
    protocol::{Diagnostic, ProcessorOutput, Severity, Validations},
    CanonicalRequest, DomainError, MockSetting, ProcessorResponse, RequestConfig,
};
use mockgate::{
    catalog::{self, HttpOperation},
    processor::{ExampleProcessor, Processor},
    server::{router, state::AppState},
};
use serde_json::{json, Value};

type Outcome = Result<ProcessorResponse, DomainError>;

/// Processor returning a fixed outcome and remembering what it was called with.
struct Stub {
    outcome: Box<dyn Fn() -> Outcome + Send + Sync>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(CanonicalRequest, RequestConfig)>>,
}

impl Stub {
    fn new(outcome: impl Fn() -> Outcome + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            outcome: Box::new(outcome),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last(&self) -> (CanonicalRequest, RequestConfig) {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Processor for Stub {
    async fn request(
        &self,
        input: &CanonicalRequest,
        _operations: &[HttpOperation],
        config: &RequestConfig,
    ) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((input.clone(), config.clone()));
        (self.outcome)()
    }
}

fn ok(status_code: u16, body: Option<Value>) -> Outcome {
    Ok(ProcessorResponse {
        output: ProcessorOutput {
            status_code,
            headers: None,
            body,
        },
        validations: Validations::default(),
    })
}

fn server(processor: Arc<Stub>, cors: bool) -> TestServer {
    let state = AppState::new(processor, Vec::new(), RequestConfig::default());
    TestServer::new(router::build(state, cors)).unwrap()
}

#[tokio::test]
async fn json_round_trip() {
    let stub = Stub::new(|| ok(200, Some(json!({"id": 1}))));
    let server = server(stub.clone(), true);

    let response = server
        .post("/widgets")
        .json(&json!({"name": "widget"}))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/json; charset=utf-8"
    );
    assert_eq!(response.text(), r#"{"id":1}"#);

    let (input, _) = stub.last();
    assert_eq!(input.method, "post");
    assert_eq!(input.url.path, "/widgets");
    assert_eq!(input.body, Some(json!({"name": "widget"})));
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn string_body_is_text() {
    let stub = Stub::new(|| ok(201, Some(json!("created"))));
    let response = server(stub, false).put("/widgets/7").await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.header(header::CONTENT_TYPE), "text/plain; charset=utf-8");
    assert_eq!(response.text(), "created");
}

#[tokio::test]
async fn unsupported_media_type_is_rejected_before_processing() {
    let stub = Stub::new(|| ok(200, None));
    let response = server(stub.clone(), true)
        .post("/widgets")
        .content_type("text/plain")
        .bytes(Bytes::from_static(b"hello"))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/problem+json"
    );
    assert_eq!(response.json::<Value>()["status"], 415);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn form_body_passes_through_raw() {
    let stub = Stub::new(|| ok(204, None));
    let server = server(stub.clone(), true);

    let response = server
        .post("/login")
        .content_type("application/x-www-form-urlencoded")
        .bytes(Bytes::from_static(b"user=ada&remember=on"))
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    let (input, _) = stub.last();
    assert_eq!(input.body, Some(json!("user=ada&remember=on")));
}

#[tokio::test]
async fn processor_error_becomes_problem() {
    let stub = Stub::new(|| {
        Err(DomainError::UnprocessableEntity {
            detail: "request body does not match the schema".into(),
            validation: vec![Diagnostic::new(
                &["body", "name"],
                "must be a string",
                Severity::Error,
            )],
        })
    });
    let response = server(stub, true).post("/widgets").json(&json!({"name": 3})).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/problem+json"
    );
    let problem = response.json::<Value>();
    assert_eq!(problem["status"], 422);
    assert_eq!(problem["validation"][0]["message"], "must be a string");
}

#[tokio::test]
async fn unauthorized_carries_challenge_header() {
    let stub = Stub::new(|| {
        Err(DomainError::Unauthorized {
            detail: "missing credentials".into(),
            www_authenticate: "Bearer".into(),
        })
    });
    let response = server(stub, true).get("/secure").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.header(header::WWW_AUTHENTICATE), "Bearer");
    let problem = response.json::<Value>();
    assert_eq!(problem["status"], 401);
    assert_eq!(problem["headers"], json!({"www-authenticate": "Bearer"}));
}

#[tokio::test]
async fn diagnostics_do_not_change_the_response() {
    let stub = Stub::new(|| {
        Ok(ProcessorResponse {
            output: ProcessorOutput {
                status_code: 200,
                headers: Some([("x-rate-limit".to_owned(), "10".to_owned())].into()),
                body: Some(json!([1, 2])),
            },
            validations: Validations {
                input: vec![Diagnostic::new(&["query", "limit"], "unknown", Severity::Warning)],
                output: vec![Diagnostic::new(&["body"], "extra item", Severity::Error)],
            },
        })
    });
    let response = server(stub, true).get("/widgets").await;

    response.assert_status_ok();
    assert_eq!(response.header("x-rate-limit"), "10");
    assert_eq!(response.json::<Value>(), json!([1, 2]));
}

#[tokio::test]
async fn server_query_and_overrides_reach_processor() {
    let stub = Stub::new(|| ok(200, None));
    let server = server(stub.clone(), true);

    server
        .get("/widgets")
        .add_query_param("__server", "https://api.example.com")
        .add_query_param("__code", "404")
        .add_header(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("code=500, example=empty, dynamic=true"),
        )
        .await
        .assert_status_ok();

    let (input, config) = stub.last();
    assert_eq!(input.url.base_url.as_deref(), Some("https://api.example.com"));
    assert!(input.url.query.contains_key("__server"));
    let MockSetting::Enabled(mock) = config.mock else {
        panic!("mocking should stay enabled");
    };
    assert_eq!(mock.code, Some(404));
    assert_eq!(mock.example_key.as_deref(), Some("empty"));
    assert!(mock.dynamic);
}

#[tokio::test]
async fn cors_preflight_and_method_filter() {
    let stub = Stub::new(|| ok(200, None));
    let server = server(stub.clone(), true);

    let preflight = server
        .method(Method::OPTIONS, "/widgets")
        .add_header(header::ORIGIN, HeaderValue::from_static("https://app.example.com"))
        .add_header(
            header::ACCESS_CONTROL_REQUEST_METHOD,
            HeaderValue::from_static("DELETE"),
        )
        .await;
    preflight.assert_status_ok();
    assert_eq!(preflight.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");

    server
        .method(Method::TRACE, "/widgets")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(stub.calls(), 0);
}

const PETSTORE: &str = r#"
openapi: "3.0.0"
info:
  title: Petstore
  version: "1"
paths:
  /pets/{id}:
    get:
      operationId: getPet
      responses:
        "200":
          description: a pet
          content:
            application/json:
              examples:
                cat:
                  value: {"id": 1, "name": "Tom"}
                dog:
                  value: {"id": 2, "name": "Rex"}
        "404":
          description: no such pet
          content:
            application/json:
              example: {"message": "not found"}
"#;

fn example_server() -> TestServer {
    let api = catalog::parse_document(PETSTORE).unwrap();
    let state = AppState::new(
        Arc::new(ExampleProcessor),
        catalog::operations_from_document(&api),
        RequestConfig::default(),
    );
    TestServer::new(router::build(state, true)).unwrap()
}

#[tokio::test]
async fn example_processor_serves_declared_examples() {
    let server = example_server();

    let response = server.get("/pets/1").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"id": 1, "name": "Tom"}));

    let response = server
        .get("/pets/1")
        .add_header(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("example=dog"),
        )
        .await;
    assert_eq!(response.json::<Value>()["name"], "Rex");

    let response = server.get("/pets/1").add_query_param("__code", "404").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>(), json!({"message": "not found"}));
}

#[tokio::test]
async fn example_processor_reports_unmatched_routes() {
    let server = example_server();

    let response = server.get("/owners").await;
    response.assert_status_not_found();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "application/problem+json"
    );

    server
        .delete("/pets/1")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
