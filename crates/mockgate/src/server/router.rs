//! Axum router construction.

use axum::{
    http::Method,
    routing::{on, MethodFilter},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{handlers, middleware, state::AppState};

/// Methods served by the CORS-aware catch-all.
const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::DELETE,
    Method::HEAD,
    Method::PATCH,
    Method::POST,
    Method::PUT,
];

/// Build the application [`Router`] with the catch-all route and middleware attached.
///
/// With `cors` the catch-all is registered on `/` and `/*path` for
/// [`CORS_METHODS`] behind a permissive [`CorsLayer`], which also answers
/// preflight requests. Without it every method on every path reaches the handler.
pub fn build(state: AppState, cors: bool) -> Router {
    let router = if cors {
        let filter = MethodFilter::GET
            .or(MethodFilter::DELETE)
            .or(MethodFilter::HEAD)
            .or(MethodFilter::PATCH)
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT);
        let catch_all = on(filter, handlers::handle_request);
        Router::new()
            .route("/", catch_all.clone())
            .route("/*path", catch_all)
            .layer(cors_layer())
    } else {
        Router::new().fallback(handlers::handle_request)
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(CORS_METHODS)
        .allow_headers(Any)
}
