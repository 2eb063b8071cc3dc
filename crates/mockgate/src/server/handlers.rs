//! The catch-all request handler.

use axum::{
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::{
    media::ParsedBody,
    normalize::{canonical_request, RawRequest},
    reply::ReplyChannel,
    resolve::request_config,
    state::AppState,
    translate,
};

/// Every method on every path.
///
/// The body has already been classified by [`ParsedBody`]; unsupported media
/// types never get here. Normalizes the request, resolves its configuration,
/// hands it to the processor and writes the folded outcome.
pub async fn handle_request(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    ParsedBody(body): ParsedBody,
) -> Response {
    let span = info_span!("request", request_id = %Uuid::new_v4());
    async move {
        let url = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_default();
        let input = canonical_request(
            RawRequest {
                method: method.as_str(),
                url,
                headers: &headers,
            },
            body,
        );
        info!(input = ?input, "Request received");

        let config = request_config(&state.config, &input);
        let mut reply = ReplyChannel::new();
        translate::respond(
            state.processor.as_ref(),
            &input,
            &state.operations,
            &config,
            &mut reply,
        )
        .await;
        reply.into_response()
    }
    .instrument(span)
    .await
}
