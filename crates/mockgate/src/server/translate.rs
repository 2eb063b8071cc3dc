//! Folding of a processor outcome into exactly one reply.
//!
//! `Err` becomes a problem+json reply (or a connection close if the channel
//! was already finalized); `Ok` propagates status and headers, logs the output
//! diagnostics in order and sends the serialized body.

use axum::http::StatusCode;
use common::{
    protocol::{Diagnostic, Severity},
    CanonicalRequest, DomainError, ProblemPayload, ProcessorResponse, RequestConfig,
};
use tracing::{error, info, warn};

use super::{
    reply::ReplyChannel,
    serialize::{default_content_type, serialize},
};
use crate::{catalog::HttpOperation, processor::Processor};

/// Invoke the processor once and fold its outcome into `reply`.
pub async fn respond(
    processor: &dyn Processor,
    input: &CanonicalRequest,
    operations: &[HttpOperation],
    config: &RequestConfig,
    reply: &mut ReplyChannel,
) {
    let outcome = processor.request(input, operations, config).await;
    fold(outcome, input, reply);
}

/// Write the reply for a processor outcome.
pub fn fold(
    outcome: Result<ProcessorResponse, DomainError>,
    input: &CanonicalRequest,
    reply: &mut ReplyChannel,
) {
    match outcome {
        Err(err) => reply_error(&err, input, reply),
        Ok(response) => reply_success(response, input, reply),
    }
}

fn reply_error(err: &DomainError, input: &CanonicalRequest, reply: &mut ReplyChannel) {
    let problem = ProblemPayload::from(err);

    if reply.is_sent() {
        reply.end();
    } else if let Err(e) = reply.send_problem(&problem) {
        warn!(error = %e, "failed to write problem reply");
        reply.end();
    }

    error!(input = ?input, offset = 1, "Request terminated with error: {err}");
}

fn reply_success(response: ProcessorResponse, input: &CanonicalRequest, reply: &mut ReplyChannel) {
    let ProcessorResponse {
        output,
        validations,
    } = response;

    let Ok(status) = StatusCode::from_u16(output.status_code) else {
        let err = DomainError::Internal(format!(
            "processor returned invalid status code {}",
            output.status_code
        ));
        return reply_error(&err, input, reply);
    };
    reply.code(status);

    for (name, value) in output.headers.iter().flatten() {
        if let Err(e) = reply.header(name, value) {
            warn!(error = %e, "skipping processor header");
        }
    }

    for diagnostic in &validations.output {
        log_diagnostic(diagnostic);
    }

    if reply.content_type().is_none() {
        if let Some(media_type) = default_content_type(output.body.as_ref()) {
            if let Err(e) = reply.set_content_type(media_type) {
                warn!(error = %e, "failed to set default content type");
            }
        }
    }

    let body = serialize(output.body.as_ref(), reply.content_type());
    if let Err(e) = reply.send(body) {
        warn!(error = %e, "reply finalized before the processor output was written");
        reply.end();
    }
}

/// Log one output diagnostic at the level matching its severity.
fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic.severity {
        Severity::Error => error!("{diagnostic}"),
        Severity::Warning => warn!("{diagnostic}"),
        Severity::Information | Severity::Hint => info!("{diagnostic}"),
    }
}
