//! `mockgate` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the tracing subscriber (and OTLP export when configured).
//! 3. Load the operation catalog from the OpenAPI document.
//! 4. Build the Axum router and serve until the process is stopped.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use mockgate::{
    catalog,
    config::Config,
    processor::ExampleProcessor,
    server::{router, state::AppState},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level, cfg.otel_exporter_otlp_endpoint.as_deref())?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        cors = cfg.cors,
        "mockgate starting"
    );

    // -----------------------------------------------------------------------
    // 3. Operation catalog
    // -----------------------------------------------------------------------
    let operations = catalog::load(Path::new(&cfg.spec_path))
        .await
        .context("failed to load OpenAPI document")?;

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(
        Arc::new(ExampleProcessor),
        operations,
        cfg.request_config(),
    );
    let router = router::build(state, cfg.cors);

    let addr = cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");
    axum::serve(listener, router).await?;

    Ok(())
}
