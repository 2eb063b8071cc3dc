//! Structured logging and optional OTLP trace export.
//!
//! # Telemetry invariants
//!
//! - Every request is logged inside a `request` span carrying a UUID v4 id.
//! - Processor diagnostics are logged at the level matching their severity.
//! - Log level is configurable via `MOCKGATE_LOG_LEVEL` (default: `info`);
//!   `RUST_LOG` takes precedence when set.

pub mod init;

pub use init::init_telemetry;
