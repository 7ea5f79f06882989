//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No PHI or key material** must appear in any span attribute or log
//!   field: no plaintext field values, no envelopes, no secrets.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
