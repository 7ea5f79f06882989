//! `ehr-vault`: vault binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing, optional OTLP export).
//! 3. Build the [`FieldEncryptionService`] from the master secret.
//! 4. Load the sensitive-field catalog (file or built-in).
//! 5. Build the access policy, then the Axum router, and start the HTTP server.

mod access;
mod config;
mod crypto;
mod records;
mod server;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};
use zeroize::Zeroizing;

use access::{AccessPolicy, Role, TracingAuditSink};
use crate::config::Config;
use crypto::{FieldEncryptionService, KeyDeriver, MasterSecret};
use records::FieldCatalog;
use server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let mut cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        "ehr-vault starting"
    );

    // -----------------------------------------------------------------------
    // 3. Field encryption
    // -----------------------------------------------------------------------
    let secret = Zeroizing::new(cfg.take_master_secret());
    let secret = MasterSecret::new(secret.as_bytes()).context("invalid master secret")?;
    let deriver = KeyDeriver::new(secret, cfg.kdf_iterations).context("invalid KDF settings")?;
    info!(kdf_iterations = deriver.iterations(), "field encryption ready");
    let fields = FieldEncryptionService::new(deriver);

    // -----------------------------------------------------------------------
    // 4. Sensitive-field catalog
    // -----------------------------------------------------------------------
    let catalog = match &cfg.field_catalog_path {
        Some(path) => FieldCatalog::load(Path::new(path))?,
        None => FieldCatalog::builtin(),
    };
    info!(record_types = catalog.len(), "field catalog loaded");

    // -----------------------------------------------------------------------
    // 5. Access policy + HTTP server
    // -----------------------------------------------------------------------
    let policy = AccessPolicy::standard();
    for role in Role::ALL {
        debug!(%role, permissions = policy.permissions(role).count(), "role grants");
    }

    let state = AppState::new(
        fields,
        policy,
        catalog,
        Arc::new(TracingAuditSink),
        cfg.record_type_header.clone(),
    );
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
