//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::kdf::{DEFAULT_ITERATIONS, MIN_ITERATIONS};

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Master secret every field key is derived from. **Required.**
    ///
    /// Moved out with [`Config::take_master_secret`] during startup.
    pub master_secret: String,

    /// PBKDF2 iteration count; at least [`MIN_ITERATIONS`].
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// HTTP header used to identify which record type a request carries.
    #[serde(default = "default_record_type_header")]
    pub record_type_header: String,

    /// Optional YAML file mapping record types to sensitive field paths.
    /// The built-in catalog is used when unset.
    #[serde(default)]
    pub field_catalog_path: Option<String>,

    /// Optional OTLP endpoint; spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}
fn default_listen_port() -> u16 {
    8080
}
fn default_record_type_header() -> String {
    "X-Record-Type".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Move the master secret out, leaving an empty string behind.
    pub fn take_master_secret(&mut self) -> String {
        std::mem::take(&mut self.master_secret)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.master_secret, "MASTER_SECRET")?;
        ensure_non_empty(&self.record_type_header, "RECORD_TYPE_HEADER")?;

        if self.kdf_iterations < MIN_ITERATIONS {
            anyhow::bail!("KDF_ITERATIONS must be >= {MIN_ITERATIONS}");
        }
        if axum::http::HeaderName::from_bytes(self.record_type_header.as_bytes()).is_err() {
            anyhow::bail!("RECORD_TYPE_HEADER is not a valid HTTP header name");
        }
        if let Some(path) = &self.field_catalog_path {
            ensure_non_empty(path, "FIELD_CATALOG_PATH")?;
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("master_secret", &"[REDACTED]")
            .field("kdf_iterations", &self.kdf_iterations)
            .field("listen_port", &self.listen_port)
            .field("record_type_header", &self.record_type_header)
            .field("field_catalog_path", &self.field_catalog_path)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
