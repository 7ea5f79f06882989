//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::access::{AccessPolicy, AuditSink};
use crate::crypto::FieldEncryptionService;
use crate::records::FieldCatalog;

/// Application state shared across all request handlers.
///
/// All fields are `Arc`-wrapped so that Axum can clone the state for each
/// request without copying expensive data. Everything behind them is
/// immutable after startup.
#[derive(Clone)]
pub struct AppState {
    /// Encrypts and decrypts individual field values.
    pub fields: Arc<FieldEncryptionService>,
    /// Role → permission table consulted before every field operation.
    pub policy: Arc<AccessPolicy>,
    /// Sensitive field paths per record type.
    pub catalog: Arc<FieldCatalog>,
    /// Destination for authorization and failure events.
    pub audit: Arc<dyn AuditSink>,
    /// Name of the HTTP header identifying the record type of each request.
    pub record_type_header: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] from its parts.
    pub fn new(
        fields: FieldEncryptionService,
        policy: AccessPolicy,
        catalog: FieldCatalog,
        audit: Arc<dyn AuditSink>,
        record_type_header: String,
    ) -> Self {
        Self {
            fields: Arc::new(fields),
            policy: Arc::new(policy),
            catalog: Arc::new(catalog),
            audit,
            record_type_header: Arc::new(record_type_header),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State with a low-cost key deriver, the standard policy and the
    /// built-in catalog.
    pub fn for_tests() -> Self {
        Self::with_audit(Arc::new(crate::access::TracingAuditSink))
    }

    /// Same as [`AppState::for_tests`] with a caller-supplied audit sink.
    pub fn with_audit(audit: Arc<dyn AuditSink>) -> Self {
        use crate::crypto::KeyDeriver;

        Self::new(
            FieldEncryptionService::new(KeyDeriver::for_tests(b"test-master-secret")),
            AccessPolicy::standard(),
            FieldCatalog::builtin(),
            audit,
            "X-Record-Type".into(),
        )
    }
}
