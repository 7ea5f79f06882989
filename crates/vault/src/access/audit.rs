//! Audit events for authorization decisions and record processing failures.
//!
//! Events are handed to an [`AuditSink`]. The default sink writes them to the
//! `audit` tracing target, where the log pipeline ships them to durable
//! storage. Events never carry field values.

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::policy::{Permission, Principal, Role};

/// Result recorded for an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The principal's role holds the permission.
    Granted,
    /// The principal's role lacks the permission; nothing was processed.
    Denied,
    /// Authorized, but decryption or encryption failed.
    Failed,
}

/// One audited operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    /// Random per-event identifier for correlating log lines.
    pub id: Uuid,
    /// Caller identity from the authentication layer.
    pub principal_id: String,
    pub role: Role,
    /// Permission the operation required.
    pub permission: Permission,
    /// Record type header value; absent when the request was denied before it was read.
    pub record_type: Option<String>,
    pub outcome: AuditOutcome,
    /// Short failure class such as `"integrity"`; never the underlying data.
    pub reason: Option<&'static str>,
}

impl AuditEvent {
    /// Start an event for `principal` with a fresh id and no record type or reason.
    pub fn new(principal: &Principal, permission: Permission, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            principal_id: principal.id().to_owned(),
            role: principal.role(),
            permission,
            record_type: None,
            outcome,
            reason: None,
        }
    }

    /// Attach the record type the operation targeted.
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Attach a short failure class, e.g. [`FieldCryptoError::kind`].
    ///
    /// [`FieldCryptoError::kind`]: crate::crypto::FieldCryptoError::kind
    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.reason = Some(reason);
        self
    }
}

/// Destination for audit events.
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink: Send + Sync {
    /// Emit `event`. Called inline on the request path.
    fn record(&self, event: &AuditEvent);
}

/// Writes audit events as structured `tracing` records on the `audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) {
        let record_type = event.record_type.as_deref().unwrap_or("-");
        let reason = event.reason.unwrap_or("-");
        match event.outcome {
            AuditOutcome::Granted => info!(
                target: "audit",
                event_id = %event.id,
                principal_id = %event.principal_id,
                role = %event.role,
                permission = %event.permission,
                record_type,
                "access granted"
            ),
            AuditOutcome::Denied => warn!(
                target: "audit",
                event_id = %event.id,
                principal_id = %event.principal_id,
                role = %event.role,
                permission = %event.permission,
                record_type,
                "access denied"
            ),
            // Integrity failures may mean tampering or an unmigrated secret rotation.
            AuditOutcome::Failed => error!(
                target: "audit",
                event_id = %event.id,
                principal_id = %event.principal_id,
                role = %event.role,
                permission = %event.permission,
                record_type,
                reason,
                "record processing failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_principal_and_context() {
        let p = Principal::new("nurse-7", Role::Nurse);
        let e = AuditEvent::new(&p, Permission::WriteRecord, AuditOutcome::Failed)
            .with_record_type("medical_record")
            .with_reason("integrity");
        assert_eq!(e.principal_id, "nurse-7");
        assert_eq!(e.role, Role::Nurse);
        assert_eq!(e.record_type.as_deref(), Some("medical_record"));
        assert_eq!(e.reason, Some("integrity"));
    }

    #[test]
    fn event_ids_are_unique() {
        let p = Principal::new("u", Role::Admin);
        let a = AuditEvent::new(&p, Permission::ReadAudit, AuditOutcome::Granted);
        let b = AuditEvent::new(&p, Permission::ReadAudit, AuditOutcome::Granted);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn event_serialises_wire_names() {
        let p = Principal::new("pt-1", Role::Patient);
        let e = AuditEvent::new(&p, Permission::WriteRecord, AuditOutcome::Denied);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["permission"], "write:record");
        assert_eq!(v["role"], "patient");
        assert_eq!(v["outcome"], "denied");
    }

    #[test]
    fn tracing_sink_accepts_every_outcome() {
        let p = Principal::new("u", Role::Physician);
        for outcome in [AuditOutcome::Granted, AuditOutcome::Denied, AuditOutcome::Failed] {
            TracingAuditSink.record(&AuditEvent::new(&p, Permission::ReadRecord, outcome));
        }
    }
}
