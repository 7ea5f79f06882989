//! Axum request handlers for all service endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{ErrorResponse, HealthResponse, RecordRequest, RecordResponse};
use common::ServiceError;
use tracing::{debug, warn};

use super::state::AppState;
use crate::access::{principal, AuditEvent, AuditOutcome, Permission};
use crate::crypto::{FieldCryptoError, FieldEncryptionService};
use crate::records::{first_non_string_leaf, transform_fields};

/// Direction of a record transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOp {
    Encrypt,
    Decrypt,
}

impl RecordOp {
    /// Permission the principal must hold for this operation.
    fn permission(self) -> Permission {
        match self {
            RecordOp::Encrypt => Permission::WriteRecord,
            RecordOp::Decrypt => Permission::ReadRecord,
        }
    }

    fn apply(self, fields: &FieldEncryptionService, value: &str) -> Result<String, FieldCryptoError> {
        match self {
            RecordOp::Encrypt => fields.encrypt_field(value),
            RecordOp::Decrypt => fields.decrypt_field(value),
        }
    }
}

/// `POST /records/encrypt`: replace sensitive fields with envelopes.
///
/// Requires `write:record`. The record type comes from the configured
/// record-type header (default `X-Record-Type`).
pub async fn encrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RecordRequest>,
) -> Response {
    respond(process_record(state, &headers, req, RecordOp::Encrypt).await)
}

/// `POST /records/decrypt`: restore sensitive fields from their envelopes.
///
/// Requires `read:record`. Any envelope that fails to open fails the whole
/// request with a generic error; no partially decrypted record is returned.
pub async fn decrypt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RecordRequest>,
) -> Response {
    respond(process_record(state, &headers, req, RecordOp::Decrypt).await)
}

/// `GET /health`: liveness and readiness check.
///
/// Returns `200 OK` when at least one record type is catalogued,
/// `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let record_types_loaded = state.catalog.len();
    let (status_code, status_str) = if !state.catalog.is_empty() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        record_types_loaded,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn respond(result: Result<serde_json::Value, ServiceError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(RecordResponse { record })).into_response(),
        Err(err) => {
            let status =
                StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(ErrorResponse::from(&err))).into_response()
        }
    }
}

/// Authorize, look up the sensitive paths, and transform the record.
async fn process_record(
    state: AppState,
    headers: &HeaderMap,
    req: RecordRequest,
    op: RecordOp,
) -> Result<serde_json::Value, ServiceError> {
    let principal = principal::from_headers(headers).map_err(|e| {
        warn!(error = %e, "request without a valid principal");
        ServiceError::Unauthenticated(e.to_string())
    })?;

    let permission = op.permission();
    if !state.policy.authorize(&principal, permission) {
        state
            .audit
            .record(&AuditEvent::new(&principal, permission, AuditOutcome::Denied));
        return Err(ServiceError::Forbidden(format!(
            "role {} lacks {permission}",
            principal.role()
        )));
    }

    let record_type = record_type(headers, &state.record_type_header)?;
    let paths = state
        .catalog
        .sensitive_paths(&record_type)
        .map_err(|e| ServiceError::BadRequest(e.to_string()))?
        .clone();
    if !req.record.is_object() {
        return Err(ServiceError::BadRequest("record must be a JSON object".into()));
    }
    // A non-string leaf would be skipped by the transform and stored in the clear.
    if op == RecordOp::Encrypt {
        if let Some(path) = first_non_string_leaf(&req.record, &paths) {
            return Err(ServiceError::BadRequest(format!(
                "sensitive field {path} must be a string"
            )));
        }
    }

    state.audit.record(
        &AuditEvent::new(&principal, permission, AuditOutcome::Granted)
            .with_record_type(record_type.as_str()),
    );
    debug!(record_type = %record_type, paths = paths.len(), ?op, "transforming record");

    // PBKDF2 is CPU-bound; keep it off the async workers.
    let fields = state.fields.clone();
    let mut record = req.record;
    let outcome = tokio::task::spawn_blocking(move || {
        transform_fields(&mut record, &paths, |value| op.apply(&fields, value)).map(|()| record)
    })
    .await
    .map_err(|e| ServiceError::Internal(format!("field worker failed: {e}")))?;

    outcome.map_err(|e| {
        warn!(error = %e, record_type = %record_type, ?op, "record processing failed");
        state.audit.record(
            &AuditEvent::new(&principal, permission, AuditOutcome::Failed)
                .with_record_type(record_type.as_str())
                .with_reason(e.kind()),
        );
        ServiceError::EncryptionFailure(e.to_string())
    })
}

fn record_type(headers: &HeaderMap, header_name: &str) -> Result<String, ServiceError> {
    let value = headers
        .get(header_name)
        .ok_or_else(|| ServiceError::BadRequest(format!("missing {header_name} header")))?;
    let value = value.to_str().map_err(|_| {
        ServiceError::BadRequest(format!("{header_name} header contains non-ASCII characters"))
    })?;
    Ok(value.trim().to_owned())
}
