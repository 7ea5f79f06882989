//! Request and response types exchanged over the vault's JSON API.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /records/encrypt` and `POST /records/decrypt`.
///
/// The sensitive fields of `record` are looked up from the record type named
/// in the `X-Record-Type` request header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordRequest {
    /// Arbitrary JSON object whose sensitive fields are transformed.
    pub record: serde_json::Value,
}

/// Successful response body for both record endpoints.
///
/// `record` mirrors the input structure; after `/records/encrypt` every
/// sensitive string holds a base64 envelope, after `/records/decrypt` the
/// original plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResponse {
    /// Transformed JSON object.
    pub record: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"forbidden"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.public_message())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Number of record types with a sensitive-field mapping.
    pub record_types_loaded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use serde_json::json;

    #[test]
    fn record_request_keeps_nested_payload() {
        let req = RecordRequest {
            record: json!({"ssn": "123-45-6789", "name": {"first": "Alice"}}),
        };
        let json = serde_json::to_string(&req).unwrap();
        let decoded: RecordRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.record["name"]["first"], "Alice");
    }

    #[test]
    fn error_response_from_service_error() {
        let e = ErrorResponse::from(&ServiceError::Internal("db pool exhausted".into()));
        assert_eq!(e.code, "internal_error");
        assert!(!e.message.contains("db pool"));
    }

    #[test]
    fn health_response_field_names() {
        let h = HealthResponse {
            status: "ok".into(),
            record_types_loaded: 2,
        };
        let value = serde_json::to_value(&h).unwrap();
        assert_eq!(value["record_types_loaded"], 2);
        assert_eq!(value["status"], "ok");
    }
}
