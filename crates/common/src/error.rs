//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthenticated`] → 401
/// - [`ServiceError::Forbidden`] → 403
/// - [`ServiceError::EncryptionFailure`] → 500
///
/// The `Display` text is for logs only. Responses are built from [`ServiceError::code`]
/// and [`ServiceError::public_message`] so crypto failures never leak their cause.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: missing header, unknown record type, or invalid JSON.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No trusted principal accompanied the request.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The principal's role does not grant the required permission.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Encryption or decryption failed due to a crypto-layer error.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthenticated(_) => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::EncryptionFailure(_) => "processing_failed",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Message that is safe to return to the caller.
    ///
    /// Client errors echo their detail; server-side failures collapse to a
    /// fixed string.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Unauthenticated(m)
            | ServiceError::Forbidden(m) => m.clone(),
            ServiceError::EncryptionFailure(_) => "unable to process record".into(),
            ServiceError::Internal(_) => "internal error".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::BadRequest("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Unauthenticated("x".into()).http_status(), 401);
        assert_eq!(ServiceError::Forbidden("x".into()).http_status(), 403);
        assert_eq!(
            ServiceError::EncryptionFailure("x".into()).http_status(),
            500
        );
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::BadRequest("missing record type header".into());
        assert!(e.to_string().contains("missing record type header"));
    }

    #[test]
    fn crypto_failures_do_not_echo_detail() {
        let e = ServiceError::EncryptionFailure("integrity check failed".into());
        assert_eq!(e.code(), "processing_failed");
        assert!(!e.public_message().contains("integrity"));
    }

    #[test]
    fn client_errors_echo_detail() {
        let e = ServiceError::Forbidden("role patient lacks write:record".into());
        assert_eq!(e.code(), "forbidden");
        assert!(e.public_message().contains("write:record"));
    }
}
