//! Reading the authenticated principal from gateway-supplied headers.
//!
//! JWT verification happens upstream. The gateway strips any client-supplied
//! copies of these headers and sets them from the verified token claims.

use axum::http::HeaderMap;
use thiserror::Error;

use super::policy::{Principal, Role};

/// Header carrying the principal's opaque identifier.
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";

/// Header carrying the principal's role name.
pub const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// Why no principal could be read from a request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("missing {0} header")]
    Missing(&'static str),

    #[error("{0} header is not valid ASCII")]
    NotAscii(&'static str),

    #[error("principal id header is empty")]
    EmptyId,

    #[error("unrecognised role: {0}")]
    UnknownRole(String),
}

/// Build a [`Principal`] from the request headers.
///
/// # Errors
///
/// Returns a [`PrincipalError`] if either header is absent, non-ASCII, the id
/// is blank, or the role is not one of the known role names.
pub fn from_headers(headers: &HeaderMap) -> Result<Principal, PrincipalError> {
    let id = header_str(headers, PRINCIPAL_ID_HEADER)?.trim();
    if id.is_empty() {
        return Err(PrincipalError::EmptyId);
    }
    let role_name = header_str(headers, PRINCIPAL_ROLE_HEADER)?.trim();
    let role: Role = role_name
        .parse()
        .map_err(|_| PrincipalError::UnknownRole(role_name.to_owned()))?;
    Ok(Principal::new(id, role))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, PrincipalError> {
    headers
        .get(name)
        .ok_or(PrincipalError::Missing(name))?
        .to_str()
        .map_err(|_| PrincipalError::NotAscii(name))
}
