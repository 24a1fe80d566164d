//! Request gates: guest-only and role-gated access.

use reblog_core::{DomainError, DomainResult};

use crate::{Role, SessionClaims};

const BEARER: &str = "bearer";

/// Whether an `Authorization` header value looks like a bearer credential.
///
/// Presence check only: the token is not verified. Values of seven characters
/// or fewer never count, so a bare `Bearer ` is ignored.
pub fn carries_bearer(header: Option<&str>) -> bool {
    let Some(value) = header else {
        return false;
    };
    value.len() > BEARER.len() + 1
        && value
            .get(..BEARER.len())
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case(BEARER))
}

/// Allow the request only when verified claims carry exactly `required`.
pub fn require_role(claims: Option<&SessionClaims>, required: Role) -> DomainResult<()> {
    let Some(claims) = claims else {
        return Err(DomainError::InvalidToken);
    };
    if claims.role != required {
        tracing::warn!(
            account_id = %claims.account_id,
            role = %claims.role,
            required = %required,
            "role gate rejected request"
        );
        return Err(DomainError::Authorization);
    }
    Ok(())
}
