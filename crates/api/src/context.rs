use reblog_auth::{Role, SessionClaims};
use reblog_core::AccountId;

/// Verified session for a request.
///
/// Inserted by the auth middleware; present on every `/reblog` route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    claims: SessionClaims,
}

impl SessionContext {
    pub fn new(claims: SessionClaims) -> Self {
        Self { claims }
    }

    pub fn account_id(&self) -> AccountId {
        self.claims.account_id
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }
}
