use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reblog_core::AccountId;

use crate::{Account, Role};

/// The identity facts a session token is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub account_id: AccountId,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    pub fn new(account_id: AccountId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            account_id,
            display_name: display_name.into(),
            role,
        }
    }

    /// Whether enough is set to sign a token for this identity.
    pub fn is_set(&self) -> bool {
        self.account_id.get() > 0 && !self.display_name.trim().is_empty()
    }
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            display_name: account.moniker.clone(),
            role: account.role,
        }
    }
}

/// Claims carried by a verified session token.
///
/// This is what request handlers see once the token has been decoded and its
/// signature and time window checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub account_id: AccountId,
    pub display_name: String,
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this, in [`crate::TokenIssuer`].
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
