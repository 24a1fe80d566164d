//! Account and invitation entities.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use reblog_core::{AccountId, Entity, InvitationId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Account
// ─────────────────────────────────────────────────────────────────────────────

/// A persisted admin or collaborator.
///
/// # Invariants
/// - `email` and `moniker` are unique across all accounts (enforced by the store).
/// - `role` is fixed at creation; nothing in this crate mutates it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub moniker: String,
    pub role: Role,
    pub full_name: String,
    pub about: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("moniker", &self.moniker)
            .field("role", &self.role)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Account data handed to the store; the store assigns id and timestamps.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub moniker: String,
    pub role: Role,
    pub full_name: String,
    pub about: String,
    pub email: String,
    pub password_hash: String,
}

impl core::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAccount")
            .field("moniker", &self.moniker)
            .field("role", &self.role)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Invitation
// ─────────────────────────────────────────────────────────────────────────────

/// A pending offer for `email` to become a collaborator.
///
/// At most one exists per email; re-inviting refreshes `token` and `issued_at`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    pub token: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl Invitation {
    /// Expired once strictly more than `ttl` has elapsed since issuance.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

impl core::fmt::Debug for Invitation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Invitation")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl Entity for Invitation {
    type Id = InvitationId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
