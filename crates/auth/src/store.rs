//! Storage ports consumed by the auth core.
//!
//! Implementations live in `reblog-infra`. Uniqueness (account email and
//! moniker, one invitation per email) is the store's job: conflicting writes
//! must fail with [`StoreError::Conflict`] rather than be silently merged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use reblog_core::StoreError;

use crate::{Account, Invitation, NewAccount};

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_moniker(&self, moniker: &str) -> Result<Option<Account>, StoreError>;

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Deleting an account that is already gone is not an error.
    async fn delete_account(&self, account: &Account) -> Result<(), StoreError>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Insert the invitation for `email`, or overwrite token and issue time of
    /// the existing one.
    async fn create_or_refresh_invitation(
        &self,
        email: &str,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Invitation, StoreError>;

    async fn find_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError>;

    async fn delete_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;
}
