//! Collaborator invitation lifecycle: issue, redeem once, expire.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::{DateTime, Duration, Utc};

use reblog_core::{DomainError, DomainResult, FieldErrors, StoreError, is_email};

use crate::{
    Account, AccountStore, Invitation, InvitationMailer, InvitationStore, NewAccount, PasswordHasher, Role,
};

/// Random bytes behind each invitation token.
const TOKEN_BYTES: usize = 36;

/// Fresh single-use invitation token: 36 random bytes, URL-safe base64.
pub fn generate_invitation_token() -> DomainResult<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| DomainError::configuration(format!("system randomness unavailable: {e}")))?;
    Ok(URL_SAFE.encode(bytes))
}

/// Details a collaborator supplies when redeeming an invitation.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub moniker: String,
    pub full_name: String,
    pub password: String,
}

impl Registration {
    /// Checks every field and reports all defects together.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();
        if self.moniker.chars().count() < 4 {
            errors.add("moniker", "Your moniker should not be lesser than 4 characters");
        }
        if self.full_name.chars().count() < 6 {
            errors.add(
                "full_name",
                "Your name should not be lesser than 6 characters. E.g Lanre Adelowo",
            );
        }
        if self.password.chars().count() < 10 {
            errors.add("password", "Your password should have a length greater than 10");
        }
        errors.into_result()
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("moniker", &self.moniker)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

/// Issues invitations and turns them into collaborator accounts.
pub struct InvitationManager {
    accounts: Arc<dyn AccountStore>,
    invitations: Arc<dyn InvitationStore>,
    mailer: Arc<dyn InvitationMailer>,
    hasher: PasswordHasher,
    ttl: Duration,
}

impl InvitationManager {
    pub const DEFAULT_TTL_MINUTES: i64 = 20;

    pub fn new(
        accounts: Arc<dyn AccountStore>,
        invitations: Arc<dyn InvitationStore>,
        mailer: Arc<dyn InvitationMailer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            accounts,
            invitations,
            mailer,
            hasher,
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
        }
    }

    pub async fn invite(&self, email: &str) -> DomainResult<Invitation> {
        self.invite_at(email, Utc::now()).await
    }

    /// Issue (or refresh) the invitation for `email`.
    ///
    /// Fails with `Conflict` when an account already owns the address.
    pub async fn invite_at(&self, email: &str, now: DateTime<Utc>) -> DomainResult<Invitation> {
        if !is_email(email) {
            return Err(DomainError::validation("email", "Please provide a valid email address"));
        }

        if self.accounts.find_account_by_email(email).await.map_err(log_store)?.is_some() {
            return Err(DomainError::conflict("Email already identifies a collaborator"));
        }

        let token = generate_invitation_token()?;
        let invitation = self
            .invitations
            .create_or_refresh_invitation(email, &token, now)
            .await
            .map_err(log_store)?;

        tracing::info!(invitation_id = %invitation.id, "collaborator invited");

        if let Err(e) = self.mailer.send_invitation(&invitation).await {
            tracing::warn!(invitation_id = %invitation.id, error = %e, "invitation mail not sent");
        }

        Ok(invitation)
    }

    pub async fn redeem(&self, token: &str, registration: Registration) -> DomainResult<Account> {
        self.redeem_at(token, registration, Utc::now()).await
    }

    /// Consume an invitation and create the collaborator account.
    ///
    /// Checks run in a fixed order: existence, expiry, field validation,
    /// moniker availability. The invitation survives every failure and is
    /// deleted only after the account exists.
    pub async fn redeem_at(
        &self,
        token: &str,
        registration: Registration,
        now: DateTime<Utc>,
    ) -> DomainResult<Account> {
        let invitation = self
            .invitations
            .find_invitation_by_token(token)
            .await
            .map_err(log_store)?
            .ok_or(DomainError::NotFound)?;

        if invitation.is_expired_at(now, self.ttl) {
            tracing::debug!(invitation_id = %invitation.id, "expired invitation presented");
            return Err(DomainError::Expired);
        }

        registration.validate()?;

        if self
            .accounts
            .find_account_by_moniker(&registration.moniker)
            .await
            .map_err(log_store)?
            .is_some()
        {
            return Err(DomainError::conflict("This moniker is already taken"));
        }

        let password_hash = self.hasher.hash(&registration.password).await?;

        let account = self
            .accounts
            .create_account(NewAccount {
                moniker: registration.moniker,
                role: Role::Collaborator,
                full_name: registration.full_name,
                about: String::new(),
                email: invitation.email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(constraint) if constraint.contains("email") => {
                    DomainError::conflict("Email already identifies a collaborator")
                }
                StoreError::Conflict(_) => DomainError::conflict("This moniker is already taken"),
                other => log_store(other),
            })?;

        if let Err(e) = self.invitations.delete_invitation(&invitation).await {
            tracing::warn!(invitation_id = %invitation.id, error = %e, "redeemed invitation not deleted");
        }

        tracing::info!(account_id = %account.id, "collaborator account created");
        Ok(account)
    }

    /// Remove the collaborator identified by `email`.
    ///
    /// Admin accounts are refused with `Authorization`.
    pub async fn remove_collaborator(&self, email: &str) -> DomainResult<Account> {
        let account = self
            .accounts
            .find_account_by_email(email)
            .await
            .map_err(log_store)?
            .ok_or(DomainError::NotFound)?;

        if account.role.is_admin() {
            return Err(DomainError::Authorization);
        }

        self.accounts.delete_account(&account).await.map_err(log_store)?;
        tracing::info!(account_id = %account.id, "collaborator removed");
        Ok(account)
    }
}

fn log_store(err: StoreError) -> DomainError {
    match &err {
        StoreError::Conflict(what) => tracing::debug!(constraint = %what, "storage rejected duplicate"),
        StoreError::Backend(_) => tracing::error!(error = %err, "invitation storage failure"),
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStore;
    use crate::{LogMailer, MailError};
    use async_trait::async_trait;
    use std::sync::atomic::Ordering;

    struct FailingMailer;

    #[async_trait]
    impl InvitationMailer for FailingMailer {
        async fn send_invitation(&self, _: &Invitation) -> Result<(), MailError> {
            Err(MailError("smtp down".to_string()))
        }
    }

    fn manager(store: &Arc<FakeStore>) -> InvitationManager {
        InvitationManager::new(store.clone(), store.clone(), Arc::new(LogMailer), PasswordHasher::new(4))
    }

    fn registration() -> Registration {
        Registration {
            moniker: "alcheme".to_string(),
            full_name: "Lanre Adelowo".to_string(),
            password: "lanre123456".to_string(),
        }
    }

    #[test]
    fn tokens_are_url_safe_and_unique() {
        let a = generate_invitation_token().unwrap();
        let b = generate_invitation_token().unwrap();

        assert_ne!(a, b);
        assert_eq!(URL_SAFE.decode(&a).unwrap().len(), TOKEN_BYTES);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
    }

    #[test]
    fn registration_collects_every_defect() {
        let bad = Registration {
            moniker: "abc".to_string(),
            full_name: "Lanre".to_string(),
            password: "short".to_string(),
        };
        let DomainError::Validation(fields) = bad.validate().unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields.get("full_name"),
            Some("Your name should not be lesser than 6 characters. E.g Lanre Adelowo")
        );
        assert!(registration().validate().is_ok());
    }

    #[tokio::test]
    async fn invite_rejects_malformed_email_without_storage() {
        let store = Arc::new(FakeStore::new());
        let err = manager(&store).invite("not-an-email").await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn invite_rejects_existing_account() {
        let store = Arc::new(FakeStore::new());
        store.seed_account("me@lanre.me", "hades", Role::Admin, "x");

        let err = manager(&store).invite("me@lanre.me").await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(store.invitations().is_empty());
    }

    #[tokio::test]
    async fn reinvite_refreshes_the_single_invitation() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let now = Utc::now();

        let first = manager.invite_at("new@lanre.me", now - Duration::minutes(30)).await.unwrap();
        let second = manager.invite_at("new@lanre.me", now).await.unwrap();

        let live = store.invitations();
        assert_eq!(live.len(), 1);
        assert_eq!(first.id, second.id);
        assert_ne!(first.token, second.token);
        assert_eq!(live[0].issued_at, now);
    }

    #[tokio::test]
    async fn mailer_failure_is_not_surfaced() {
        let store = Arc::new(FakeStore::new());
        let manager =
            InvitationManager::new(store.clone(), store.clone(), Arc::new(FailingMailer), PasswordHasher::new(4));

        assert!(manager.invite("new@lanre.me").await.is_ok());
        assert_eq!(store.invitations().len(), 1);
    }

    #[tokio::test]
    async fn redeem_creates_collaborator_and_consumes_invitation() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();

        let account = manager.redeem(&invitation.token, registration()).await.unwrap();
        assert_eq!(account.role, Role::Collaborator);
        assert_eq!(account.email, "new@lanre.me");
        assert_ne!(account.password_hash, "lanre123456");
        assert!(store.invitations().is_empty());

        let again = manager.redeem(&invitation.token, registration()).await.unwrap_err();
        assert_eq!(again, DomainError::NotFound);
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let store = Arc::new(FakeStore::new());
        assert_eq!(
            manager(&store).redeem("nope", registration()).await.unwrap_err(),
            DomainError::NotFound
        );
    }

    #[tokio::test]
    async fn expiry_is_checked_before_validation() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();
        store.backdate_invitation(&invitation.token, Utc::now() - Duration::minutes(21));

        let invalid = Registration {
            moniker: "a".to_string(),
            full_name: "b".to_string(),
            password: "c".to_string(),
        };
        assert_eq!(
            manager.redeem(&invitation.token, invalid).await.unwrap_err(),
            DomainError::Expired
        );
        assert_eq!(store.invitations().len(), 1);
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn invitation_is_valid_up_to_the_ttl() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let now = Utc::now();
        let invitation = manager.invite_at("new@lanre.me", now).await.unwrap();

        let account = manager
            .redeem_at(&invitation.token, registration(), now + Duration::minutes(20))
            .await
            .unwrap();
        assert_eq!(account.email, "new@lanre.me");
    }

    #[tokio::test]
    async fn validation_failure_keeps_invitation() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();

        let mut short = registration();
        short.password = "123".to_string();
        let err = manager.redeem(&invitation.token, short).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(store.invitations().len(), 1);
    }

    #[tokio::test]
    async fn taken_moniker_is_a_conflict() {
        let store = Arc::new(FakeStore::new());
        store.seed_account("me@lanre.me", "alcheme", Role::Admin, "x");
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();

        let err = manager.redeem(&invitation.token, registration()).await.unwrap_err();
        assert_eq!(err, DomainError::conflict("This moniker is already taken"));
        assert_eq!(store.invitations().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_keeps_invitation() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();
        store.fail_account_writes.store(true, Ordering::SeqCst);

        let err = manager.redeem(&invitation.token, registration()).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        assert_eq!(store.invitations().len(), 1);
    }

    #[tokio::test]
    async fn failed_invitation_cleanup_still_succeeds() {
        let store = Arc::new(FakeStore::new());
        let manager = manager(&store);
        let invitation = manager.invite("new@lanre.me").await.unwrap();
        store.fail_invitation_delete.store(true, Ordering::SeqCst);

        assert!(manager.redeem(&invitation.token, registration()).await.is_ok());
        assert_eq!(store.accounts().len(), 1);
    }

    #[tokio::test]
    async fn remove_collaborator_refuses_admins_and_unknowns() {
        let store = Arc::new(FakeStore::new());
        store.seed_account("me@lanre.me", "hades", Role::Admin, "x");
        store.seed_account("c@lanre.me", "alcheme", Role::Collaborator, "x");
        let manager = manager(&store);

        assert_eq!(
            manager.remove_collaborator("me@lanre.me").await.unwrap_err(),
            DomainError::Authorization
        );
        assert_eq!(
            manager.remove_collaborator("ghost@lanre.me").await.unwrap_err(),
            DomainError::NotFound
        );

        let removed = manager.remove_collaborator("c@lanre.me").await.unwrap();
        assert_eq!(removed.moniker, "alcheme");
        assert_eq!(store.accounts().len(), 1);
    }
}
