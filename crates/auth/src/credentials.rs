//! Login credential validation and verification.

use std::sync::Arc;

use reblog_core::{DomainError, DomainResult, FieldErrors, is_email};

use crate::{Account, AccountStore, PasswordHasher};

/// Structural checks on login input. Performs no I/O.
pub fn validate_login(email: &str, password: &str) -> DomainResult<()> {
    let mut errors = FieldErrors::new();
    if !is_email(email) {
        errors.add("email", "Please provide a valid email address");
    }
    if password.is_empty() {
        errors.add("password", "Please provide a password");
    }
    errors.into_result()
}

/// Checks an email/password pair against stored bcrypt hashes.
pub struct CredentialVerifier {
    accounts: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
}

impl CredentialVerifier {
    pub fn new(accounts: Arc<dyn AccountStore>, hasher: PasswordHasher) -> Self {
        Self { accounts, hasher }
    }

    /// Returns the account on success.
    ///
    /// Unknown email and wrong password both fail with
    /// [`DomainError::Authentication`].
    pub async fn verify(&self, email: &str, password: &str) -> DomainResult<Account> {
        validate_login(email, password)?;

        let found = self.accounts.find_account_by_email(email).await.map_err(|e| {
            tracing::error!(error = %e, "account lookup failed during login");
            DomainError::from(e)
        })?;

        let Some(account) = found else {
            // Spend the same bcrypt work as a real comparison.
            let _ = self.hasher.hash(password).await;
            tracing::debug!("login rejected: unknown account");
            return Err(DomainError::Authentication);
        };

        if !self.hasher.verify(password, &account.password_hash).await? {
            tracing::debug!(account_id = %account.id, "login rejected: password mismatch");
            return Err(DomainError::Authentication);
        }

        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;
    use crate::testing::FakeStore;
    use std::sync::atomic::Ordering;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(4)
    }

    async fn verifier_with_account() -> (Arc<FakeStore>, CredentialVerifier) {
        let store = Arc::new(FakeStore::new());
        let hash = hasher().hash("lanre123456").await.unwrap();
        store.seed_account("me@lanre.me", "hades", Role::Admin, &hash);
        let verifier = CredentialVerifier::new(store.clone(), hasher());
        (store, verifier)
    }

    #[test]
    fn validate_login_reports_every_field() {
        let err = validate_login("", "").unwrap_err();
        let DomainError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("email"), Some("Please provide a valid email address"));
        assert_eq!(fields.get("password"), Some("Please provide a password"));

        assert!(validate_login("me@lanre.me", "x").is_ok());
    }

    #[tokio::test]
    async fn correct_credentials_return_the_account() {
        let (_, verifier) = verifier_with_account().await;
        let account = verifier.verify("me@lanre.me", "lanre123456").await.unwrap();
        assert_eq!(account.moniker, "hades");
        assert_eq!(account.role, Role::Admin);
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() {
        let (_, verifier) = verifier_with_account().await;

        let unknown = verifier.verify("nobody@lanre.me", "lanre123456").await.unwrap_err();
        let wrong = verifier.verify("me@lanre.me", "not-the-password").await.unwrap_err();

        assert_eq!(unknown, DomainError::Authentication);
        assert_eq!(unknown, wrong);
    }

    #[tokio::test]
    async fn store_failure_is_a_persistence_error() {
        let (store, verifier) = verifier_with_account().await;
        store.fail_reads.store(true, Ordering::SeqCst);

        let err = verifier.verify("me@lanre.me", "lanre123456").await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
    }

    #[tokio::test]
    async fn corrupt_stored_hash_fails_authentication() {
        let store = Arc::new(FakeStore::new());
        store.seed_account("me@lanre.me", "hades", Role::Admin, "garbage");
        let verifier = CredentialVerifier::new(store, hasher());

        assert_eq!(
            verifier.verify("me@lanre.me", "lanre123456").await.unwrap_err(),
            DomainError::Authentication
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

            #[test]
            fn malformed_emails_never_reach_storage(email in "[a-z0-9.]{0,20}", password in ".{1,20}") {
                let store = Arc::new(FakeStore::new());
                let verifier = CredentialVerifier::new(store.clone(), hasher());
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .unwrap();

                let result = runtime.block_on(verifier.verify(&email, &password));

                prop_assert!(matches!(result, Err(DomainError::Validation(_))));
                prop_assert_eq!(store.calls(), 0);
            }
        }
    }
}
