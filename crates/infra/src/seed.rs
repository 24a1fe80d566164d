//! Bootstrap of the first admin account.
//!
//! Accounts are never self-registered, so a fresh deployment needs one admin
//! created by the operator before anyone can log in.

use reblog_auth::{Account, AccountStore, NewAccount, PasswordHasher, Role};
use reblog_core::{DomainError, DomainResult, is_email};

#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub moniker: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("moniker", &self.moniker)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Create the admin described by `seed` unless an account already owns the
/// email. Returns the existing or new account.
pub async fn seed_admin(
    accounts: &dyn AccountStore,
    hasher: &PasswordHasher,
    seed: &AdminSeed,
) -> DomainResult<Account> {
    if !is_email(&seed.email) {
        return Err(DomainError::configuration("admin seed email is not a valid address"));
    }
    if seed.password.is_empty() || seed.moniker.trim().is_empty() {
        return Err(DomainError::configuration("admin seed needs a moniker and a password"));
    }

    if let Some(existing) = accounts.find_account_by_email(&seed.email).await? {
        tracing::info!(account_id = %existing.id, "admin account already present");
        return Ok(existing);
    }

    let password_hash = hasher.hash(&seed.password).await?;
    let account = accounts
        .create_account(NewAccount {
            moniker: seed.moniker.clone(),
            role: Role::Admin,
            full_name: seed.moniker.clone(),
            about: String::new(),
            email: seed.email.clone(),
            password_hash,
        })
        .await?;

    tracing::info!(account_id = %account.id, "admin account seeded");
    Ok(account)
}
