//! In-memory fakes for the storage ports, with failure switches and call
//! counters so tests can assert what did (or did not) touch storage.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use reblog_core::{AccountId, InvitationId, StoreError};

use crate::{Account, AccountStore, Invitation, InvitationStore, NewAccount, Role};

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    invitations: Vec<Invitation>,
    next_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    state: Mutex<State>,
    pub calls: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_account_writes: AtomicBool,
    pub fail_invitation_delete: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seed_account(&self, email: &str, moniker: &str, role: Role, password_hash: &str) -> Account {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(state.next_id()),
            moniker: moniker.to_string(),
            role,
            full_name: "Seeded Account".to_string(),
            about: String::new(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(account.clone());
        account
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.state.lock().unwrap().accounts.clone()
    }

    pub fn invitations(&self) -> Vec<Invitation> {
        self.state.lock().unwrap().invitations.clone()
    }

    pub fn backdate_invitation(&self, token: &str, issued_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        if let Some(inv) = state.invitations.iter_mut().find(|i| i.token == token) {
            inv.issued_at = issued_at;
        }
    }

    fn touch(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::backend("read failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FakeStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_moniker(&self, moniker: &str) -> Result<Option<Account>, StoreError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state.accounts.iter().find(|a| a.moniker == moniker).cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_account_writes.load(Ordering::SeqCst) {
            return Err(StoreError::backend("write failure"));
        }
        let mut state = self.state.lock().unwrap();
        if state
            .accounts
            .iter()
            .any(|a| a.email == account.email || a.moniker == account.moniker)
        {
            return Err(StoreError::Conflict("accounts".to_string()));
        }
        let now = Utc::now();
        let created = Account {
            id: AccountId::new(state.next_id()),
            moniker: account.moniker,
            role: account.role,
            full_name: account.full_name,
            about: account.about,
            email: account.email,
            password_hash: account.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(created.clone());
        Ok(created)
    }

    async fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap().accounts.retain(|a| a.id != account.id);
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for FakeStore {
    async fn create_or_refresh_invitation(
        &self,
        email: &str,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Invitation, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(existing) = state.invitations.iter_mut().find(|i| i.email == email) {
            existing.token = token.to_string();
            existing.issued_at = issued_at;
            return Ok(existing.clone());
        }
        let invitation = Invitation {
            id: InvitationId::new(state.next_id()),
            token: token.to_string(),
            email: email.to_string(),
            issued_at,
        };
        state.invitations.push(invitation.clone());
        Ok(invitation)
    }

    async fn find_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        self.touch()?;
        let state = self.state.lock().unwrap();
        Ok(state.invitations.iter().find(|i| i.token == token).cloned())
    }

    async fn delete_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_invitation_delete.load(Ordering::SeqCst) {
            return Err(StoreError::backend("delete failure"));
        }
        self.state.lock().unwrap().invitations.retain(|i| i.id != invitation.id);
        Ok(())
    }
}
