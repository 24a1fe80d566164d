use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use reblog_auth::{Account, AccountStore, Invitation, InvitationStore, NewAccount};
use reblog_core::{AccountId, InvitationId, PostId, StoreError};
use reblog_posts::{NewPost, Post, PostStatus, PostStore};

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, Account>,
    invitations: BTreeMap<InvitationId, Invitation>,
    posts: BTreeMap<PostId, Post>,
    last_account_id: i64,
    last_invitation_id: i64,
    last_post_id: i64,
}

/// In-memory implementation of every storage port.
///
/// Intended for tests/dev. A single lock guards all tables, so uniqueness
/// checks and inserts happen atomically.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("lock poisoned"))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_moniker(&self, moniker: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.read()?.accounts.values().find(|a| a.moniker == moniker).cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut tables = self.write()?;

        if tables.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("accounts.email".to_string()));
        }
        if tables.accounts.values().any(|a| a.moniker == account.moniker) {
            return Err(StoreError::Conflict("accounts.moniker".to_string()));
        }

        tables.last_account_id += 1;
        let now = Utc::now();
        let created = Account {
            id: AccountId::new(tables.last_account_id),
            moniker: account.moniker,
            role: account.role,
            full_name: account.full_name,
            about: account.about,
            email: account.email,
            password_hash: account.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        self.write()?.accounts.remove(&account.id);
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for InMemoryStore {
    async fn create_or_refresh_invitation(
        &self,
        email: &str,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Invitation, StoreError> {
        let mut tables = self.write()?;

        if tables
            .invitations
            .values()
            .any(|i| i.token == token && i.email != email)
        {
            return Err(StoreError::Conflict("invitations.token".to_string()));
        }

        if let Some(existing) = tables.invitations.values_mut().find(|i| i.email == email) {
            existing.token = token.to_string();
            existing.issued_at = issued_at;
            return Ok(existing.clone());
        }

        tables.last_invitation_id += 1;
        let invitation = Invitation {
            id: InvitationId::new(tables.last_invitation_id),
            token: token.to_string(),
            email: email.to_string(),
            issued_at,
        };
        tables.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        Ok(self.read()?.invitations.values().find(|i| i.token == token).cloned())
    }

    async fn delete_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.write()?.invitations.remove(&invitation.id);
        Ok(())
    }
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.read()?.posts.values().find(|p| p.title == title).cloned())
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        Ok(self.read()?.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn find_post_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let mut tables = self.write()?;

        if tables.posts.values().any(|p| p.title == post.title) {
            return Err(StoreError::Conflict("posts.title".to_string()));
        }
        if tables.posts.values().any(|p| p.slug == post.slug) {
            return Err(StoreError::Conflict("posts.slug".to_string()));
        }

        tables.last_post_id += 1;
        let now = Utc::now();
        let created = Post {
            id: PostId::new(tables.last_post_id),
            title: post.title,
            slug: post.slug,
            content: post.content,
            status: post.status,
            author_id: post.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_post(&self, post: &Post) -> Result<(), StoreError> {
        self.write()?.posts.remove(&post.id);
        Ok(())
    }

    async fn unpublish_post(&self, post: &Post) -> Result<Post, StoreError> {
        let mut tables = self.write()?;
        let row = tables
            .posts
            .get_mut(&post.id)
            .ok_or_else(|| StoreError::backend(format!("post {} no longer exists", post.id)))?;
        row.status = PostStatus::Unpublished;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}
