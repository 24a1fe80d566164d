//! Postgres-backed implementation of every storage port.
//!
//! ## Error Mapping
//!
//! | SQLx error | Postgres code | `StoreError` |
//! |------------|---------------|--------------|
//! | Database (unique violation) | `23505` | `Conflict` (constraint name) |
//! | Database (other) | any | `Backend` |
//! | PoolClosed / io / other | n/a | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use reblog_auth::{Account, AccountStore, Invitation, InvitationStore, NewAccount, Role};
use reblog_core::{AccountId, InvitationId, PostId, StoreError};
use reblog_posts::{NewPost, Post, PostStatus, PostStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id            BIGSERIAL PRIMARY KEY,
        moniker       TEXT        NOT NULL UNIQUE,
        role          SMALLINT    NOT NULL DEFAULT 0,
        full_name     TEXT        NOT NULL,
        about         TEXT        NOT NULL DEFAULT '',
        email         TEXT        NOT NULL UNIQUE,
        password_hash TEXT        NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invitations (
        id        BIGSERIAL PRIMARY KEY,
        token     TEXT        NOT NULL UNIQUE,
        email     TEXT        NOT NULL UNIQUE,
        issued_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS posts (
        id         BIGSERIAL PRIMARY KEY,
        title      TEXT        NOT NULL UNIQUE,
        slug       TEXT        NOT NULL UNIQUE,
        content    TEXT        NOT NULL,
        status     SMALLINT    NOT NULL DEFAULT 0,
        author_id  BIGINT      NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

const ACCOUNT_COLUMNS: &str =
    "id, moniker, role, full_name, about, email, password_hash, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, slug, content, status, author_id, created_at, updated_at";

/// Storage over a shared `PgPool`. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet. Safe to run on every start.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }

    async fn fetch_account(&self, column: &str, value: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = $1");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_account", e))?;
        row.as_ref().map(account_from_row).transpose().map_err(row_error)
    }

    async fn fetch_post(&self, column: &str, value: &str) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE {column} = $1");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_post", e))?;
        row.as_ref().map(post_from_row).transpose().map_err(row_error)
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_account("email", email).await
    }

    async fn find_account_by_moniker(&self, moniker: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_account("moniker", moniker).await
    }

    #[instrument(skip(self, account), fields(moniker = %account.moniker), err)]
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            "INSERT INTO accounts (moniker, role, full_name, about, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&account.moniker)
            .bind(account.role.tag() as i16)
            .bind(&account.full_name)
            .bind(&account.about)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_account", e))?;
        account_from_row(&row).map_err(row_error)
    }

    async fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account.id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_account", e))?;
        Ok(())
    }
}

#[async_trait]
impl InvitationStore for PostgresStore {
    #[instrument(skip(self, token), err)]
    async fn create_or_refresh_invitation(
        &self,
        email: &str,
        token: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Invitation, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO invitations (email, token, issued_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET token = EXCLUDED.token, issued_at = EXCLUDED.issued_at
            RETURNING id, token, email, issued_at
            "#,
        )
        .bind(email)
        .bind(token)
        .bind(issued_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_or_refresh_invitation", e))?;
        invitation_from_row(&row).map_err(row_error)
    }

    async fn find_invitation_by_token(&self, token: &str) -> Result<Option<Invitation>, StoreError> {
        let row = sqlx::query("SELECT id, token, email, issued_at FROM invitations WHERE token = $1")
            .bind(token)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_invitation_by_token", e))?;
        row.as_ref().map(invitation_from_row).transpose().map_err(row_error)
    }

    async fn delete_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(invitation.id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invitation", e))?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PostgresStore {
    async fn find_post_by_title(&self, title: &str) -> Result<Option<Post>, StoreError> {
        self.fetch_post("title", title).await
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        self.fetch_post("slug", slug).await
    }

    async fn find_post_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_post_by_id", e))?;
        row.as_ref().map(post_from_row).transpose().map_err(row_error)
    }

    #[instrument(skip(self, post), fields(slug = %post.slug), err)]
    async fn create_post(&self, post: NewPost) -> Result<Post, StoreError> {
        let sql = format!(
            "INSERT INTO posts (title, slug, content, status, author_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&post.title)
            .bind(&post.slug)
            .bind(&post.content)
            .bind(post.status.tag() as i16)
            .bind(post.author_id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_post", e))?;
        post_from_row(&row).map_err(row_error)
    }

    async fn delete_post(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post.id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;
        Ok(())
    }

    async fn unpublish_post(&self, post: &Post) -> Result<Post, StoreError> {
        let sql = format!(
            "UPDATE posts SET status = $1, updated_at = now() WHERE id = $2 RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(PostStatus::Unpublished.tag() as i16)
            .bind(post.id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("unpublish_post", e))?
            .ok_or_else(|| StoreError::backend(format!("post {} no longer exists", post.id)))?;
        post_from_row(&row).map_err(row_error)
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: AccountId::new(row.try_get("id")?),
        moniker: row.try_get("moniker")?,
        role: Role::from_tag(i64::from(row.try_get::<i16, _>("role")?)),
        full_name: row.try_get("full_name")?,
        about: row.try_get("about")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn invitation_from_row(row: &PgRow) -> Result<Invitation, sqlx::Error> {
    Ok(Invitation {
        id: InvitationId::new(row.try_get("id")?),
        token: row.try_get("token")?,
        email: row.try_get("email")?,
        issued_at: row.try_get("issued_at")?,
    })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        content: row.try_get("content")?,
        status: PostStatus::from_tag(i64::from(row.try_get::<i16, _>("status")?)),
        author_id: AccountId::new(row.try_get("author_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_error(err: sqlx::Error) -> StoreError {
    StoreError::backend(format!("failed to decode row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                StoreError::Conflict(constraint)
            } else {
                StoreError::backend(format!("database error in {operation}: {}", db_err.message()))
            }
        }
        sqlx::Error::PoolClosed => StoreError::backend(format!("connection pool closed in {operation}")),
        other => StoreError::backend(format!("sqlx error in {operation}: {other}")),
    }
}
