use std::sync::Arc;

use anyhow::Context;

use reblog_auth::{
    AccountStore, CredentialVerifier, InvitationMailer, InvitationManager, InvitationStore, LogMailer,
    PasswordHasher, TokenIssuer,
};
use reblog_infra::{InMemoryStore, PostgresStore, seed_admin};
use reblog_posts::{PostManager, PostStore};

use crate::config::ApiConfig;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub tokens: Arc<TokenIssuer>,
    pub credentials: CredentialVerifier,
    pub invitations: InvitationManager,
    pub posts: PostManager,
}

/// Storage handles for every port.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub invitations: Arc<dyn InvitationStore>,
    pub posts: Arc<dyn PostStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self::shared(Arc::new(InMemoryStore::new()))
    }

    /// One backing store serving all three ports.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: AccountStore + InvitationStore + PostStore + 'static,
    {
        Self {
            accounts: store.clone(),
            invitations: store.clone(),
            posts: store,
        }
    }
}

impl AppServices {
    pub fn new(
        tokens: TokenIssuer,
        hasher: PasswordHasher,
        stores: Stores,
        mailer: Arc<dyn InvitationMailer>,
    ) -> Self {
        Self {
            tokens: Arc::new(tokens),
            credentials: CredentialVerifier::new(stores.accounts.clone(), hasher),
            invitations: InvitationManager::new(stores.accounts, stores.invitations, mailer, hasher),
            posts: PostManager::new(stores.posts),
        }
    }
}

pub async fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let stores = if config.use_persistent_stores {
        build_persistent_stores(config).await?
    } else {
        tracing::info!("using in-memory stores");
        Stores::in_memory()
    };

    let hasher = PasswordHasher::new(config.bcrypt_cost);

    if let Some(seed) = &config.admin {
        seed_admin(stores.accounts.as_ref(), &hasher, seed)
            .await
            .context("failed to seed admin account")?;
    }

    let tokens = TokenIssuer::new(&config.token).context("invalid token configuration")?;
    Ok(AppServices::new(tokens, hasher, stores, Arc::new(LogMailer)))
}

async fn build_persistent_stores(config: &ApiConfig) -> anyhow::Result<Stores> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

    let store = PostgresStore::connect(database_url)
        .await
        .context("failed to connect to Postgres")?;
    store.migrate().await.context("failed to create schema")?;

    tracing::info!("using Postgres stores");
    Ok(Stores::shared(Arc::new(store)))
}
