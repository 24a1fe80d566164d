//! Process configuration, read once from the environment at start-up.

use std::net::SocketAddr;

use anyhow::Context;
use chrono::Duration;

use reblog_auth::{PasswordHasher, TokenConfig};
use reblog_infra::AdminSeed;
use reblog_observability::LogFormat;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub token: TokenConfig,
    pub bcrypt_cost: u32,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    pub admin: Option<AdminSeed>,
    pub log_format: LogFormat,
    /// Set when `JWT_SECRET` was missing and the insecure default is in use.
    pub dev_secret: bool,
}

impl ApiConfig {
    /// Defaults for everything except the signing secret.
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            token: TokenConfig::new(jwt_secret),
            bcrypt_cost: PasswordHasher::DEFAULT_COST,
            use_persistent_stores: false,
            database_url: None,
            admin: None,
            log_format: LogFormat::Json,
            dev_secret: false,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let (secret, dev_secret) = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => (secret, false),
            None => (DEV_SECRET.to_string(), true),
        };
        let mut config = Self::new(secret);
        config.dev_secret = dev_secret;

        if let Some(addr) = lookup("REBLOG_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("REBLOG_BIND_ADDR is not a socket address: {addr}"))?;
        }

        if let Some(ttl) = lookup("REBLOG_SESSION_TTL_SECS") {
            let secs: i64 = ttl
                .parse()
                .with_context(|| format!("REBLOG_SESSION_TTL_SECS is not an integer: {ttl}"))?;
            anyhow::ensure!(secs > 0, "REBLOG_SESSION_TTL_SECS must be positive");
            config.token = config.token.with_ttl(Duration::seconds(secs));
        }

        if let Some(cost) = lookup("REBLOG_BCRYPT_COST") {
            config.bcrypt_cost = cost
                .parse()
                .with_context(|| format!("REBLOG_BCRYPT_COST is not an integer: {cost}"))?;
        }

        config.use_persistent_stores = lookup("USE_PERSISTENT_STORES")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);
        config.database_url = lookup("DATABASE_URL");
        if config.use_persistent_stores && config.database_url.is_none() {
            anyhow::bail!("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        }

        config.admin = match (
            lookup("REBLOG_ADMIN_EMAIL"),
            lookup("REBLOG_ADMIN_MONIKER"),
            lookup("REBLOG_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(moniker), Some(password)) => Some(AdminSeed {
                email,
                moniker,
                password,
            }),
            (None, None, None) => None,
            _ => anyhow::bail!(
                "REBLOG_ADMIN_EMAIL, REBLOG_ADMIN_MONIKER and REBLOG_ADMIN_PASSWORD must be set together"
            ),
        };

        if let Some(format) = lookup("REBLOG_LOG_FORMAT") {
            config.log_format = format.parse().map_err(anyhow::Error::msg)?;
        }

        Ok(config)
    }
}
