//! Session token issuance and verification (HS256 JWT).

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use reblog_core::{AccountId, DomainError, DomainResult};

use crate::{Identity, Role, SessionClaims, validate_claims};

/// Signing configuration for session tokens.
///
/// Built once at start-up and injected into [`TokenIssuer`]; nothing in this
/// crate reads the environment.
#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenConfig {
    /// Session lifetime unless overridden.
    pub const DEFAULT_TTL_SECS: i64 = 5 * 60;

    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(Self::DEFAULT_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl core::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// On-the-wire claim set. Every field is optional on decode so that a missing
/// claim is reported as an invalid token instead of a serde panic path.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Issues and verifies signed session tokens.
///
/// Stateless apart from the immutable key material, so one instance is shared
/// by every request.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &TokenConfig) -> DomainResult<Self> {
        if config.secret.is_empty() {
            return Err(DomainError::configuration("token signing key is empty"));
        }
        if config.ttl <= Duration::zero() {
            return Err(DomainError::configuration("token ttl must be positive"));
        }

        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(&config.secret),
            decoding: DecodingKey::from_secret(&config.secret),
            validation,
            ttl: config.ttl,
        })
    }

    pub fn issue(&self, identity: &Identity) -> DomainResult<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Sign a token for `identity` that expires `ttl` after `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> DomainResult<String> {
        if !identity.is_set() {
            return Err(DomainError::configuration("session claims not set"));
        }

        let claims = WireClaims {
            account_id: Some(identity.account_id.get()),
            display_name: Some(identity.display_name.clone()),
            role: Some(serde_json::Value::from(identity.role.tag())),
            iat: Some(now.timestamp()),
            exp: Some((now + self.ttl).timestamp()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::configuration(format!("could not sign session token: {e}")))
    }

    pub fn verify(&self, token: &str) -> DomainResult<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Decode `token`, check its signature and time window against `now`.
    ///
    /// Every failure collapses into [`DomainError::InvalidToken`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> DomainResult<SessionClaims> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "session token rejected");
                DomainError::InvalidToken
            })?;

        let claims = into_session_claims(data.claims).ok_or(DomainError::InvalidToken)?;

        validate_claims(&claims, now).map_err(|e| {
            tracing::debug!(error = %e, account_id = %claims.account_id, "session token rejected");
            DomainError::InvalidToken
        })?;

        Ok(claims)
    }
}

impl core::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

fn into_session_claims(wire: WireClaims) -> Option<SessionClaims> {
    let account_id = wire.account_id.filter(|id| *id > 0)?;
    let display_name = wire.display_name.filter(|name| !name.is_empty())?;
    let issued_at = DateTime::<Utc>::from_timestamp(wire.iat?, 0)?;
    let expires_at = DateTime::<Utc>::from_timestamp(wire.exp?, 0)?;

    // Absent or non-integer role tags fall back to least privilege.
    let role = wire
        .role
        .as_ref()
        .and_then(serde_json::Value::as_i64)
        .map(Role::from_tag)
        .unwrap_or_default();

    Some(SessionClaims {
        account_id: AccountId::new(account_id),
        display_name,
        role,
        issued_at,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&TokenConfig::new(SECRET)).unwrap()
    }

    fn admin() -> Identity {
        Identity::new(AccountId::new(1), "hades", Role::Admin)
    }

    fn sign_raw(payload: serde_json::Value, secret: &str) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issue_then_verify_preserves_claims() {
        let issuer = issuer();
        let token = issuer.issue(&admin()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.account_id, AccountId::new(1));
        assert_eq!(claims.display_name, "hades");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.expires_at - claims.issued_at, Duration::minutes(5));
    }

    #[test]
    fn token_is_rejected_after_ttl() {
        let issuer = issuer();
        let now = Utc::now();
        let token = issuer.issue_at(&admin(), now).unwrap();

        assert!(issuer.verify_at(&token, now + Duration::minutes(4)).is_ok());
        assert_eq!(
            issuer.verify_at(&token, now + Duration::minutes(5) + Duration::seconds(1)),
            Err(DomainError::InvalidToken)
        );
    }

    #[test]
    fn issuing_without_claims_is_a_configuration_error() {
        let err = issuer()
            .issue(&Identity::new(AccountId::new(0), "", Role::Collaborator))
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn empty_signing_key_is_refused() {
        let err = TokenIssuer::new(&TokenConfig::new("")).unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let other = TokenIssuer::new(&TokenConfig::new("another-secret")).unwrap();
        let token = other.issue(&admin()).unwrap();
        assert_eq!(issuer().verify(&token), Err(DomainError::InvalidToken));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let issuer = issuer();
        let collaborator = Identity::new(AccountId::new(4), "alcheme", Role::Collaborator);
        let token = issuer.issue(&collaborator).unwrap();

        // Swap in the payload of an admin token while keeping the old signature.
        let forged_payload = issuer.issue(&admin()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = forged_payload.split('.').collect();
        parts[1] = admin_parts[1];
        let forged = parts.join(".");

        assert_eq!(issuer.verify(&forged), Err(DomainError::InvalidToken));
    }

    #[test]
    fn malformed_and_unsigned_tokens_are_rejected() {
        let issuer = issuer();
        assert_eq!(issuer.verify(""), Err(DomainError::InvalidToken));
        assert_eq!(issuer.verify("abc123"), Err(DomainError::InvalidToken));

        let token = issuer.issue(&admin()).unwrap();
        let unsigned = token.rsplit_once('.').map(|(head, _)| format!("{head}.")).unwrap();
        assert_eq!(issuer.verify(&unsigned), Err(DomainError::InvalidToken));
    }

    #[test]
    fn missing_or_unknown_role_decodes_as_collaborator() {
        let issuer = issuer();
        let now = Utc::now().timestamp();

        let missing = sign_raw(
            json!({ "account_id": 9, "display_name": "ghost", "iat": now, "exp": now + 60 }),
            SECRET,
        );
        assert_eq!(issuer.verify(&missing).unwrap().role, Role::Collaborator);

        let unknown = sign_raw(
            json!({ "account_id": 9, "display_name": "ghost", "role": 7, "iat": now, "exp": now + 60 }),
            SECRET,
        );
        assert_eq!(issuer.verify(&unknown).unwrap().role, Role::Collaborator);

        let textual = sign_raw(
            json!({ "account_id": 9, "display_name": "ghost", "role": "admin", "iat": now, "exp": now + 60 }),
            SECRET,
        );
        assert_eq!(issuer.verify(&textual).unwrap().role, Role::Collaborator);
    }

    #[test]
    fn missing_identity_or_expiry_is_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();

        let no_account = sign_raw(json!({ "display_name": "ghost", "role": 1, "iat": now, "exp": now + 60 }), SECRET);
        assert_eq!(issuer.verify(&no_account), Err(DomainError::InvalidToken));

        let no_expiry = sign_raw(json!({ "account_id": 9, "display_name": "ghost", "role": 1, "iat": now }), SECRET);
        assert_eq!(issuer.verify(&no_expiry), Err(DomainError::InvalidToken));
    }
}
