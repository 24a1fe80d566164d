//! `reblog-auth` — authentication, authorization and collaborator onboarding.
//!
//! This crate is intentionally decoupled from HTTP. Storage is reached only
//! through the ports in [`store`].

pub mod account;
pub mod claims;
pub mod credentials;
pub mod gate;
pub mod invitation;
pub mod mailer;
pub mod password;
pub mod roles;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use account::{Account, Invitation, NewAccount};
pub use claims::{Identity, SessionClaims, TokenValidationError, validate_claims};
pub use credentials::{CredentialVerifier, validate_login};
pub use gate::{carries_bearer, require_role};
pub use invitation::{InvitationManager, Registration, generate_invitation_token};
pub use mailer::{InvitationMailer, LogMailer, MailError};
pub use password::PasswordHasher;
pub use roles::Role;
pub use store::{AccountStore, InvitationStore};
pub use token::{TokenConfig, TokenIssuer};
