//! Outbound invitation delivery.

use async_trait::async_trait;
use thiserror::Error;

use crate::Invitation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invitation could not be delivered: {0}")]
pub struct MailError(pub String);

/// Delivers a freshly issued or refreshed invitation to its recipient.
#[async_trait]
pub trait InvitationMailer: Send + Sync {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), MailError>;
}

/// Records the dispatch in the log and nothing else.
///
/// The token itself is never logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl InvitationMailer for LogMailer {
    async fn send_invitation(&self, invitation: &Invitation) -> Result<(), MailError> {
        tracing::info!(
            invitation_id = %invitation.id,
            email = %invitation.email,
            issued_at = %invitation.issued_at,
            "collaborator invitation dispatched"
        );
        Ok(())
    }
}
