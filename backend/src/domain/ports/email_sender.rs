//! Port for queueing outreach email.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{FamilyId, ReasonCode, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by email queue adapters.
    pub enum EmailSenderError {
        /// The message could not be queued.
        Queue {
            /// Adapter-supplied detail.
            message: String
        } => "email could not be queued: {message}",
    }
}

/// Email job handed to the mail queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachEmail {
    /// Reason the email is sent for.
    pub outreach_type: ReasonCode,
    /// Recipient user.
    pub user_id: UserId,
    /// Family context, if any.
    pub family_id: Option<FamilyId>,
    /// Name used in the greeting.
    pub recipient_name: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
    /// Call-to-action deep link.
    pub link: String,
}

/// Queues email for asynchronous delivery.
///
/// Acceptance by the queue counts as success; bounces are out of band.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Queue `email` for delivery.
    async fn enqueue(&self, email: &OutreachEmail) -> Result<(), EmailSenderError>;
}

/// Fixture implementation that accepts and drops every email.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureEmailSender;

#[async_trait]
impl EmailSender for FixtureEmailSender {
    async fn enqueue(&self, _email: &OutreachEmail) -> Result<(), EmailSenderError> {
        Ok(())
    }
}
