//! Port for delivering push notifications to a user's devices.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{MessageTemplate, OutreachUser, ReasonCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by push provider adapters.
    pub enum PushSenderError {
        /// The provider rejected the request or was unreachable.
        Provider {
            /// Adapter-supplied detail.
            message: String
        } => "push provider failure: {message}",
    }
}

/// Push payload sent to every usable device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Reason the push is sent for.
    pub outreach_type: ReasonCode,
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Deep link opened on tap.
    pub link: String,
}

impl PushMessage {
    /// Build a push payload from rendered copy.
    pub fn from_template(outreach_type: ReasonCode, template: &MessageTemplate) -> Self {
        Self {
            outreach_type,
            title: template.title.clone(),
            body: template.body.clone(),
            link: template.link.clone(),
        }
    }
}

/// Per-device delivery counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushDelivery {
    /// Devices that accepted the push.
    pub sent: u32,
    /// Devices that rejected it.
    pub failed: u32,
}

impl PushDelivery {
    /// Whether at least one device accepted the push.
    pub fn delivered(self) -> bool {
        self.sent > 0
    }
}

/// Sends a push to all of a user's usable devices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver `message` to the user's devices.
    ///
    /// A user without usable tokens yields `sent: 0` rather than an error.
    async fn send_to_user(
        &self,
        user: &OutreachUser,
        message: &PushMessage,
    ) -> Result<PushDelivery, PushSenderError>;
}

/// Fixture implementation that reaches no devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePushSender;

#[async_trait]
impl PushSender for FixturePushSender {
    async fn send_to_user(
        &self,
        _user: &OutreachUser,
        _message: &PushMessage,
    ) -> Result<PushDelivery, PushSenderError> {
        Ok(PushDelivery::default())
    }
}
