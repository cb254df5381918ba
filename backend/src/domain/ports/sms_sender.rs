//! Port for the SMS channel as seen by the dispatcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised when an SMS cannot be sent.
    pub enum SmsError {
        /// The number is not in E.164 form.
        InvalidPhoneNumber {
            /// The rejected number as given.
            phone: String
        } =>
            "phone number {phone:?} is not a valid E.164 number",
        /// The user already received the daily maximum of texts.
        DailyQuotaExceeded {
            /// Configured texts per user per day.
            limit: u32
        } =>
            "daily sms quota of {limit} messages exhausted",
        /// The transport rejected the message.
        Gateway {
            /// Adapter-supplied detail.
            message: String
        } => "sms gateway failure: {message}",
    }
}

/// Provider acknowledgement for one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsReceipt {
    /// Provider message identifier.
    pub message_sid: String,
}

/// Sends a text to a user, applying validation and per-user limits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send `body` to `phone` on behalf of `user_id`.
    async fn send(
        &self,
        user_id: &UserId,
        phone: &str,
        body: &str,
    ) -> Result<SmsReceipt, SmsError>;
}
