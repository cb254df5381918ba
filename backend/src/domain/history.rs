//! Outreach history ledger entries and delivery channels.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ReasonCode, UserId};

/// Delivery channel used for one outreach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Mobile push notification.
    Push,
    /// Queued email.
    Email,
    /// Text message.
    Sms,
}

impl Channel {
    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One delivered outreach.
///
/// `(user_id, outreach_type, sent_on)` is unique: the ledger holds at most one
/// entry per user and reason for each calendar day in the family timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachHistoryEntry {
    /// Recipient.
    pub user_id: UserId,
    /// Reason the outreach was sent for.
    pub outreach_type: ReasonCode,
    /// Channel that accepted the message.
    pub channel: Channel,
    /// Local calendar day the outreach counts against.
    pub sent_on: NaiveDate,
    /// Exact time the entry was written.
    pub recorded_at: DateTime<Utc>,
}

impl OutreachHistoryEntry {
    /// Build an entry for a delivery on `local_day`, recorded at `now`.
    pub fn delivered(
        user_id: UserId,
        outreach_type: ReasonCode,
        channel: Channel,
        local_day: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            outreach_type,
            channel,
            sent_on: local_day,
            recorded_at: now,
        }
    }
}
