//! Dispatch outcomes and batch summaries.
//!
//! Skips and channel failures are expected results, not errors. They are
//! reported as values so a batch can tally them and keep going.

use serde::{Deserialize, Serialize};

use crate::domain::{Channel, ReasonCode, UserId};

/// Why an outreach was deliberately not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The ledger already holds an entry for this user, reason, and local day.
    AlreadySentToday,
    /// The user's local time is inside their quiet hours.
    QuietHours,
    /// The family timezone is not a known IANA name.
    InvalidTimezone,
}

/// Why an outreach could not be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No channel is both enabled and eligible for the reason.
    NoAvailableChannel,
    /// Every eligible channel was attempted and failed.
    DeliveryFailed,
}

/// Terminal result of a single [`super::OutreachService::send_outreach`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutreachOutcome {
    /// A channel accepted the message and the ledger recorded it.
    Sent {
        /// Channel that accepted the message.
        channel: Channel,
    },
    /// Nothing was sent on purpose.
    Skipped {
        /// Skip cause.
        reason: SkipReason,
    },
    /// Delivery was wanted but not possible.
    Failed {
        /// Failure cause.
        reason: FailureReason,
    },
}

impl OutreachOutcome {
    /// Whether a message was delivered.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    /// Whether the outreach was deliberately skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Channel used for a successful delivery.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            Self::Sent { channel } => Some(*channel),
            Self::Skipped { .. } | Self::Failed { .. } => None,
        }
    }
}

/// Per-candidate result recorded in a [`BatchSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Delivered through `channel`.
    Sent {
        /// Channel that accepted the message.
        channel: Channel,
    },
    /// Deliberately skipped.
    Skipped {
        /// Skip cause.
        reason: SkipReason,
    },
    /// Could not be delivered.
    Failed {
        /// Failure cause.
        reason: FailureReason,
    },
    /// Dispatch raised an unexpected error.
    Error {
        /// Error description.
        message: String,
    },
}

impl From<OutreachOutcome> for DispatchOutcome {
    fn from(value: OutreachOutcome) -> Self {
        match value {
            OutreachOutcome::Sent { channel } => Self::Sent { channel },
            OutreachOutcome::Skipped { reason } => Self::Skipped { reason },
            OutreachOutcome::Failed { reason } => Self::Failed { reason },
        }
    }
}

/// Outcome for one candidate in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchDetail {
    /// Candidate user.
    pub user_id: UserId,
    /// Candidate reason.
    pub reason: ReasonCode,
    /// What happened.
    pub outcome: DispatchOutcome,
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    /// Candidates delivered.
    pub sent: usize,
    /// Candidates skipped.
    pub skipped: usize,
    /// Candidates that failed or errored.
    pub failed: usize,
    /// Per-candidate outcomes in processing order.
    pub details: Vec<DispatchDetail>,
}

impl BatchSummary {
    /// Count and keep `detail`.
    pub fn record(&mut self, detail: DispatchDetail) {
        match detail.outcome {
            DispatchOutcome::Sent { .. } => self.sent += 1,
            DispatchOutcome::Skipped { .. } => self.skipped += 1,
            DispatchOutcome::Failed { .. } | DispatchOutcome::Error { .. } => self.failed += 1,
        }
        self.details.push(detail);
    }

    /// Number of candidates processed.
    pub fn total(&self) -> usize {
        self.details.len()
    }
}
