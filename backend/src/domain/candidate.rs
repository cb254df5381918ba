//! Outreach candidates produced by detection.

use serde::{Deserialize, Serialize};

use super::{Family, OutreachUser, ReasonCode};

/// A user selected for outreach together with the reason and its context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachCandidate {
    /// The user to contact.
    pub user: OutreachUser,
    /// Why the user is being contacted.
    pub reason: ReasonCode,
    /// Dispatch priority derived from `reason`; lower is more urgent.
    pub priority: u32,
    /// Family context used for local time and deep links.
    pub family: Option<Family>,
}

impl OutreachCandidate {
    /// Build a candidate, deriving the priority from the reason.
    pub fn new(user: OutreachUser, reason: ReasonCode, family: Option<Family>) -> Self {
        Self {
            user,
            reason,
            priority: reason.priority(),
            family,
        }
    }
}
