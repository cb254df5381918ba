//! Reason codes explaining why a user is being contacted.
//!
//! [`ReasonCode`] is a closed set: ritual misses plus one inactivity tier per
//! configured threshold. Priorities are a total order where `1` is the most
//! urgent; channel eligibility and message copy are derived from the code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Priority assigned to a missed morning check-in.
pub const MISSED_CHECKIN_PRIORITY: u32 = 1;
/// Priority assigned to a missed evening reflection.
pub const MISSED_REFLECTION_PRIORITY: u32 = 2;
/// Built-in inactivity tiers in days.
pub const BUILT_IN_INACTIVITY_TIERS: [u32; 4] = [3, 7, 14, 30];
/// Inactivity tiers at or above this many days may be delivered by SMS.
pub const SMS_MIN_INACTIVE_DAYS: u32 = 7;

const FIRST_INACTIVITY_PRIORITY: u32 = 3;

/// Why a user is being contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReasonCode {
    /// No started daily plan by the check-in deadline.
    MissedCheckin,
    /// Daily plan exists but the evening reflection is incomplete.
    MissedReflection,
    /// No activity for at least `days` whole days.
    Inactive {
        /// Threshold bucket the user reached.
        days: u32,
    },
}

impl ReasonCode {
    /// Dispatch priority; lower numbers are more urgent.
    ///
    /// Inactivity tiers map through a single rule: `3` plus the number of
    /// built-in tiers strictly above the threshold. This yields the built-in
    /// values (30 → 3, 14 → 4, 7 → 5, 3 → 6) and never collides with the
    /// ritual priorities. Custom thresholds can share a priority with a
    /// built-in tier; [`crate::domain::detection::sort_by_priority`] breaks
    /// those ties by threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use outreach::domain::ReasonCode;
    ///
    /// assert_eq!(ReasonCode::MissedCheckin.priority(), 1);
    /// assert_eq!(ReasonCode::Inactive { days: 7 }.priority(), 5);
    /// assert_eq!(ReasonCode::Inactive { days: 10 }.priority(), 5);
    /// assert_eq!(ReasonCode::Inactive { days: 60 }.priority(), 3);
    /// ```
    pub fn priority(self) -> u32 {
        match self {
            Self::MissedCheckin => MISSED_CHECKIN_PRIORITY,
            Self::MissedReflection => MISSED_REFLECTION_PRIORITY,
            Self::Inactive { days } => {
                let tiers_above = BUILT_IN_INACTIVITY_TIERS
                    .iter()
                    .filter(|tier| **tier > days)
                    .count();
                FIRST_INACTIVITY_PRIORITY + u32::try_from(tiers_above).unwrap_or(u32::MAX - 3)
            }
        }
    }

    /// Inactivity threshold carried by the reason, if any.
    pub fn inactive_days(self) -> Option<u32> {
        match self {
            Self::Inactive { days } => Some(days),
            Self::MissedCheckin | Self::MissedReflection => None,
        }
    }

    /// Whether the reason is severe enough to justify SMS delivery.
    pub fn is_high_priority(self) -> bool {
        matches!(self, Self::Inactive { days } if days >= SMS_MIN_INACTIVE_DAYS)
    }

    /// Stable wire name, e.g. `missed_checkin` or `inactive_7_days`.
    pub fn as_key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissedCheckin => f.write_str("missed_checkin"),
            Self::MissedReflection => f.write_str("missed_reflection"),
            Self::Inactive { days } => write!(f, "inactive_{days}_days"),
        }
    }
}

/// Error returned when parsing an unknown reason key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outreach reason: {input}")]
pub struct ParseReasonCodeError {
    /// The unrecognised input value.
    pub input: String,
}

impl FromStr for ReasonCode {
    type Err = ParseReasonCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseReasonCodeError {
            input: s.to_owned(),
        };
        match s {
            "missed_checkin" => Ok(Self::MissedCheckin),
            "missed_reflection" => Ok(Self::MissedReflection),
            other => {
                let days = other
                    .strip_prefix("inactive_")
                    .and_then(|rest| rest.strip_suffix("_days"))
                    .and_then(|digits| digits.parse::<u32>().ok())
                    .filter(|days| *days > 0)
                    .ok_or_else(unknown)?;
                Ok(Self::Inactive { days })
            }
        }
    }
}

impl Serialize for ReasonCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReasonCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
