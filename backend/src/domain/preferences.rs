//! Notification preferences and quiet-hours windows.
//!
//! A user owns at most one [`NotificationPreferences`] record. Users who never
//! saved settings have none; [`NotificationPreferences::default`] is the single
//! canonical value used in that case.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Parse a local time-of-day written as `HH:MM` or `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use outreach::domain::parse_time_of_day;
///
/// let parsed = parse_time_of_day("07:30").expect("valid time");
/// assert_eq!(parsed, NaiveTime::from_hms_opt(7, 30, 0).expect("valid"));
/// assert!(parse_time_of_day("25:00").is_err());
/// ```
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, TimeOfDayParseError> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| TimeOfDayParseError {
            input: raw.to_owned(),
        })
}

/// Error returned when a time-of-day string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time of day: {input:?}; expected HH:MM")]
pub struct TimeOfDayParseError {
    /// The rejected input.
    pub input: String,
}

mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

/// A local time window during which no outreach may be delivered.
///
/// Windows whose start is after their end wrap past midnight. The start is
/// inclusive and the end exclusive; equal bounds describe an empty window.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use outreach::domain::QuietHours;
///
/// let overnight = QuietHours::parse("22:00", "07:00").expect("valid window");
/// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).expect("valid");
/// assert!(overnight.contains(at(23)));
/// assert!(overnight.contains(at(6)));
/// assert!(!overnight.contains(at(7)));
/// assert!(!overnight.contains(at(12)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    /// First quiet minute (inclusive).
    #[serde(with = "time_of_day")]
    pub start: NaiveTime,
    /// End of the window (exclusive).
    #[serde(with = "time_of_day")]
    pub end: NaiveTime,
}

impl QuietHours {
    /// Build a window from already parsed bounds.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parse a window from the `HH:MM` strings users enter in settings.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeOfDayParseError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Whether `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

impl fmt::Display for QuietHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Per-user channel and ritual toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct NotificationPreferences {
    /// Push notifications opted in.
    pub push_enabled: bool,
    /// Email opted in.
    pub email_enabled: bool,
    /// SMS opted in.
    pub sms_enabled: bool,
    /// Morning planning ritual reminders.
    pub morning_planning: bool,
    /// Evening reflection ritual reminders.
    pub evening_reflection: bool,
    /// Weekly review reminders.
    pub weekly_review: bool,
    /// Master switch for re-engagement outreach.
    pub reengagement_enabled: bool,
    /// Scheduled morning planning reminder time.
    #[serde(with = "time_of_day")]
    pub morning_planning_time: NaiveTime,
    /// Scheduled evening reflection reminder time.
    #[serde(with = "time_of_day")]
    pub evening_reflection_time: NaiveTime,
    /// Optional quiet-hours window.
    pub quiet_hours: Option<QuietHours>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push_enabled: true,
            email_enabled: true,
            sms_enabled: false,
            morning_planning: true,
            evening_reflection: true,
            weekly_review: true,
            reengagement_enabled: true,
            morning_planning_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            evening_reflection_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            quiet_hours: None,
        }
    }
}

impl NotificationPreferences {
    /// Create a builder seeded with the canonical defaults.
    pub fn builder() -> NotificationPreferencesBuilder {
        NotificationPreferencesBuilder::default()
    }

    /// Whether `time` falls inside the configured quiet hours.
    pub fn in_quiet_hours(&self, time: NaiveTime) -> bool {
        self.quiet_hours
            .is_some_and(|window| window.contains(time))
    }
}

/// Builder for constructing [`NotificationPreferences`] incrementally.
#[derive(Debug, Clone, Default)]
pub struct NotificationPreferencesBuilder {
    preferences: NotificationPreferences,
}

impl NotificationPreferencesBuilder {
    /// Toggle push delivery.
    pub fn push(mut self, enabled: bool) -> Self {
        self.preferences.push_enabled = enabled;
        self
    }

    /// Toggle email delivery.
    pub fn email(mut self, enabled: bool) -> Self {
        self.preferences.email_enabled = enabled;
        self
    }

    /// Toggle SMS delivery.
    pub fn sms(mut self, enabled: bool) -> Self {
        self.preferences.sms_enabled = enabled;
        self
    }

    /// Toggle morning planning reminders.
    pub fn morning_planning(mut self, enabled: bool) -> Self {
        self.preferences.morning_planning = enabled;
        self
    }

    /// Toggle evening reflection reminders.
    pub fn evening_reflection(mut self, enabled: bool) -> Self {
        self.preferences.evening_reflection = enabled;
        self
    }

    /// Toggle re-engagement outreach as a whole.
    pub fn reengagement(mut self, enabled: bool) -> Self {
        self.preferences.reengagement_enabled = enabled;
        self
    }

    /// Set the quiet-hours window.
    pub fn quiet_hours(mut self, window: QuietHours) -> Self {
        self.preferences.quiet_hours = Some(window);
        self
    }

    /// Build the final [`NotificationPreferences`].
    pub fn build(self) -> NotificationPreferences {
        self.preferences
    }
}
