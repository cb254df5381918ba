//! Domain primitives, services, and jobs.
//!
//! Purpose: define the re-engagement vocabulary (users, families,
//! preferences, reasons, templates, ledger entries) and the services that act
//! on it. Services depend only on the traits in [`ports`]; adapters live in
//! `crate::outbound`.
//!
//! Public surface:
//! - [`ReengagementDetectionService`]: finds outreach candidates.
//! - [`OutreachService`]: selects a channel, delivers, and records history.
//! - [`OutreachJobRunner`]: runs a detector and dispatches its candidates.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failure payload.

pub mod candidate;
pub mod daily_plan;
pub mod detection;
pub mod dispatch;
pub mod error;
pub mod family;
pub mod history;
pub mod jobs;
pub mod local_time;
pub mod ports;
pub mod preferences;
pub mod reason;
pub mod sms;
pub mod template;
pub mod user;

pub use self::candidate::OutreachCandidate;
pub use self::daily_plan::{DailyPlanSnapshot, ReflectionSnapshot};
pub use self::detection::{
    CHECKIN_DEADLINE_HOUR, InactivityThresholds, REFLECTION_DEADLINE_HOUR,
    ReengagementDetectionPorts, ReengagementDetectionService,
};
pub use self::dispatch::{
    BatchSummary, DispatchDetail, DispatchOutcome, FailureReason, OutreachOutcome, OutreachService,
    OutreachServicePorts, SkipReason,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::family::{Family, FamilyId};
pub use self::history::{Channel, OutreachHistoryEntry};
pub use self::jobs::{JobReport, OutreachJobKind, OutreachJobPorts, OutreachJobRunner};
pub use self::local_time::{LocalMoment, TimezoneError};
pub use self::preferences::{
    NotificationPreferences, NotificationPreferencesBuilder, QuietHours, TimeOfDayParseError,
    parse_time_of_day,
};
pub use self::reason::{
    BUILT_IN_INACTIVITY_TIERS, MISSED_CHECKIN_PRIORITY, MISSED_REFLECTION_PRIORITY,
    ParseReasonCodeError, ReasonCode, SMS_MIN_INACTIVE_DAYS,
};
pub use self::template::MessageTemplate;
pub use self::user::{
    DISPLAY_NAME_MAX, DevicePlatform, DeviceToken, DisplayName, OutreachUser,
    OutreachUserBuilder, STALE_DEVICE_TOKEN_DAYS, UserId, UserValidationError,
};
