//! Resolution of the current instant into a family's wall-clock time.
//!
//! Every deadline check goes through [`LocalMoment::resolve`] so daylight
//! saving transitions follow the IANA timezone database. Unknown timezone
//! names are reported as errors; callers treat them as "not yet due".

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use super::Family;

/// Errors raised while resolving a local moment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimezoneError {
    /// The timezone name is not in the IANA database.
    #[error("unknown timezone: {name:?}")]
    Unknown {
        /// The rejected timezone name.
        name: String,
    },
}

/// An instant expressed in one family's local calendar and clock.
#[derive(Debug, Clone)]
pub struct LocalMoment {
    timezone: Tz,
    local: DateTime<Tz>,
}

impl LocalMoment {
    /// Convert `now` into wall-clock time for the named timezone.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{NaiveTime, TimeZone, Utc};
    /// use outreach::domain::LocalMoment;
    ///
    /// let now = Utc.with_ymd_and_hms(2026, 7, 1, 13, 0, 0).single().expect("valid");
    /// let pacific = LocalMoment::resolve("America/Los_Angeles", now).expect("known zone");
    /// assert_eq!(pacific.time(), NaiveTime::from_hms_opt(6, 0, 0).expect("valid"));
    /// assert!(LocalMoment::resolve("Mars/Olympus_Mons", now).is_err());
    /// ```
    pub fn resolve(timezone: &str, now: DateTime<Utc>) -> Result<Self, TimezoneError> {
        let tz: Tz = timezone
            .trim()
            .parse()
            .map_err(|_| TimezoneError::Unknown {
                name: timezone.to_owned(),
            })?;
        Ok(Self {
            timezone: tz,
            local: now.with_timezone(&tz),
        })
    }

    /// Resolve `now` for a family.
    pub fn for_family(family: &Family, now: DateTime<Utc>) -> Result<Self, TimezoneError> {
        Self::resolve(&family.timezone, now)
    }

    /// Resolve `now` in UTC; used when no family context exists.
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self {
            timezone: Tz::UTC,
            local: now.with_timezone(&Tz::UTC),
        }
    }

    /// Resolve for an optional family, defaulting to UTC.
    pub fn for_optional_family(
        family: Option<&Family>,
        now: DateTime<Utc>,
    ) -> Result<Self, TimezoneError> {
        match family {
            Some(family) => Self::for_family(family, now),
            None => Ok(Self::utc(now)),
        }
    }

    /// Local calendar date.
    pub fn date(&self) -> NaiveDate {
        self.local.date_naive()
    }

    /// Local time of day.
    pub fn time(&self) -> NaiveTime {
        self.local.time()
    }

    /// The resolved timezone.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Whether the local time has reached `deadline`.
    pub fn is_past(&self, deadline: NaiveTime) -> bool {
        self.time() >= deadline
    }

    /// Whether the local clock has reached the top of `hour`.
    pub fn hour_reached(&self, hour: u32) -> bool {
        self.local.hour() >= hour
    }
}
