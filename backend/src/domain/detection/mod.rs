//! Re-engagement candidate detection.
//!
//! Three detectors scan the user directory: missed morning check-ins, missed
//! evening reflections, and prolonged inactivity. Ritual deadlines are
//! evaluated in each family's local time, so the same instant can make a user
//! due in one family and not yet due in another. Per-user data problems
//! (unknown timezone, failing plan lookup) skip that user and are logged;
//! only a failing user directory aborts a run.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, warn};

use crate::domain::ports::{DailyPlanRepository, UserDirectory, UserDirectoryError};
use crate::domain::{
    DailyPlanSnapshot, Error, Family, LocalMoment, OutreachCandidate, OutreachUser, ReasonCode,
};

mod thresholds;

pub use thresholds::InactivityThresholds;

/// Local hour by which the day's plan should be started.
pub const CHECKIN_DEADLINE_HOUR: u32 = 12;
/// Local hour by which the evening reflection should be written.
pub const REFLECTION_DEADLINE_HOUR: u32 = 22;

/// Port bundle required by [`ReengagementDetectionService`].
pub struct ReengagementDetectionPorts {
    /// Source of users, preferences, and family memberships.
    pub users: Arc<dyn UserDirectory>,
    /// Daily plan lookups.
    pub plans: Arc<dyn DailyPlanRepository>,
}

impl ReengagementDetectionPorts {
    /// Build a strongly-typed detection port bundle.
    pub fn new(users: Arc<dyn UserDirectory>, plans: Arc<dyn DailyPlanRepository>) -> Self {
        Self { users, plans }
    }
}

/// Finds users who should receive re-engagement outreach.
pub struct ReengagementDetectionService {
    users: Arc<dyn UserDirectory>,
    plans: Arc<dyn DailyPlanRepository>,
    clock: Arc<dyn Clock>,
    thresholds: InactivityThresholds,
}

impl ReengagementDetectionService {
    /// Build a detection service.
    pub fn new(
        ports: ReengagementDetectionPorts,
        clock: Arc<dyn Clock>,
        thresholds: InactivityThresholds,
    ) -> Self {
        Self {
            users: ports.users,
            plans: ports.plans,
            clock,
            thresholds,
        }
    }

    /// Thresholds used by [`Self::detect_users_for_outreach`].
    pub fn thresholds(&self) -> &InactivityThresholds {
        &self.thresholds
    }

    /// Users whose family-local day passed noon without a started plan.
    pub async fn detect_missed_checkins(&self) -> Result<Vec<OutreachCandidate>, Error> {
        let now = self.clock.utc();
        let mut candidates = Vec::new();
        for user in self.list_users().await? {
            let preferences = user.preferences();
            if !(preferences.morning_planning && preferences.reengagement_enabled) {
                continue;
            }
            for family in &user.families {
                let Some(moment) = resolve_family_moment(&user, family, now) else {
                    continue;
                };
                if !moment.hour_reached(CHECKIN_DEADLINE_HOUR)
                    || preferences.in_quiet_hours(moment.time())
                {
                    continue;
                }
                let Some(plan) = self.find_plan(&user, family, &moment).await else {
                    continue;
                };
                if plan.as_ref().is_some_and(DailyPlanSnapshot::is_started) {
                    continue;
                }
                candidates.push(OutreachCandidate::new(
                    user.clone(),
                    ReasonCode::MissedCheckin,
                    Some(family.clone()),
                ));
            }
        }
        debug!(count = candidates.len(), "detected missed check-ins");
        Ok(candidates)
    }

    /// Users with a plan for their family-local day but no reflection by 22:00.
    pub async fn detect_missed_reflections(&self) -> Result<Vec<OutreachCandidate>, Error> {
        let now = self.clock.utc();
        let mut candidates = Vec::new();
        for user in self.list_users().await? {
            let preferences = user.preferences();
            if !(preferences.evening_reflection && preferences.reengagement_enabled) {
                continue;
            }
            for family in &user.families {
                let Some(moment) = resolve_family_moment(&user, family, now) else {
                    continue;
                };
                if !moment.hour_reached(REFLECTION_DEADLINE_HOUR)
                    || preferences.in_quiet_hours(moment.time())
                {
                    continue;
                }
                let Some(Some(plan)) = self.find_plan(&user, family, &moment).await else {
                    continue;
                };
                if plan.reflection_complete() {
                    continue;
                }
                candidates.push(OutreachCandidate::new(
                    user.clone(),
                    ReasonCode::MissedReflection,
                    Some(family.clone()),
                ));
            }
        }
        debug!(count = candidates.len(), "detected missed reflections");
        Ok(candidates)
    }

    /// Users inactive for at least one of `thresholds` whole days.
    ///
    /// Only the largest satisfied threshold is reported per user. Users who
    /// were never active are not candidates.
    pub async fn detect_inactive_users(
        &self,
        thresholds: &InactivityThresholds,
    ) -> Result<Vec<OutreachCandidate>, Error> {
        let now = self.clock.utc();
        let candidates = self
            .list_users()
            .await?
            .into_iter()
            .filter(|user| user.preferences().reengagement_enabled)
            .filter_map(|user| {
                let days = inactive_days(&user, now)?;
                let threshold = thresholds.select(days)?;
                let family = user.primary_family().cloned();
                Some(OutreachCandidate::new(
                    user,
                    ReasonCode::Inactive { days: threshold },
                    family,
                ))
            })
            .collect::<Vec<_>>();
        debug!(count = candidates.len(), "detected inactive users");
        Ok(candidates)
    }

    /// All candidates from every detector, most urgent first.
    ///
    /// The sort is stable and a user may appear once per reason.
    pub async fn detect_users_for_outreach(&self) -> Result<Vec<OutreachCandidate>, Error> {
        let mut candidates = self.detect_missed_checkins().await?;
        candidates.extend(self.detect_missed_reflections().await?);
        candidates.extend(self.detect_inactive_users(&self.thresholds).await?);
        sort_by_priority(&mut candidates);
        Ok(candidates)
    }

    async fn list_users(&self) -> Result<Vec<OutreachUser>, Error> {
        self.users.list_users().await.map_err(map_directory_error)
    }

    async fn find_plan(
        &self,
        user: &OutreachUser,
        family: &Family,
        moment: &LocalMoment,
    ) -> Option<Option<DailyPlanSnapshot>> {
        self.plans
            .find_plan(&user.id, &family.id, moment.date())
            .await
            .inspect_err(|error| {
                warn!(
                    user_id = %user.id,
                    family_id = %family.id,
                    %error,
                    "daily plan lookup failed; skipping family"
                );
            })
            .ok()
    }
}

/// Stable sort, most urgent first.
///
/// Candidates are ordered by ascending priority. Inactivity tiers that share a
/// priority put the larger threshold first, so `[7, 10]` dispatches the
/// 10-day tier before the 7-day tier.
pub fn sort_by_priority(candidates: &mut [OutreachCandidate]) {
    candidates.sort_by_key(|candidate| {
        (
            candidate.priority,
            Reverse(candidate.reason.inactive_days().unwrap_or(0)),
        )
    });
}

fn resolve_family_moment(
    user: &OutreachUser,
    family: &Family,
    now: DateTime<Utc>,
) -> Option<LocalMoment> {
    LocalMoment::for_family(family, now)
        .inspect_err(|error| {
            warn!(
                user_id = %user.id,
                family_id = %family.id,
                %error,
                "unresolvable family timezone; treating as not yet due"
            );
        })
        .ok()
}

fn inactive_days(user: &OutreachUser, now: DateTime<Utc>) -> Option<u32> {
    let last_active_at = user.last_active_at?;
    u32::try_from((now - last_active_at).num_days()).ok()
}

fn map_directory_error(error: UserDirectoryError) -> Error {
    match error {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory query failed: {message}"))
        }
    }
}
