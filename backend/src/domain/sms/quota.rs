//! Per-user daily SMS quota.
//!
//! Counters are keyed by user and reset when the UTC day rolls over. A send
//! reserves a slot before calling the gateway and releases it when the
//! gateway fails, so only successful sends count against the limit.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::UserId;

/// Mutable quota state shared across sends.
#[derive(Debug, Clone)]
pub struct SmsQuotaState {
    limit: u32,
    quota_day: NaiveDate,
    used: HashMap<UserId, u32>,
}

impl SmsQuotaState {
    /// Build quota state rooted at the provided clock instant.
    pub fn new(now: DateTime<Utc>, limit: u32) -> Self {
        Self {
            limit,
            quota_day: now.date_naive(),
            used: HashMap::new(),
        }
    }

    /// Configured messages per user per day.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Reserve one message for `user_id`; `false` when the quota is spent.
    pub fn try_reserve(&mut self, user_id: &UserId, now: DateTime<Utc>) -> bool {
        self.roll_day(now);
        let used = self.used.entry(user_id.clone()).or_insert(0);
        if *used >= self.limit {
            return false;
        }
        *used += 1;
        true
    }

    /// Return a reservation after a failed send.
    pub fn release(&mut self, user_id: &UserId, now: DateTime<Utc>) {
        self.roll_day(now);
        if let Some(used) = self.used.get_mut(user_id) {
            *used = used.saturating_sub(1);
        }
    }

    /// Messages counted for `user_id` today.
    pub fn used(&mut self, user_id: &UserId, now: DateTime<Utc>) -> u32 {
        self.roll_day(now);
        self.used.get(user_id).copied().unwrap_or(0)
    }

    fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.quota_day {
            self.quota_day = today;
            self.used.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for quota accounting.

    use super::*;
    use crate::test_support::clock::utc;
    use rstest::rstest;

    #[rstest]
    fn reservations_stop_at_the_limit() {
        let now = utc(2026, 2, 1, 8, 0);
        let user = UserId::random();
        let mut state = SmsQuotaState::new(now, 2);

        assert!(state.try_reserve(&user, now));
        assert!(state.try_reserve(&user, now));
        assert!(!state.try_reserve(&user, now));
        assert!(state.try_reserve(&UserId::random(), now));
    }

    #[rstest]
    fn released_reservations_are_reusable() {
        let now = utc(2026, 2, 1, 8, 0);
        let user = UserId::random();
        let mut state = SmsQuotaState::new(now, 1);

        assert!(state.try_reserve(&user, now));
        state.release(&user, now);
        assert_eq!(state.used(&user, now), 0);
        assert!(state.try_reserve(&user, now));
    }

    #[rstest]
    fn counters_reset_on_the_next_utc_day() {
        let now = utc(2026, 2, 1, 23, 59);
        let user = UserId::random();
        let mut state = SmsQuotaState::new(now, 1);

        assert!(state.try_reserve(&user, now));
        assert!(!state.try_reserve(&user, now));
        assert!(state.try_reserve(&user, utc(2026, 2, 2, 0, 0)));
    }
}
