//! Port for looking up a user's daily plan.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{DailyPlanSnapshot, FamilyId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by daily plan repository adapters.
    pub enum DailyPlanRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String
        } => "daily plan repository connection failed: {message}",
        /// Lookup failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String
        } => "daily plan repository query failed: {message}",
    }
}

/// Read access to daily plans keyed by user, family, and local date.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DailyPlanRepository: Send + Sync {
    /// Fetch the plan for `date` in the family's local calendar.
    ///
    /// Returns `None` when no plan row exists for that day.
    async fn find_plan(
        &self,
        user_id: &UserId,
        family_id: &FamilyId,
        date: NaiveDate,
    ) -> Result<Option<DailyPlanSnapshot>, DailyPlanRepositoryError>;
}

/// Fixture implementation that never finds a plan.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDailyPlanRepository;

#[async_trait]
impl DailyPlanRepository for FixtureDailyPlanRepository {
    async fn find_plan(
        &self,
        _user_id: &UserId,
        _family_id: &FamilyId,
        _date: NaiveDate,
    ) -> Result<Option<DailyPlanSnapshot>, DailyPlanRepositoryError> {
        Ok(None)
    }
}
