//! In-memory adapters for the user directory, daily plans, and ledger.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::ports::{
    DailyPlanRepository, DailyPlanRepositoryError, OutreachHistoryRepository,
    OutreachHistoryRepositoryError, UserDirectory, UserDirectoryError,
};
use crate::domain::{
    DailyPlanSnapshot, FamilyId, OutreachHistoryEntry, OutreachUser, ReasonCode, UserId,
};

/// User directory backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<OutreachUser>>,
}

impl InMemoryUserDirectory {
    /// Seed the directory.
    pub fn new(users: Vec<OutreachUser>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// Add or replace a user by id.
    pub fn upsert(&self, user: OutreachUser) -> Result<(), UserDirectoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| UserDirectoryError::connection("user directory lock poisoned"))?;
        match users.iter_mut().find(|existing| existing.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn list_users(&self) -> Result<Vec<OutreachUser>, UserDirectoryError> {
        self.users
            .read()
            .map(|users| users.clone())
            .map_err(|_| UserDirectoryError::connection("user directory lock poisoned"))
    }
}

type PlanKey = (UserId, FamilyId, NaiveDate);

/// Daily plans keyed by user, family, and local date.
#[derive(Debug, Default)]
pub struct InMemoryDailyPlans {
    plans: RwLock<HashMap<PlanKey, DailyPlanSnapshot>>,
}

impl InMemoryDailyPlans {
    /// Store `plan`, replacing any plan for the same key.
    pub fn insert(
        &self,
        user_id: UserId,
        family_id: FamilyId,
        date: NaiveDate,
        plan: DailyPlanSnapshot,
    ) -> Result<(), DailyPlanRepositoryError> {
        let mut plans = self
            .plans
            .write()
            .map_err(|_| DailyPlanRepositoryError::connection("plan store lock poisoned"))?;
        plans.insert((user_id, family_id, date), plan);
        Ok(())
    }
}

#[async_trait]
impl DailyPlanRepository for InMemoryDailyPlans {
    async fn find_plan(
        &self,
        user_id: &UserId,
        family_id: &FamilyId,
        date: NaiveDate,
    ) -> Result<Option<DailyPlanSnapshot>, DailyPlanRepositoryError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| DailyPlanRepositoryError::connection("plan store lock poisoned"))?;
        Ok(plans.get(&(user_id.clone(), *family_id, date)).cloned())
    }
}

/// Append-only ledger enforcing one entry per user, reason, and day.
#[derive(Debug, Default)]
pub struct InMemoryOutreachHistory {
    entries: Mutex<Vec<OutreachHistoryEntry>>,
}

impl InMemoryOutreachHistory {
    /// Seed the ledger with existing entries.
    pub fn new(entries: Vec<OutreachHistoryEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Snapshot of all entries in insertion order.
    pub fn entries(&self) -> Result<Vec<OutreachHistoryEntry>, OutreachHistoryRepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, Vec<OutreachHistoryEntry>>, OutreachHistoryRepositoryError> {
        self.entries
            .lock()
            .map_err(|_| OutreachHistoryRepositoryError::connection("ledger lock poisoned"))
    }
}

fn same_key(
    entry: &OutreachHistoryEntry,
    user_id: &UserId,
    reason: ReasonCode,
    day: NaiveDate,
) -> bool {
    entry.user_id == *user_id && entry.outreach_type == reason && entry.sent_on == day
}

#[async_trait]
impl OutreachHistoryRepository for InMemoryOutreachHistory {
    async fn exists(
        &self,
        user_id: &UserId,
        reason: ReasonCode,
        day: NaiveDate,
    ) -> Result<bool, OutreachHistoryRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .any(|entry| same_key(entry, user_id, reason, day)))
    }

    async fn record(
        &self,
        entry: &OutreachHistoryEntry,
    ) -> Result<(), OutreachHistoryRepositoryError> {
        let mut entries = self.lock()?;
        if entries
            .iter()
            .any(|existing| same_key(existing, &entry.user_id, entry.outreach_type, entry.sent_on))
        {
            return Err(OutreachHistoryRepositoryError::duplicate_entry(format!(
                "{}/{}/{}",
                entry.user_id, entry.outreach_type, entry.sent_on
            )));
        }
        entries.push(entry.clone());
        Ok(())
    }
}
