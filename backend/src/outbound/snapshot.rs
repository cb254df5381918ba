//! JSON snapshot of the data the re-engagement core reads.
//!
//! A snapshot holds users, daily plans, and prior ledger entries. The
//! `outreach-run` binary loads one to run a job without live stores.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ports::DailyPlanRepositoryError;
use crate::domain::{DailyPlanSnapshot, FamilyId, OutreachHistoryEntry, OutreachUser, UserId};

use super::memory::{InMemoryDailyPlans, InMemoryOutreachHistory, InMemoryUserDirectory};

/// Errors returned while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Snapshot file could not be read.
    #[error("failed to read snapshot at {path}: {source}")]
    Read {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Snapshot JSON did not match the expected shape.
    #[error("failed to parse snapshot at {path}: {source}")]
    Parse {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// Seeding the in-memory stores failed.
    #[error("failed to seed daily plans: {0}")]
    Seed(#[from] DailyPlanRepositoryError),
}

/// One daily plan row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRecord {
    /// Plan owner.
    pub user_id: UserId,
    /// Family the plan belongs to.
    pub family_id: FamilyId,
    /// Local calendar date of the plan.
    pub date: NaiveDate,
    /// Plan contents.
    #[serde(flatten)]
    pub plan: DailyPlanSnapshot,
}

/// Serialized state consumed by the in-memory adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachSnapshot {
    /// Users to evaluate.
    #[serde(default)]
    pub users: Vec<OutreachUser>,
    /// Daily plans.
    #[serde(default)]
    pub plans: Vec<PlanRecord>,
    /// Prior ledger entries.
    #[serde(default)]
    pub history: Vec<OutreachHistoryEntry>,
}

impl OutreachSnapshot {
    /// Parse a snapshot from JSON text.
    ///
    /// # Examples
    ///
    /// ```
    /// use outreach::outbound::OutreachSnapshot;
    ///
    /// let snapshot = OutreachSnapshot::from_json(r#"{"users": []}"#).expect("valid snapshot");
    /// assert!(snapshot.plans.is_empty());
    /// ```
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// Build the in-memory adapters seeded with this snapshot.
    pub fn into_adapters(
        self,
    ) -> Result<
        (
            InMemoryUserDirectory,
            InMemoryDailyPlans,
            InMemoryOutreachHistory,
        ),
        SnapshotError,
    > {
        let plans = InMemoryDailyPlans::default();
        for record in self.plans {
            plans.insert(record.user_id, record.family_id, record.date, record.plan)?;
        }
        Ok((
            InMemoryUserDirectory::new(self.users),
            plans,
            InMemoryOutreachHistory::new(self.history),
        ))
    }
}

/// Read and parse the snapshot at `path` through `cap_std`.
pub fn load_snapshot(path: &Path) -> Result<OutreachSnapshot, SnapshotError> {
    let read_error = |source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "snapshot path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let contents = dir
        .read_to_string(Path::new(file_name))
        .map_err(read_error)?;
    OutreachSnapshot::from_json(&contents).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
