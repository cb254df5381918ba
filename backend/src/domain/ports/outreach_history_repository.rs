//! Port for the append-only outreach history ledger.
//!
//! The ledger is the deduplication gate for dispatch: at most one entry
//! exists per user, reason, and local day. Adapters must enforce that
//! uniqueness at the storage layer and report conflicts as
//! [`OutreachHistoryRepositoryError::DuplicateEntry`] so concurrent job runs
//! resolve to a single delivery.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{OutreachHistoryEntry, ReasonCode, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by outreach history adapters.
    pub enum OutreachHistoryRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String
        } => "outreach history connection failed: {message}",
        /// Query or insert failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String
        } => "outreach history query failed: {message}",
        /// An entry for the same user, reason, and day already exists.
        DuplicateEntry {
            /// Adapter-supplied detail.
            message: String
        } => "outreach history entry already exists: {message}",
    }
}

/// Insert-only storage for delivered outreach.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutreachHistoryRepository: Send + Sync {
    /// Whether an entry exists for `(user_id, reason, day)`.
    async fn exists(
        &self,
        user_id: &UserId,
        reason: ReasonCode,
        day: NaiveDate,
    ) -> Result<bool, OutreachHistoryRepositoryError>;

    /// Append an entry, failing with `DuplicateEntry` when the key is taken.
    async fn record(
        &self,
        entry: &OutreachHistoryEntry,
    ) -> Result<(), OutreachHistoryRepositoryError>;
}

/// Fixture implementation with an always-empty ledger that discards writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOutreachHistoryRepository;

#[async_trait]
impl OutreachHistoryRepository for FixtureOutreachHistoryRepository {
    async fn exists(
        &self,
        _user_id: &UserId,
        _reason: ReasonCode,
        _day: NaiveDate,
    ) -> Result<bool, OutreachHistoryRepositoryError> {
        Ok(false)
    }

    async fn record(
        &self,
        _entry: &OutreachHistoryEntry,
    ) -> Result<(), OutreachHistoryRepositoryError> {
        Ok(())
    }
}
