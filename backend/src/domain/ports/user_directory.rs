//! Port for reading the users the re-engagement core evaluates.

use async_trait::async_trait;

use crate::domain::OutreachUser;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection {
            /// Adapter-supplied detail.
            message: String
        } => "user directory connection failed: {message}",
        /// Listing users failed during execution.
        Query {
            /// Adapter-supplied detail.
            message: String
        } => "user directory query failed: {message}",
    }
}

/// Read-only access to users, their preferences, families, and devices.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// List every user eligible for evaluation.
    async fn list_users(&self) -> Result<Vec<OutreachUser>, UserDirectoryError>;
}

/// Fixture implementation that knows no users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn list_users(&self) -> Result<Vec<OutreachUser>, UserDirectoryError> {
        Ok(Vec::new())
    }
}
