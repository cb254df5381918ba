//! Family context used to resolve local wall-clock time.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable family identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyId(Uuid);

impl FamilyId {
    /// Wrap an existing UUID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`FamilyId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A household the user plans with.
///
/// `timezone` is kept as the raw IANA name the family configured. It is only
/// interpreted by [`crate::domain::LocalMoment::resolve`], which fails closed
/// on names the timezone database does not know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    /// Stable family identifier.
    pub id: FamilyId,
    /// Family name shown in the app.
    pub name: String,
    /// IANA timezone name, for example `America/Los_Angeles`.
    pub timezone: String,
}

impl Family {
    /// Build a family with a random identifier.
    pub fn new(name: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            id: FamilyId::random(),
            name: name.into(),
            timezone: timezone.into(),
        }
    }
}
