//! User read model consumed by the re-engagement core.
//!
//! The user store owns these records; the core only reads them. Identifiers
//! and display names are validated newtypes, while the aggregate itself is a
//! plain snapshot of everything detection and dispatch need to know.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Family, NotificationPreferences};

/// Device tokens unused for longer than this many days are considered stale.
pub const STALE_DEVICE_TOKEN_DAYS: i64 = 60;

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

/// Validation errors returned by user identifier and name constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The display name was blank.
    #[error("display name must not be empty")]
    EmptyDisplayName,
    /// The display name exceeded [`DISPLAY_NAME_MAX`] characters.
    #[error("display name must be at most {max} characters")]
    DisplayNameTooLong {
        /// Maximum permitted length.
        max: usize,
    },
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable name used to personalise outreach copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`], trimming surrounding space.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Mobile platform a push token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePlatform {
    /// Apple Push Notification service.
    Ios,
    /// Firebase Cloud Messaging.
    Android,
}

/// A registered push notification token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
    /// Provider-issued token.
    pub token: String,
    /// Platform the token belongs to.
    pub platform: DevicePlatform,
    /// Whether the token is still registered.
    pub active: bool,
    /// Last time the token was confirmed by the device.
    pub last_used_at: DateTime<Utc>,
}

impl DeviceToken {
    /// Whether the token is active and was used within
    /// [`STALE_DEVICE_TOKEN_DAYS`] of `now`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.active && now - self.last_used_at <= TimeDelta::days(STALE_DEVICE_TOKEN_DAYS)
    }
}

/// Everything the re-engagement core reads about one user.
///
/// `preferences` is `None` when the user never saved notification settings;
/// use [`OutreachUser::preferences`] to read the effective values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutreachUser {
    /// Stable user identifier.
    pub id: UserId,
    /// Name interpolated into message bodies.
    pub display_name: DisplayName,
    /// Last recorded activity; `None` for users who never became active.
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    /// Phone number as entered by the user.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Whether the phone number passed verification.
    #[serde(default)]
    pub phone_verified: bool,
    /// Stored notification preferences, if any.
    #[serde(default)]
    pub notification_preferences: Option<NotificationPreferences>,
    /// Families the user belongs to.
    #[serde(default)]
    pub families: Vec<Family>,
    /// Registered push tokens.
    #[serde(default)]
    pub device_tokens: Vec<DeviceToken>,
}

impl OutreachUser {
    /// Start building a user with no activity, phone, tokens, or families.
    pub fn builder(id: UserId, display_name: DisplayName) -> OutreachUserBuilder {
        OutreachUserBuilder::new(id, display_name)
    }

    /// Effective preferences, falling back to the canonical defaults.
    pub fn preferences(&self) -> NotificationPreferences {
        self.notification_preferences.clone().unwrap_or_default()
    }

    /// Whether at least one device token can receive pushes at `now`.
    pub fn has_usable_device_token(&self, now: DateTime<Utc>) -> bool {
        self.device_tokens.iter().any(|token| token.is_usable(now))
    }

    /// Verified phone number, if one is on file.
    pub fn verified_phone(&self) -> Option<&str> {
        if !self.phone_verified {
            return None;
        }
        self.phone_number
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }

    /// Family used as context for reasons not tied to a membership.
    pub fn primary_family(&self) -> Option<&Family> {
        self.families.first()
    }
}

/// Builder for constructing [`OutreachUser`] incrementally.
#[derive(Debug, Clone)]
pub struct OutreachUserBuilder {
    user: OutreachUser,
}

impl OutreachUserBuilder {
    /// Create a new builder for the given identity.
    pub fn new(id: UserId, display_name: DisplayName) -> Self {
        Self {
            user: OutreachUser {
                id,
                display_name,
                last_active_at: None,
                phone_number: None,
                phone_verified: false,
                notification_preferences: None,
                families: Vec::new(),
                device_tokens: Vec::new(),
            },
        }
    }

    /// Set the last activity timestamp.
    pub fn last_active_at(mut self, at: DateTime<Utc>) -> Self {
        self.user.last_active_at = Some(at);
        self
    }

    /// Set the phone number and its verification state.
    pub fn phone(mut self, number: impl Into<String>, verified: bool) -> Self {
        self.user.phone_number = Some(number.into());
        self.user.phone_verified = verified;
        self
    }

    /// Store explicit notification preferences.
    pub fn preferences(mut self, preferences: NotificationPreferences) -> Self {
        self.user.notification_preferences = Some(preferences);
        self
    }

    /// Add a family membership.
    pub fn family(mut self, family: Family) -> Self {
        self.user.families.push(family);
        self
    }

    /// Register a push token.
    pub fn device_token(mut self, token: DeviceToken) -> Self {
        self.user.device_tokens.push(token);
        self
    }

    /// Build the final [`OutreachUser`].
    pub fn build(self) -> OutreachUser {
        self.user
    }
}

#[cfg(test)]
mod tests;
