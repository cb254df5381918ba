//! Channel eligibility.

use chrono::{DateTime, Utc};

use crate::domain::{Channel, NotificationPreferences, OutreachUser, ReasonCode};

/// Channels to attempt for `reason`, in fallback order.
///
/// Push needs opt-in and a usable device token. Email needs opt-in. SMS needs
/// a high-priority reason, opt-in, and a verified phone number.
pub fn eligible_channels(
    user: &OutreachUser,
    preferences: &NotificationPreferences,
    reason: ReasonCode,
    now: DateTime<Utc>,
) -> Vec<Channel> {
    let mut channels = Vec::with_capacity(3);
    if preferences.push_enabled && user.has_usable_device_token(now) {
        channels.push(Channel::Push);
    }
    if preferences.email_enabled {
        channels.push(Channel::Email);
    }
    if reason.is_high_priority() && preferences.sms_enabled && user.verified_phone().is_some() {
        channels.push(Channel::Sms);
    }
    channels
}
