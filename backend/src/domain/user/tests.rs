//! Tests for the user read model.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0)
        .single()
        .expect("valid time")
}

#[fixture]
fn user() -> OutreachUser {
    OutreachUser::builder(
        UserId::new(VALID_ID).expect("valid id"),
        DisplayName::new("Ada").expect("valid name"),
    )
    .build()
}

fn token(active: bool, last_used_at: DateTime<Utc>) -> DeviceToken {
    DeviceToken {
        token: "tok".to_owned(),
        platform: DevicePlatform::Ios,
        active,
        last_used_at,
    }
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
fn user_id_rejects_invalid_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn display_name_is_trimmed() {
    let name = DisplayName::new("  Grace  ").expect("valid name");
    assert_eq!(name.as_ref(), "Grace");
}

#[rstest]
#[case("   ".to_owned(), UserValidationError::EmptyDisplayName)]
#[case(
    "a".repeat(DISPLAY_NAME_MAX + 1),
    UserValidationError::DisplayNameTooLong { max: DISPLAY_NAME_MAX }
)]
fn display_name_rejects_invalid_input(#[case] raw: String, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw), Err(expected));
}

#[rstest]
fn missing_preferences_resolve_to_defaults(user: OutreachUser) {
    assert!(user.notification_preferences.is_none());
    assert_eq!(user.preferences(), NotificationPreferences::default());
}

#[rstest]
fn stale_and_inactive_tokens_are_not_usable(now: DateTime<Utc>, user: OutreachUser) {
    let stale = token(true, now - TimeDelta::days(STALE_DEVICE_TOKEN_DAYS + 1));
    let revoked = token(false, now);
    let user = OutreachUser {
        device_tokens: vec![stale, revoked],
        ..user
    };
    assert!(!user.has_usable_device_token(now));
}

#[rstest]
fn recent_active_token_is_usable(now: DateTime<Utc>, user: OutreachUser) {
    let user = OutreachUser {
        device_tokens: vec![token(true, now - TimeDelta::days(3))],
        ..user
    };
    assert!(user.has_usable_device_token(now));
}

#[rstest]
#[case(Some("+15551234567"), true, Some("+15551234567"))]
#[case(Some("+15551234567"), false, None)]
#[case(Some("   "), true, None)]
#[case(None, true, None)]
fn verified_phone_requires_verification(
    user: OutreachUser,
    #[case] number: Option<&str>,
    #[case] verified: bool,
    #[case] expected: Option<&str>,
) {
    let user = OutreachUser {
        phone_number: number.map(str::to_owned),
        phone_verified: verified,
        ..user
    };
    assert_eq!(user.verified_phone(), expected);
}

#[rstest]
fn deserialises_sparse_snapshot_records() {
    let user: OutreachUser = serde_json::from_value(json!({
        "id": VALID_ID,
        "displayName": "Ada",
    }))
    .expect("deserialise user");

    assert!(user.last_active_at.is_none());
    assert!(user.families.is_empty());
    assert!(!user.phone_verified);
}
