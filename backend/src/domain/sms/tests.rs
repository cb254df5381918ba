//! Unit tests for the quota-enforcing SMS sender.

use std::sync::Arc;

use chrono::TimeDelta;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockSmsGateway, SmsGatewayError};
use crate::test_support::clock::{MutableClock, utc};
use crate::test_support::senders::ScriptedSmsGateway;

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(utc(2026, 6, 1, 9, 0)))
}

#[rstest]
#[case("+15551234567", true)]
#[case("+4915112345678", true)]
#[case("15551234567", false)]
#[case("+1", false)]
#[case("+1 555 123 4567", false)]
#[case("+1234567890123456", false)]
fn e164_validation(#[case] phone: &str, #[case] valid: bool) {
    assert_eq!(is_e164(phone), valid);
}

#[rstest]
#[tokio::test]
async fn invalid_numbers_never_reach_the_gateway(clock: Arc<MutableClock>) {
    let mut gateway = MockSmsGateway::new();
    gateway.expect_deliver().never();
    let sender = QuotaEnforcingSmsSender::new(Arc::new(gateway), clock, 5);

    let err = sender
        .send(&UserId::random(), "555-0100", "hello")
        .await
        .expect_err("invalid number");

    assert_eq!(err, SmsError::invalid_phone_number("555-0100"));
}

#[rstest]
#[tokio::test]
async fn quota_caps_sends_per_user_per_day(clock: Arc<MutableClock>) {
    let gateway = Arc::new(ScriptedSmsGateway::accepting());
    let sender = QuotaEnforcingSmsSender::new(gateway.clone(), clock.clone(), 2);
    let user = UserId::random();

    for _ in 0..2 {
        sender
            .send(&user, "+15551234567", "hello")
            .await
            .expect("within quota");
    }
    let err = sender
        .send(&user, "+15551234567", "hello")
        .await
        .expect_err("quota exhausted");
    assert_eq!(err, SmsError::daily_quota_exceeded(2_u32));
    assert!(err.to_string().contains("quota"));

    clock.advance(TimeDelta::days(1));
    sender
        .send(&user, "+15551234567", "hello")
        .await
        .expect("quota resets next day");
    assert_eq!(gateway.deliveries().len(), 3);
}

#[rstest]
#[tokio::test]
async fn gateway_failures_do_not_consume_quota(clock: Arc<MutableClock>) {
    let mut gateway = MockSmsGateway::new();
    let mut sequence = mockall::Sequence::new();
    gateway
        .expect_deliver()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Err(SmsGatewayError::provider("carrier down")));
    gateway
        .expect_deliver()
        .times(1)
        .in_sequence(&mut sequence)
        .returning(|_, _| Ok("SM42".to_owned()));
    let sender = QuotaEnforcingSmsSender::new(Arc::new(gateway), clock, 1);
    let user = UserId::random();

    let err = sender
        .send(&user, "+15551234567", "hello")
        .await
        .expect_err("gateway failure");
    assert!(matches!(err, SmsError::Gateway { .. }));

    let receipt = sender
        .send(&user, "+15551234567", "hello")
        .await
        .expect("slot still available");
    assert_eq!(receipt.message_sid, "SM42");
}
