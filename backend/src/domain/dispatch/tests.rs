//! Unit tests for outreach dispatch.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockOutreachHistoryRepository, OutreachHistoryRepositoryError};
use crate::domain::sms::QuotaEnforcingSmsSender;
use crate::domain::{ErrorCode, NotificationPreferences, QuietHours, UserId};
use crate::outbound::InMemoryOutreachHistory;
use crate::test_support::clock::{MutableClock, utc};
use crate::test_support::senders::{ScriptedEmailSender, ScriptedPushSender, ScriptedSmsGateway};
use crate::test_support::users::{usable_token, user_named};

struct Harness {
    service: OutreachService,
    history: Arc<InMemoryOutreachHistory>,
    push: Arc<ScriptedPushSender>,
    email: Arc<ScriptedEmailSender>,
    gateway: Arc<ScriptedSmsGateway>,
    clock: Arc<MutableClock>,
}

impl Harness {
    fn new(
        push: ScriptedPushSender,
        email: ScriptedEmailSender,
        gateway: ScriptedSmsGateway,
    ) -> Self {
        let clock = Arc::new(MutableClock::new(now()));
        let history = Arc::new(InMemoryOutreachHistory::default());
        let push = Arc::new(push);
        let email = Arc::new(email);
        let gateway = Arc::new(gateway);
        let sms = QuotaEnforcingSmsSender::new(gateway.clone(), clock.clone(), 5);
        let service = OutreachService::new(
            OutreachServicePorts::new(
                history.clone(),
                push.clone(),
                email.clone(),
                Arc::new(sms),
            ),
            clock.clone(),
        );
        Self {
            service,
            history,
            push,
            email,
            gateway,
            clock,
        }
    }

    fn ledger(&self) -> Vec<OutreachHistoryEntry> {
        self.history.entries().expect("ledger entries")
    }
}

fn now() -> DateTime<Utc> {
    utc(2026, 1, 15, 15, 0)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[fixture]
fn harness() -> Harness {
    Harness::new(
        ScriptedPushSender::delivering(1),
        ScriptedEmailSender::accepting(),
        ScriptedSmsGateway::accepting(),
    )
}

#[fixture]
fn family() -> Family {
    Family::new("Okafor", "UTC")
}

fn reachable_user(family: &Family) -> OutreachUser {
    user_named("Ada")
        .family(family.clone())
        .device_token(usable_token(now()))
        .phone("+15551234567", true)
        .preferences(NotificationPreferences::builder().sms(true).build())
        .build()
}

#[rstest]
#[tokio::test]
async fn push_is_preferred_and_recorded(harness: Harness, family: Family) {
    let user = reachable_user(&family);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome, OutreachOutcome::Sent { channel: Channel::Push });
    let ledger = harness.ledger();
    assert_eq!(ledger.len(), 1);
    let entry = ledger.first().expect("one entry");
    assert_eq!(entry.channel, Channel::Push);
    assert_eq!(entry.sent_on, date(2026, 1, 15));
    let messages = harness.push.messages();
    assert_eq!(
        messages.first().map(|message| message.link.clone()),
        Some(format!("familyhub://families/{}/planner", family.id))
    );
    assert!(harness.email.emails().is_empty());
}

#[rstest]
#[tokio::test]
async fn second_send_on_the_same_local_day_is_skipped(harness: Harness, family: Family) {
    let user = reachable_user(&family);
    harness
        .service
        .send_outreach(&user, ReasonCode::MissedReflection, Some(&family))
        .await
        .expect("first dispatch");
    harness.clock.advance(TimeDelta::hours(3));

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedReflection, Some(&family))
        .await
        .expect("second dispatch");

    assert_eq!(
        outcome,
        OutreachOutcome::Skipped {
            reason: SkipReason::AlreadySentToday
        }
    );
    assert_eq!(harness.ledger().len(), 1);
    assert_eq!(harness.push.messages().len(), 1);

    harness.clock.advance(TimeDelta::days(1));
    let next_day = harness
        .service
        .send_outreach(&user, ReasonCode::MissedReflection, Some(&family))
        .await
        .expect("next day dispatch");
    assert!(next_day.is_success());
    assert_eq!(harness.ledger().len(), 2);
}

#[rstest]
#[tokio::test]
async fn dedup_day_follows_the_family_timezone(harness: Harness) {
    let pacific = Family::new("Nguyen", "America/Los_Angeles");
    let user = reachable_user(&pacific);
    harness.clock.set(utc(2026, 1, 15, 3, 0));

    harness
        .service
        .send_outreach(&user, ReasonCode::MissedReflection, Some(&pacific))
        .await
        .expect("dispatch succeeds");

    let entry = harness.ledger().first().cloned().expect("one entry");
    assert_eq!(entry.sent_on, date(2026, 1, 14));
}

#[rstest]
#[tokio::test]
async fn push_reaching_no_device_falls_back_to_email(family: Family) {
    let harness = Harness::new(
        ScriptedPushSender::delivering(0),
        ScriptedEmailSender::accepting(),
        ScriptedSmsGateway::accepting(),
    );
    let user = reachable_user(&family);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome.channel(), Some(Channel::Email));
    let email = harness.email.emails().first().cloned().expect("one email");
    assert_eq!(email.family_id, Some(family.id));
    assert_eq!(email.recipient_name, "Ada");
}

#[rstest]
#[tokio::test]
async fn push_provider_errors_fall_back_to_email(family: Family) {
    let harness = Harness::new(
        ScriptedPushSender::failing("apns down"),
        ScriptedEmailSender::accepting(),
        ScriptedSmsGateway::accepting(),
    );
    let user = reachable_user(&family);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome, OutreachOutcome::Sent { channel: Channel::Email });
    assert_eq!(harness.push.messages().len(), 1);
    assert_eq!(harness.email.emails().len(), 1);
    let ledger = harness.ledger();
    assert_eq!(ledger.iter().map(|entry| entry.channel).collect::<Vec<_>>(), vec![Channel::Email]);
}

#[rstest]
#[tokio::test]
async fn high_priority_reasons_fall_through_to_sms(family: Family) {
    let harness = Harness::new(
        ScriptedPushSender::failing("apns down"),
        ScriptedEmailSender::rejecting(),
        ScriptedSmsGateway::accepting(),
    );
    let user = reachable_user(&family);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::Inactive { days: 14 }, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(outcome, OutreachOutcome::Sent { channel: Channel::Sms });
    let (phone, body) = harness
        .gateway
        .deliveries()
        .first()
        .cloned()
        .expect("one sms");
    assert_eq!(phone, "+15551234567");
    assert!(body.contains("Ada"));
}

#[rstest]
#[tokio::test]
async fn exhausted_channels_fail_without_recording(family: Family) {
    let harness = Harness::new(
        ScriptedPushSender::failing("fcm down"),
        ScriptedEmailSender::rejecting(),
        ScriptedSmsGateway::rejecting(),
    );
    let user = reachable_user(&family);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::Inactive { days: 30 }, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        outcome,
        OutreachOutcome::Failed {
            reason: FailureReason::DeliveryFailed
        }
    );
    assert!(harness.ledger().is_empty());
}

#[rstest]
#[case(
    NotificationPreferences::builder().push(false).email(false).build(),
    ReasonCode::Inactive { days: 30 }
)]
#[case(
    NotificationPreferences::builder().push(false).email(false).sms(true).build(),
    ReasonCode::MissedCheckin
)]
#[case(
    NotificationPreferences::builder().push(false).email(false).sms(true).build(),
    ReasonCode::Inactive { days: 3 }
)]
#[tokio::test]
async fn no_eligible_channel_is_reported(
    harness: Harness,
    family: Family,
    #[case] preferences: NotificationPreferences,
    #[case] reason: ReasonCode,
) {
    let user = OutreachUser {
        notification_preferences: Some(preferences),
        ..reachable_user(&family)
    };

    let outcome = harness
        .service
        .send_outreach(&user, reason, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        outcome,
        OutreachOutcome::Failed {
            reason: FailureReason::NoAvailableChannel
        }
    );
    assert!(harness.push.messages().is_empty());
    assert!(harness.gateway.deliveries().is_empty());
}

#[rstest]
#[tokio::test]
async fn quiet_hours_skip_before_any_channel(harness: Harness, family: Family) {
    let preferences = NotificationPreferences::builder()
        .quiet_hours(QuietHours::parse("14:00", "16:00").expect("valid window"))
        .build();
    let user = OutreachUser {
        notification_preferences: Some(preferences),
        ..reachable_user(&family)
    };

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        outcome,
        OutreachOutcome::Skipped {
            reason: SkipReason::QuietHours
        }
    );
    assert!(harness.push.messages().is_empty());
}

#[rstest]
#[tokio::test]
async fn unknown_family_timezone_is_skipped(harness: Harness) {
    let broken = Family::new("Broken", "Nowhere/Special");
    let user = reachable_user(&broken);

    let outcome = harness
        .service
        .send_outreach(&user, ReasonCode::MissedCheckin, Some(&broken))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        outcome,
        OutreachOutcome::Skipped {
            reason: SkipReason::InvalidTimezone
        }
    );
}

#[rstest]
#[tokio::test]
async fn missing_family_uses_utc_and_home_link(harness: Harness, family: Family) {
    let user = reachable_user(&family);

    harness
        .service
        .send_outreach(&user, ReasonCode::Inactive { days: 7 }, None)
        .await
        .expect("dispatch succeeds");

    let message = harness.push.messages().first().cloned().expect("one push");
    assert_eq!(message.link, "familyhub://home");
}

fn service_with_history(history: MockOutreachHistoryRepository) -> OutreachService {
    let clock = Arc::new(MutableClock::new(now()));
    OutreachService::new(
        OutreachServicePorts::new(
            Arc::new(history),
            Arc::new(ScriptedPushSender::delivering(1)),
            Arc::new(ScriptedEmailSender::accepting()),
            Arc::new(QuotaEnforcingSmsSender::new(
                Arc::new(ScriptedSmsGateway::accepting()),
                clock.clone(),
                5,
            )),
        ),
        clock,
    )
}

#[rstest]
#[tokio::test]
async fn losing_an_insert_race_counts_as_already_sent(family: Family) {
    let mut history = MockOutreachHistoryRepository::new();
    history.expect_exists().returning(|_, _, _| Ok(false));
    history
        .expect_record()
        .times(1)
        .returning(|_| Err(OutreachHistoryRepositoryError::duplicate_entry("race")));
    let service = service_with_history(history);

    let outcome = service
        .send_outreach(&reachable_user(&family), ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect("dispatch succeeds");

    assert_eq!(
        outcome,
        OutreachOutcome::Skipped {
            reason: SkipReason::AlreadySentToday
        }
    );
}

#[rstest]
#[tokio::test]
async fn ledger_outages_propagate(family: Family) {
    let mut history = MockOutreachHistoryRepository::new();
    history
        .expect_exists()
        .returning(|_, _, _| Err(OutreachHistoryRepositoryError::connection("refused")));
    history.expect_record().never();
    let service = service_with_history(history);

    let err = service
        .send_outreach(&reachable_user(&family), ReasonCode::MissedCheckin, Some(&family))
        .await
        .expect_err("ledger outage surfaces");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn batch_counts_errors_and_keeps_going(family: Family) {
    let failing = reachable_user(&family);
    let healthy = OutreachUser {
        id: UserId::random(),
        ..reachable_user(&family)
    };
    let failing_id = failing.id.clone();

    let mut history = MockOutreachHistoryRepository::new();
    history.expect_exists().returning(move |user_id, _, _| {
        if *user_id == failing_id {
            Err(OutreachHistoryRepositoryError::query("deadlock"))
        } else {
            Ok(false)
        }
    });
    history.expect_record().returning(|_| Ok(()));
    let service = service_with_history(history);

    let candidates = vec![
        OutreachCandidate::new(failing.clone(), ReasonCode::MissedCheckin, Some(family.clone())),
        OutreachCandidate::new(healthy.clone(), ReasonCode::MissedCheckin, Some(family)),
    ];
    let summary = service.send_to_candidates(&candidates).await;

    assert_eq!((summary.sent, summary.skipped, summary.failed), (1, 0, 1));
    let statuses = summary
        .details
        .iter()
        .map(|detail| (detail.user_id.clone(), matches!(detail.outcome, DispatchOutcome::Error { .. })))
        .collect::<Vec<_>>();
    assert_eq!(statuses, vec![(failing.id, true), (healthy.id, false)]);
}

#[rstest]
#[tokio::test]
async fn sms_quota_exhaustion_is_a_channel_failure(family: Family) {
    let clock = Arc::new(MutableClock::new(now()));
    let gateway = Arc::new(ScriptedSmsGateway::accepting());
    let service = OutreachService::new(
        OutreachServicePorts::new(
            Arc::new(InMemoryOutreachHistory::default()),
            Arc::new(ScriptedPushSender::failing("down")),
            Arc::new(ScriptedEmailSender::rejecting()),
            Arc::new(QuotaEnforcingSmsSender::new(gateway.clone(), clock.clone(), 1)),
        ),
        clock,
    );
    let user = reachable_user(&family);

    let first = service
        .send_outreach(&user, ReasonCode::Inactive { days: 7 }, Some(&family))
        .await
        .expect("first dispatch");
    let second = service
        .send_outreach(&user, ReasonCode::Inactive { days: 14 }, Some(&family))
        .await
        .expect("second dispatch");

    assert_eq!(first.channel(), Some(Channel::Sms));
    assert_eq!(
        second,
        OutreachOutcome::Failed {
            reason: FailureReason::DeliveryFailed
        }
    );
    assert_eq!(gateway.deliveries().len(), 1);
}
