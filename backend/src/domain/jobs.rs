//! Scheduled re-engagement jobs.
//!
//! Each job runs one detector (or all of them), ranks the candidates, and
//! dispatches them in order. Jobs are safe to re-run on the same day: the
//! outreach ledger suppresses repeats.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::detection::sort_by_priority;
use crate::domain::ports::{
    DailyPlanRepository, EmailSender, OutreachHistoryRepository, PushSender, SmsGateway,
    UserDirectory,
};
use crate::domain::sms::QuotaEnforcingSmsSender;
use crate::domain::{
    BatchSummary, Error, OutreachService, OutreachServicePorts, ReengagementDetectionPorts,
    ReengagementDetectionService,
};
use crate::settings::OutreachConfig;

/// Which detector a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachJobKind {
    /// Missed morning check-ins.
    MissedCheckins,
    /// Missed evening reflections.
    MissedReflections,
    /// Inactive users at the configured thresholds.
    InactiveUsers,
    /// Every detector, merged and ranked.
    All,
}

impl OutreachJobKind {
    /// Stable name used on the command line and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissedCheckins => "missed_checkins",
            Self::MissedReflections => "missed_reflections",
            Self::InactiveUsers => "inactive_users",
            Self::All => "all",
        }
    }
}

impl fmt::Display for OutreachJobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown job name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown outreach job {input:?}; expected missed_checkins, missed_reflections, inactive_users, or all")]
pub struct ParseJobKindError {
    /// The rejected input.
    pub input: String,
}

impl FromStr for OutreachJobKind {
    type Err = ParseJobKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('-', "_").as_str() {
            "missed_checkins" => Ok(Self::MissedCheckins),
            "missed_reflections" => Ok(Self::MissedReflections),
            "inactive_users" => Ok(Self::InactiveUsers),
            "all" => Ok(Self::All),
            _ => Err(ParseJobKindError {
                input: s.to_owned(),
            }),
        }
    }
}

/// Result of one job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    /// Job that ran.
    pub kind: OutreachJobKind,
    /// Candidates detected.
    pub candidates: usize,
    /// Dispatch tally; `None` when outreach is disabled.
    pub summary: Option<BatchSummary>,
}

impl JobReport {
    /// Report for a job skipped because outreach is disabled.
    pub fn disabled(kind: OutreachJobKind) -> Self {
        Self {
            kind,
            candidates: 0,
            summary: None,
        }
    }
}

/// Port bundle required by [`OutreachJobRunner`].
pub struct OutreachJobPorts {
    /// Source of users.
    pub users: Arc<dyn UserDirectory>,
    /// Daily plan lookups.
    pub plans: Arc<dyn DailyPlanRepository>,
    /// Outreach ledger.
    pub history: Arc<dyn OutreachHistoryRepository>,
    /// Push channel.
    pub push: Arc<dyn PushSender>,
    /// Email channel.
    pub email: Arc<dyn EmailSender>,
    /// Raw SMS transport, wrapped with validation and quota.
    pub sms_gateway: Arc<dyn SmsGateway>,
}

/// Runs detection followed by dispatch.
pub struct OutreachJobRunner {
    detection: ReengagementDetectionService,
    dispatch: OutreachService,
    config: OutreachConfig,
}

impl OutreachJobRunner {
    /// Wire detection and dispatch from ports and configuration.
    pub fn new(ports: OutreachJobPorts, clock: Arc<dyn Clock>, config: OutreachConfig) -> Self {
        let sms = QuotaEnforcingSmsSender::new(
            ports.sms_gateway,
            Arc::clone(&clock),
            config.sms_daily_limit,
        );
        let detection = ReengagementDetectionService::new(
            ReengagementDetectionPorts::new(ports.users, ports.plans),
            Arc::clone(&clock),
            config.thresholds.clone(),
        );
        let dispatch = OutreachService::new(
            OutreachServicePorts::new(ports.history, ports.push, ports.email, Arc::new(sms)),
            clock,
        );
        Self {
            detection,
            dispatch,
            config,
        }
    }

    /// Run the job named by `kind`.
    pub async fn run(&self, kind: OutreachJobKind) -> Result<JobReport, Error> {
        if !self.config.enabled {
            info!(job = %kind, "outreach disabled; skipping job");
            return Ok(JobReport::disabled(kind));
        }

        let mut candidates = match kind {
            OutreachJobKind::MissedCheckins => self.detection.detect_missed_checkins().await?,
            OutreachJobKind::MissedReflections => {
                self.detection.detect_missed_reflections().await?
            }
            OutreachJobKind::InactiveUsers => {
                self.detection
                    .detect_inactive_users(&self.config.thresholds)
                    .await?
            }
            OutreachJobKind::All => self.detection.detect_users_for_outreach().await?,
        };
        sort_by_priority(&mut candidates);

        let summary = self.dispatch.send_to_candidates(&candidates).await;
        info!(
            job = %kind,
            candidates = candidates.len(),
            sent = summary.sent,
            skipped = summary.skipped,
            failed = summary.failed,
            "outreach job finished"
        );
        Ok(JobReport {
            kind,
            candidates: candidates.len(),
            summary: Some(summary),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for job wiring.

    use super::*;
    use crate::domain::ports::{MockUserDirectory, UserDirectoryError};
    use crate::domain::{Channel, DispatchOutcome, ErrorCode, Family, InactivityThresholds, ReasonCode};
    use crate::outbound::{InMemoryDailyPlans, InMemoryOutreachHistory, InMemoryUserDirectory};
    use crate::test_support::clock::{MutableClock, utc};
    use crate::test_support::senders::{
        ScriptedEmailSender, ScriptedPushSender, ScriptedSmsGateway,
    };
    use crate::test_support::users::user_named;
    use chrono::TimeDelta;
    use rstest::rstest;

    fn ports(users: Arc<dyn UserDirectory>) -> OutreachJobPorts {
        OutreachJobPorts {
            users,
            plans: Arc::new(InMemoryDailyPlans::default()),
            history: Arc::new(InMemoryOutreachHistory::default()),
            push: Arc::new(ScriptedPushSender::delivering(1)),
            email: Arc::new(ScriptedEmailSender::accepting()),
            sms_gateway: Arc::new(ScriptedSmsGateway::accepting()),
        }
    }

    #[rstest]
    #[case("missed_checkins", OutreachJobKind::MissedCheckins)]
    #[case("missed-reflections", OutreachJobKind::MissedReflections)]
    #[case("inactive_users", OutreachJobKind::InactiveUsers)]
    #[case("all", OutreachJobKind::All)]
    fn job_names_parse(#[case] raw: &str, #[case] expected: OutreachJobKind) {
        assert_eq!(raw.parse::<OutreachJobKind>(), Ok(expected));
    }

    #[rstest]
    fn unknown_job_names_are_rejected() {
        assert!("weekly_review".parse::<OutreachJobKind>().is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_jobs_do_not_touch_the_directory() {
        let mut users = MockUserDirectory::new();
        users.expect_list_users().never();
        let config = OutreachConfig {
            enabled: false,
            ..OutreachConfig::default()
        };
        let runner = OutreachJobRunner::new(
            ports(Arc::new(users)),
            Arc::new(MutableClock::new(utc(2026, 8, 3, 13, 0))),
            config,
        );

        let report = runner
            .run(OutreachJobKind::All)
            .await
            .expect("disabled run succeeds");

        assert_eq!(report, JobReport::disabled(OutreachJobKind::All));
    }

    #[rstest]
    #[tokio::test]
    async fn inactive_job_uses_configured_thresholds() {
        let now = utc(2026, 8, 3, 13, 0);
        let user = user_named("Ada")
            .last_active_at(now - TimeDelta::days(6))
            .family(Family::new("Okafor", "UTC"))
            .build();
        let config = OutreachConfig {
            thresholds: InactivityThresholds::new(vec![5]).expect("valid thresholds"),
            ..OutreachConfig::default()
        };
        let runner = OutreachJobRunner::new(
            ports(Arc::new(InMemoryUserDirectory::new(vec![user]))),
            Arc::new(MutableClock::new(now)),
            config,
        );

        let report = runner
            .run(OutreachJobKind::InactiveUsers)
            .await
            .expect("job succeeds");

        let summary = report.summary.expect("summary present");
        assert_eq!(report.candidates, 1);
        assert_eq!(summary.sent, 1);
        let detail = summary.details.first().expect("one detail");
        assert_eq!(detail.reason, ReasonCode::Inactive { days: 5 });
        assert_eq!(
            detail.outcome,
            DispatchOutcome::Sent {
                channel: Channel::Email
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn directory_failures_fail_the_job() {
        let mut users = MockUserDirectory::new();
        users
            .expect_list_users()
            .returning(|| Err(UserDirectoryError::query("bad column")));
        let runner = OutreachJobRunner::new(
            ports(Arc::new(users)),
            Arc::new(MutableClock::new(utc(2026, 8, 3, 13, 0))),
            OutreachConfig::default(),
        );

        let err = runner
            .run(OutreachJobKind::MissedCheckins)
            .await
            .expect_err("job fails");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
