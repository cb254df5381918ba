//! Outreach dispatch: channel selection, fallback delivery, and the ledger.
//!
//! [`OutreachService::send_outreach`] evaluates one `(user, reason)` pair in a
//! fixed order: resolve the family-local day, check the ledger, render the
//! template, honour quiet hours, build the channel list, then try each
//! channel until one accepts. The ledger entry is written only after a
//! successful delivery; a uniqueness conflict on that write means another run
//! won the race and is reported as already sent.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    EmailSender, OutreachEmail, OutreachHistoryRepository, OutreachHistoryRepositoryError,
    PushMessage, PushSender, SmsSender,
};
use crate::domain::{
    Channel, Error, Family, LocalMoment, MessageTemplate, OutreachCandidate, OutreachHistoryEntry,
    OutreachUser, ReasonCode,
};

mod channels;
mod outcome;

pub use channels::eligible_channels;
pub use outcome::{
    BatchSummary, DispatchDetail, DispatchOutcome, FailureReason, OutreachOutcome, SkipReason,
};

/// Port bundle required by [`OutreachService`].
pub struct OutreachServicePorts {
    /// Outreach ledger.
    pub history: Arc<dyn OutreachHistoryRepository>,
    /// Push channel.
    pub push: Arc<dyn PushSender>,
    /// Email channel.
    pub email: Arc<dyn EmailSender>,
    /// SMS channel.
    pub sms: Arc<dyn SmsSender>,
}

impl OutreachServicePorts {
    /// Build a strongly-typed dispatch port bundle.
    pub fn new(
        history: Arc<dyn OutreachHistoryRepository>,
        push: Arc<dyn PushSender>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            history,
            push,
            email,
            sms,
        }
    }
}

/// Sends outreach through the first channel that accepts it.
pub struct OutreachService {
    history: Arc<dyn OutreachHistoryRepository>,
    push: Arc<dyn PushSender>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
    clock: Arc<dyn Clock>,
}

struct Delivery<'a> {
    user: &'a OutreachUser,
    reason: ReasonCode,
    family: Option<&'a Family>,
    template: &'a MessageTemplate,
}

impl OutreachService {
    /// Build a dispatch service.
    pub fn new(ports: OutreachServicePorts, clock: Arc<dyn Clock>) -> Self {
        Self {
            history: ports.history,
            push: ports.push,
            email: ports.email,
            sms: ports.sms,
            clock,
        }
    }

    /// Send at most one outreach to `user` for `reason` today.
    ///
    /// `family` supplies the local day and the deep link; `None` means UTC
    /// and a link to the app home. Only ledger failures other than a
    /// uniqueness conflict are returned as `Err`.
    pub async fn send_outreach(
        &self,
        user: &OutreachUser,
        reason: ReasonCode,
        family: Option<&Family>,
    ) -> Result<OutreachOutcome, Error> {
        let now = self.clock.utc();
        let moment = match LocalMoment::for_optional_family(family, now) {
            Ok(moment) => moment,
            Err(error) => {
                warn!(user_id = %user.id, %reason, %error, "skipping outreach for unknown timezone");
                return Ok(OutreachOutcome::Skipped {
                    reason: SkipReason::InvalidTimezone,
                });
            }
        };
        let today = moment.date();

        if self
            .history
            .exists(&user.id, reason, today)
            .await
            .map_err(map_history_error)?
        {
            debug!(user_id = %user.id, %reason, %today, "outreach already sent today");
            return Ok(OutreachOutcome::Skipped {
                reason: SkipReason::AlreadySentToday,
            });
        }

        let template = MessageTemplate::render(reason, &user.display_name, family);

        let preferences = user.preferences();
        if preferences.in_quiet_hours(moment.time()) {
            debug!(user_id = %user.id, %reason, "inside quiet hours");
            return Ok(OutreachOutcome::Skipped {
                reason: SkipReason::QuietHours,
            });
        }

        let channels = eligible_channels(user, &preferences, reason, now);
        if channels.is_empty() {
            info!(user_id = %user.id, %reason, "no available channel");
            return Ok(OutreachOutcome::Failed {
                reason: FailureReason::NoAvailableChannel,
            });
        }

        let delivery = Delivery {
            user,
            reason,
            family,
            template: &template,
        };
        for channel in channels {
            if self.attempt(channel, &delivery).await {
                return self.record(&delivery, channel, today, now).await;
            }
        }

        warn!(user_id = %user.id, %reason, "every eligible channel failed");
        Ok(OutreachOutcome::Failed {
            reason: FailureReason::DeliveryFailed,
        })
    }

    /// Dispatch each candidate in order and tally the results.
    ///
    /// An error for one candidate is logged and counted as a failure; the
    /// remaining candidates are still processed.
    pub async fn send_to_candidates(&self, candidates: &[OutreachCandidate]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for candidate in candidates {
            let outcome = match self
                .send_outreach(&candidate.user, candidate.reason, candidate.family.as_ref())
                .await
            {
                Ok(outcome) => DispatchOutcome::from(outcome),
                Err(error) => {
                    warn!(
                        user_id = %candidate.user.id,
                        reason = %candidate.reason,
                        %error,
                        "outreach dispatch failed"
                    );
                    DispatchOutcome::Error {
                        message: error.message().to_owned(),
                    }
                }
            };
            summary.record(DispatchDetail {
                user_id: candidate.user.id.clone(),
                reason: candidate.reason,
                outcome,
            });
        }
        summary
    }

    async fn attempt(&self, channel: Channel, delivery: &Delivery<'_>) -> bool {
        let user = delivery.user;
        let reason = delivery.reason;
        let template = delivery.template;
        match channel {
            Channel::Push => {
                let message = PushMessage::from_template(reason, template);
                match self.push.send_to_user(user, &message).await {
                    Ok(result) if result.delivered() => true,
                    Ok(result) => {
                        warn!(user_id = %user.id, %reason, failed = result.failed, "push reached no device");
                        false
                    }
                    Err(error) => {
                        warn!(user_id = %user.id, %reason, %error, "push delivery failed");
                        false
                    }
                }
            }
            Channel::Email => {
                let email = OutreachEmail {
                    outreach_type: reason,
                    user_id: user.id.clone(),
                    family_id: delivery.family.map(|family| family.id),
                    recipient_name: user.display_name.to_string(),
                    subject: template.title.clone(),
                    body: template.body.clone(),
                    link: template.link.clone(),
                };
                match self.email.enqueue(&email).await {
                    Ok(()) => true,
                    Err(error) => {
                        warn!(user_id = %user.id, %reason, %error, "email enqueue failed");
                        false
                    }
                }
            }
            Channel::Sms => {
                let Some(phone) = user.verified_phone() else {
                    return false;
                };
                let body = format!("{} {}", template.body, template.link);
                match self.sms.send(&user.id, phone, &body).await {
                    Ok(receipt) => {
                        debug!(user_id = %user.id, message_sid = %receipt.message_sid, "sms accepted");
                        true
                    }
                    Err(error) => {
                        warn!(user_id = %user.id, %reason, %error, "sms delivery failed");
                        false
                    }
                }
            }
        }
    }

    async fn record(
        &self,
        delivery: &Delivery<'_>,
        channel: Channel,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<OutreachOutcome, Error> {
        let user_id = &delivery.user.id;
        let reason = delivery.reason;
        let entry = OutreachHistoryEntry::delivered(user_id.clone(), reason, channel, today, now);
        match self.history.record(&entry).await {
            Ok(()) => {
                info!(user_id = %user_id, %reason, %channel, "outreach sent");
                Ok(OutreachOutcome::Sent { channel })
            }
            Err(OutreachHistoryRepositoryError::DuplicateEntry { message }) => {
                warn!(
                    user_id = %user_id,
                    %reason,
                    %channel,
                    %message,
                    "concurrent run already recorded this outreach"
                );
                Ok(OutreachOutcome::Skipped {
                    reason: SkipReason::AlreadySentToday,
                })
            }
            Err(error) => Err(map_history_error(error)),
        }
    }
}

fn map_history_error(error: OutreachHistoryRepositoryError) -> Error {
    match error {
        OutreachHistoryRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("outreach history unavailable: {message}"))
        }
        OutreachHistoryRepositoryError::Query { message }
        | OutreachHistoryRepositoryError::DuplicateEntry { message } => {
            Error::internal(format!("outreach history failed: {message}"))
        }
    }
}

#[cfg(test)]
mod tests;
