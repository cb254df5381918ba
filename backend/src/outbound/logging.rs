//! Channel adapters that log deliveries through `tracing`.
//!
//! Used by the `outreach-run` binary for dry runs, where outreach decisions
//! should be observable without contacting push, mail, or SMS providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::OutreachUser;
use crate::domain::ports::{
    EmailSender, EmailSenderError, OutreachEmail, PushDelivery, PushMessage, PushSender,
    PushSenderError, SmsGateway, SmsGatewayError,
};

/// Push adapter that logs one event per usable device token.
pub struct TracingPushSender {
    clock: Arc<dyn Clock>,
}

impl TracingPushSender {
    /// Build an adapter judging token staleness against `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl PushSender for TracingPushSender {
    async fn send_to_user(
        &self,
        user: &OutreachUser,
        message: &PushMessage,
    ) -> Result<PushDelivery, PushSenderError> {
        let now = self.clock.utc();
        let mut delivery = PushDelivery::default();
        for token in &user.device_tokens {
            if token.is_usable(now) {
                info!(
                    user_id = %user.id,
                    platform = ?token.platform,
                    reason = %message.outreach_type,
                    title = %message.title,
                    link = %message.link,
                    "push delivered"
                );
                delivery.sent += 1;
            } else {
                delivery.failed += 1;
            }
        }
        Ok(delivery)
    }
}

/// Email adapter that logs each queued message.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmailSender;

#[async_trait]
impl EmailSender for TracingEmailSender {
    async fn enqueue(&self, email: &OutreachEmail) -> Result<(), EmailSenderError> {
        info!(
            user_id = %email.user_id,
            family_id = ?email.family_id,
            reason = %email.outreach_type,
            subject = %email.subject,
            "email queued"
        );
        Ok(())
    }
}

/// SMS gateway that logs each message and issues sequential ids.
#[derive(Debug, Default)]
pub struct TracingSmsGateway {
    next_id: AtomicU64,
}

#[async_trait]
impl SmsGateway for TracingSmsGateway {
    async fn deliver(&self, phone: &str, body: &str) -> Result<String, SmsGatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let message_sid = format!("log-{id:06}");
        info!(
            %message_sid,
            phone_suffix = %phone_suffix(phone),
            length = body.chars().count(),
            "sms delivered"
        );
        Ok(message_sid)
    }
}

fn phone_suffix(phone: &str) -> &str {
    let start = phone.len().saturating_sub(4);
    phone.get(start..).unwrap_or(phone)
}
