//! SMS channel sender.
//!
//! [`QuotaEnforcingSmsSender`] sits between the dispatcher and the raw
//! [`SmsGateway`]. It rejects numbers that are not E.164 and caps texts per
//! user per UTC day; both surface as [`SmsError`] so the dispatcher treats
//! them as channel failures and falls through.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use async_trait::async_trait;
use mockable::Clock;
use regex::Regex;
use tracing::{debug, warn};

use crate::domain::UserId;
use crate::domain::ports::{SmsError, SmsGateway, SmsReceipt, SmsSender};

mod quota;

pub use quota::SmsQuotaState;

/// Default number of texts a user may receive per day.
pub const DEFAULT_SMS_DAILY_LIMIT: u32 = 5;

static E164_RE: OnceLock<Regex> = OnceLock::new();

fn e164_regex() -> &'static Regex {
    E164_RE.get_or_init(|| {
        Regex::new(r"^\+[1-9]\d{1,14}$")
            .unwrap_or_else(|error| panic!("E.164 regex failed to compile: {error}"))
    })
}

/// Whether `phone` is an E.164 number such as `+15551234567`.
///
/// # Examples
///
/// ```
/// use outreach::domain::sms::is_e164;
///
/// assert!(is_e164("+447700900123"));
/// assert!(!is_e164("07700 900123"));
/// assert!(!is_e164("+0123"));
/// ```
pub fn is_e164(phone: &str) -> bool {
    e164_regex().is_match(phone)
}

/// SMS sender enforcing number format and a per-user daily quota.
pub struct QuotaEnforcingSmsSender {
    gateway: Arc<dyn SmsGateway>,
    clock: Arc<dyn Clock>,
    quota: Mutex<SmsQuotaState>,
}

impl QuotaEnforcingSmsSender {
    /// Wrap `gateway`, allowing `daily_limit` texts per user per day.
    pub fn new(gateway: Arc<dyn SmsGateway>, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        let quota = SmsQuotaState::new(clock.utc(), daily_limit);
        Self {
            gateway,
            clock,
            quota: Mutex::new(quota),
        }
    }

    fn lock_quota(&self) -> MutexGuard<'_, SmsQuotaState> {
        match self.quota.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl SmsSender for QuotaEnforcingSmsSender {
    async fn send(
        &self,
        user_id: &UserId,
        phone: &str,
        body: &str,
    ) -> Result<SmsReceipt, SmsError> {
        let phone = phone.trim();
        if !is_e164(phone) {
            return Err(SmsError::invalid_phone_number(phone));
        }

        {
            let mut quota = self.lock_quota();
            if !quota.try_reserve(user_id, self.clock.utc()) {
                debug!(user_id = %user_id, limit = quota.limit(), "sms quota exhausted");
                return Err(SmsError::daily_quota_exceeded(quota.limit()));
            }
        }

        match self.gateway.deliver(phone, body).await {
            Ok(message_sid) => Ok(SmsReceipt { message_sid }),
            Err(error) => {
                self.lock_quota().release(user_id, self.clock.utc());
                warn!(user_id = %user_id, %error, "sms gateway rejected message");
                Err(SmsError::gateway(error.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests;
