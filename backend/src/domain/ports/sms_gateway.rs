//! Port for the raw SMS transport.
//!
//! Validation and quota live in [`crate::domain::sms::QuotaEnforcingSmsSender`];
//! gateway adapters only move bytes to the provider.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by SMS provider adapters.
    pub enum SmsGatewayError {
        /// The provider rejected the message or was unreachable.
        Provider {
            /// Adapter-supplied detail.
            message: String
        } => "sms provider failure: {message}",
    }
}

/// Sends a text message through a provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `body` to `phone`, returning the provider message id.
    async fn deliver(&self, phone: &str, body: &str) -> Result<String, SmsGatewayError>;
}

/// Fixture implementation that always rejects delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSmsGateway;

#[async_trait]
impl SmsGateway for FixtureSmsGateway {
    async fn deliver(&self, _phone: &str, _body: &str) -> Result<String, SmsGatewayError> {
        Err(SmsGatewayError::provider("no sms gateway configured"))
    }
}
