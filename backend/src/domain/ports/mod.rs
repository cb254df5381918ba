//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod daily_plan_repository;
mod email_sender;
mod outreach_history_repository;
mod push_sender;
mod sms_gateway;
mod sms_sender;
mod user_directory;

#[cfg(test)]
pub use daily_plan_repository::MockDailyPlanRepository;
pub use daily_plan_repository::{
    DailyPlanRepository, DailyPlanRepositoryError, FixtureDailyPlanRepository,
};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailSender, EmailSenderError, FixtureEmailSender, OutreachEmail};
#[cfg(test)]
pub use outreach_history_repository::MockOutreachHistoryRepository;
pub use outreach_history_repository::{
    FixtureOutreachHistoryRepository, OutreachHistoryRepository, OutreachHistoryRepositoryError,
};
#[cfg(test)]
pub use push_sender::MockPushSender;
pub use push_sender::{FixturePushSender, PushDelivery, PushMessage, PushSender, PushSenderError};
#[cfg(test)]
pub use sms_gateway::MockSmsGateway;
pub use sms_gateway::{FixtureSmsGateway, SmsGateway, SmsGatewayError};
#[cfg(test)]
pub use sms_sender::MockSmsSender;
pub use sms_sender::{SmsError, SmsReceipt, SmsSender};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError};
