//! Outbound adapters implementing domain ports.
//!
//! - **memory**: in-process stores for users, daily plans, and the outreach
//!   ledger (the ledger enforces its uniqueness key)
//! - **logging**: channel senders that emit structured `tracing` events
//!   instead of calling providers
//! - **snapshot**: JSON snapshot loading that seeds the in-memory stores
//!
//! Adapters are thin translators. They contain no business logic.

pub mod logging;
pub mod memory;
pub mod snapshot;

pub use logging::{TracingEmailSender, TracingPushSender, TracingSmsGateway};
pub use memory::{InMemoryDailyPlans, InMemoryOutreachHistory, InMemoryUserDirectory};
pub use snapshot::{OutreachSnapshot, PlanRecord, SnapshotError, load_snapshot};
