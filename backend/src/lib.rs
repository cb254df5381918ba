//! Re-engagement detection and outreach orchestration.
//!
//! The crate is organised hexagonally: [`domain`] owns detection, channel
//! selection, and dispatch semantics behind driven ports; [`outbound`] holds
//! adapters (in-memory stores, tracing-backed senders, snapshot loading);
//! [`settings`] parses configuration once at startup.

pub mod domain;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use settings::{OutreachConfig, OutreachSettings};
