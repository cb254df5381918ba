//! Outreach configuration loaded via OrthoConfig.
//!
//! Settings are read once at startup (environment variables prefixed with
//! `OUTREACH_`, plus any configuration file OrthoConfig discovers) and turned
//! into an [`OutreachConfig`] that services receive by value.

use std::fmt;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::InactivityThresholds;
use crate::domain::sms::DEFAULT_SMS_DAILY_LIMIT;

/// Configuration values controlling re-engagement jobs.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "OUTREACH")]
pub struct OutreachSettings {
    /// Master switch; when false jobs detect and send nothing. Unset means on.
    pub enabled: Option<bool>,
    /// Inactivity thresholds in days, e.g. `3,7,14,30`.
    #[ortho_config(skip_cli)]
    pub inactivity_thresholds: Option<ThresholdOverride>,
    /// Maximum texts per user per UTC day.
    #[ortho_config(default = DEFAULT_SMS_DAILY_LIMIT)]
    pub sms_daily_limit: u32,
    /// Snapshot file used by `outreach-run` when no path is given.
    pub snapshot_path: Option<PathBuf>,
}

impl OutreachSettings {
    /// Resolve the settings into the values services consume.
    pub fn config(&self) -> OutreachConfig {
        let thresholds = self
            .inactivity_thresholds
            .as_ref()
            .map(ThresholdOverride::to_string);
        OutreachConfig {
            enabled: self.enabled.unwrap_or(true),
            thresholds: InactivityThresholds::from_override(thresholds.as_deref()),
            sms_daily_limit: self.sms_daily_limit,
        }
    }
}

/// Raw threshold override in whatever shape the configuration layer produced.
///
/// The environment layer splits comma separated values into a list and turns
/// lone numbers into integers; a file may hold either form. Every shape is
/// rendered back to comma separated text and handed to
/// [`InactivityThresholds::parse_override`], so junk entries are dropped
/// instead of failing the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdOverride(Value);

impl fmt::Display for ThresholdOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::Array(entries) => {
                let joined = entries.iter().map(entry_text).collect::<Vec<_>>().join(",");
                f.write_str(&joined)
            }
            other => f.write_str(&entry_text(other)),
        }
    }
}

fn entry_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parsed configuration injected into jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutreachConfig {
    /// Whether jobs run at all.
    pub enabled: bool,
    /// Thresholds for the inactivity detector.
    pub thresholds: InactivityThresholds,
    /// Maximum texts per user per UTC day.
    pub sms_daily_limit: u32,
}

impl Default for OutreachConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: InactivityThresholds::default(),
            sms_daily_limit: DEFAULT_SMS_DAILY_LIMIT,
        }
    }
}
