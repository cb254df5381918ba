//! Daily plan snapshot read from the planning store.

use serde::{Deserialize, Serialize};

/// Evening reflection attached to a daily plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionSnapshot {
    /// Number of answered reflection prompts.
    pub response_count: u32,
}

/// The subset of a user's daily plan detection needs.
///
/// A plan record can exist without being started: the store creates an empty
/// plan when the app opens, so presence alone is not a check-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPlanSnapshot {
    /// The day's intention, if one was written.
    #[serde(default)]
    pub intention: Option<String>,
    /// Number of tasks on the plan.
    #[serde(default)]
    pub task_count: u32,
    /// Evening reflection, if one was opened.
    #[serde(default)]
    pub evening_reflection: Option<ReflectionSnapshot>,
}

impl DailyPlanSnapshot {
    /// Whether the user did anything with the plan: set an intention or added
    /// a task.
    pub fn is_started(&self) -> bool {
        let has_intention = self
            .intention
            .as_deref()
            .is_some_and(|intention| !intention.trim().is_empty());
        has_intention || self.task_count > 0
    }

    /// Whether the evening reflection holds at least one response.
    pub fn reflection_complete(&self) -> bool {
        self.evening_reflection
            .as_ref()
            .is_some_and(|reflection| reflection.response_count > 0)
    }
}
