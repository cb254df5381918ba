//! Outreach message copy.
//!
//! Every [`ReasonCode`] maps to exactly one template through an exhaustive
//! `match`, so a reason without copy cannot be constructed.

use serde::{Deserialize, Serialize};

use super::{DisplayName, Family, ReasonCode};

const APP_SCHEME: &str = "familyhub://";

/// Rendered message for one outreach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Notification title or email subject.
    pub title: String,
    /// Personalised body text.
    pub body: String,
    /// Deep link into the app, scoped to the family when known.
    pub link: String,
}

enum Screen {
    Planner,
    Reflection,
}

impl MessageTemplate {
    /// Render the copy for `reason`, personalised for `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use outreach::domain::{DisplayName, MessageTemplate, ReasonCode};
    ///
    /// let name = DisplayName::new("Sam").expect("valid name");
    /// let message = MessageTemplate::render(ReasonCode::MissedCheckin, &name, None);
    /// assert!(message.body.contains("Sam"));
    /// assert_eq!(message.link, "familyhub://home");
    /// ```
    pub fn render(reason: ReasonCode, name: &DisplayName, family: Option<&Family>) -> Self {
        let (title, body, screen) = match reason {
            ReasonCode::MissedCheckin => (
                "Plan your day".to_owned(),
                format!("Hi {name}, you haven't planned today yet. A two-minute check-in keeps the family on track."),
                Screen::Planner,
            ),
            ReasonCode::MissedReflection => (
                "How did today go?".to_owned(),
                format!("Hi {name}, take a moment to reflect on today's plan before bed."),
                Screen::Reflection,
            ),
            ReasonCode::Inactive { days } if days >= 30 => (
                "We'd love to have you back".to_owned(),
                format!("Hi {name}, it's been {days} days. Your family's goals are waiting whenever you're ready."),
                Screen::Planner,
            ),
            ReasonCode::Inactive { days } if days >= 14 => (
                "Your family misses you".to_owned(),
                format!("Hi {name}, it's been {days} days since you last checked in. Pick one small goal to restart."),
                Screen::Planner,
            ),
            ReasonCode::Inactive { days } if days >= 7 => (
                "Let's pick up where you left off".to_owned(),
                format!("Hi {name}, a week goes fast. It's been {days} days; plan one thing for today."),
                Screen::Planner,
            ),
            ReasonCode::Inactive { days } => (
                "Checking in".to_owned(),
                format!("Hi {name}, we haven't seen you in {days} days. Your planner is ready when you are."),
                Screen::Planner,
            ),
        };

        Self {
            title,
            body,
            link: deep_link(family, screen),
        }
    }
}

fn deep_link(family: Option<&Family>, screen: Screen) -> String {
    let Some(family) = family else {
        return format!("{APP_SCHEME}home");
    };
    let path = match screen {
        Screen::Planner => "planner",
        Screen::Reflection => "reflection",
    };
    format!("{APP_SCHEME}families/{}/{path}", family.id)
}
