//! Outage statuses and the display states presented to the user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The bucket a classified outage lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutageStatus {
    Active,
    Completed,
    Scheduled,
}

impl OutageStatus {
    /// All statuses in presentation order.
    pub const ALL: [OutageStatus; 3] = [Self::Completed, Self::Scheduled, Self::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for OutageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OutageStatus> for DisplayState {
    fn from(status: OutageStatus) -> Self {
        match status {
            OutageStatus::Active => Self::Active,
            OutageStatus::Completed => Self::Completed,
            OutageStatus::Scheduled => Self::Scheduled,
        }
    }
}

/// Every state that carries its own icon, timeout and urgency.
///
/// `Default` is the idle tray state, `Error` follows a failed cycle and
/// `None` is shown when nothing is in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayState {
    Active,
    Completed,
    Default,
    Error,
    None,
    Scheduled,
}

impl DisplayState {
    pub const ALL: [DisplayState; 6] = [
        Self::Active,
        Self::Completed,
        Self::Default,
        Self::Error,
        Self::None,
        Self::Scheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Default => "default",
            Self::Error => "error",
            Self::None => "none",
            Self::Scheduled => "scheduled",
        }
    }

    /// Short sentence describing the state, used as tray tooltip.
    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::Active => "An outage is active.",
            Self::Completed => "An outage was recently completed.",
            Self::Default => "Processing outages feed.",
            Self::Error => "There was an error checking for outages.",
            Self::None => "No upcoming outages.",
            Self::Scheduled => "There are upcoming outages.",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown display state '{s}'"))
    }
}

/// Pop-up urgency, mapped onto the desktop notification urgency levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Normal,
    Critical,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Critical => "critical",
        })
    }
}

/// Display metadata for one [`DisplayState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDisplay {
    /// Icon name without extension, resolved as `<icon_path>/<icon>.svg`.
    pub icon: String,
    /// Pop-up timeout in milliseconds; `0` keeps it until dismissed.
    pub timeout_ms: u32,
    pub urgency: Urgency,
}

impl Default for StateDisplay {
    fn default() -> Self {
        Self::for_state(DisplayState::Default)
    }
}

impl StateDisplay {
    pub fn new(icon: impl Into<String>, timeout_ms: u32, urgency: Urgency) -> Self {
        Self {
            icon: icon.into(),
            timeout_ms,
            urgency,
        }
    }

    /// The built-in metadata for `state`.
    pub fn for_state(state: DisplayState) -> Self {
        let (timeout_ms, urgency) = match state {
            DisplayState::Active => (0, Urgency::Critical),
            DisplayState::Completed => (5000, Urgency::Critical),
            DisplayState::Default => (0, Urgency::Low),
            DisplayState::Error => (5000, Urgency::Low),
            DisplayState::None => (0, Urgency::Low),
            DisplayState::Scheduled => (10000, Urgency::Normal),
        };
        Self::new(format!("outages-{state}"), timeout_ms, urgency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_display_state() {
        for status in OutageStatus::ALL {
            let state = DisplayState::from(status);
            assert_eq!(state.as_str(), status.as_str());
        }
    }

    #[test]
    fn display_state_parses_case_insensitively() {
        assert_eq!("NONE".parse::<DisplayState>(), Ok(DisplayState::None));
        assert_eq!("scheduled".parse::<DisplayState>(), Ok(DisplayState::Scheduled));
        assert!("resolved".parse::<DisplayState>().is_err());
    }

    #[test]
    fn built_in_state_metadata() {
        let active = StateDisplay::for_state(DisplayState::Active);
        assert_eq!(active.urgency, Urgency::Critical);
        assert_eq!(active.timeout_ms, 0);
        assert_eq!(active.icon, "outages-active");

        let scheduled = StateDisplay::for_state(DisplayState::Scheduled);
        assert_eq!(scheduled.urgency, Urgency::Normal);
        assert_eq!(scheduled.timeout_ms, 10000);
    }

    #[test]
    fn urgency_serializes_lowercase() {
        let json = serde_json::to_string(&Urgency::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
