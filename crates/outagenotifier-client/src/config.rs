//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/outagenotifier/config.toml` by default. Every key is optional:
//!
//! ```toml
//! [feed]
//! url = "https://calendar.example.org/outages.ics"
//! format = "ical"            # or "rss"
//! timeout_secs = 30
//! resolved_marker = "52fd10b1ca2d496af32163f088d8ec96"
//!
//! [scope]
//! ahead_secs = 2678400       # 31 days
//! past_secs = 43200          # 12 hours
//!
//! [paths]
//! working_directory = "/var/lib/outagenotifier"
//!
//! [widget]
//! update_interval_secs = 300
//! icon_path = "/usr/share/outagenotifier/icons"
//! calendar_url = "https://calendar.example.org/"
//!
//! [states.active]
//! urgency = "critical"
//! timeout_ms = 0
//! ```
//!
//! The file is read once at startup into an immutable [`ClientConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use outagenotifier_core::{
    Classifier, DEFAULT_SCOPE_AHEAD, DEFAULT_SCOPE_PAST, DisplayState, StateDisplay, Urgency,
};
use outagenotifier_providers::{
    DEFAULT_RESOLVED_MARKER, FeedClientConfig, FeedFormat, ResolvedMarker,
};
use outagenotifier_server::{DEFAULT_UPDATE_INTERVAL, NotifyConfig, SchedulerConfig};

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the outagenotifier client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Feed location and parsing.
    pub feed: FeedSettings,

    /// Classification windows.
    pub scope: ScopeSettings,

    /// On-disk locations.
    pub paths: PathSettings,

    /// Watch mode and pop-up settings.
    pub widget: WidgetSettings,

    /// Per-state pop-up overrides.
    pub states: StatesSettings,
}

/// Feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// URL of the ICS export or RSS feed.
    pub url: String,

    pub format: FeedFormat,

    /// HTTP timeout in seconds.
    pub timeout_secs: u64,

    /// Marker editors put in a description to flag an outage resolved.
    pub resolved_marker: String,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            format: FeedFormat::default(),
            timeout_secs: 30,
            resolved_marker: DEFAULT_RESOLVED_MARKER.to_string(),
        }
    }
}

/// Scope settings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeSettings {
    /// How far ahead a scheduled outage is still shown.
    pub ahead_secs: i64,

    /// How long after its end a completed outage is still shown.
    pub past_secs: i64,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            ahead_secs: DEFAULT_SCOPE_AHEAD,
            past_secs: DEFAULT_SCOPE_PAST,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory for the raw feed cache and the snapshot.
    pub working_directory: Option<PathBuf>,
}

/// Watch mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Seconds between poll cycles.
    pub update_interval_secs: u64,

    /// Whether watch mode shows desktop pop-ups.
    pub notifications: bool,

    /// Directory holding the state icons (`<icon>.svg`).
    pub icon_path: Option<PathBuf>,

    /// Calendar link added to pop-ups.
    pub calendar_url: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            update_interval_secs: DEFAULT_UPDATE_INTERVAL.as_secs(),
            notifications: true,
            icon_path: None,
            calendar_url: None,
        }
    }
}

/// Overrides for one display state. Unset keys keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Pop-up timeout in milliseconds; `0` keeps it until dismissed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
}

impl StateOverride {
    /// Applies this override on top of the built-in metadata of `state`.
    pub fn resolve(&self, state: DisplayState) -> StateDisplay {
        let base = StateDisplay::for_state(state);
        StateDisplay::new(
            self.icon.clone().unwrap_or(base.icon),
            self.timeout_ms.unwrap_or(base.timeout_ms),
            self.urgency.unwrap_or(base.urgency),
        )
    }
}

/// The `[states.*]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatesSettings {
    pub active: StateOverride,
    pub completed: StateOverride,
    pub default: StateOverride,
    pub error: StateOverride,
    pub none: StateOverride,
    pub scheduled: StateOverride,
}

impl StatesSettings {
    pub fn get(&self, state: DisplayState) -> &StateOverride {
        match state {
            DisplayState::Active => &self.active,
            DisplayState::Completed => &self.completed,
            DisplayState::Default => &self.default,
            DisplayState::Error => &self.error,
            DisplayState::None => &self.none,
            DisplayState::Scheduled => &self.scheduled,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Parses a TOML document.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Checks the settings a poll cycle depends on.
    pub fn validate(&self) -> ClientResult<()> {
        self.feed_client_config()?;
        self.resolved_marker()?;

        if self.widget.update_interval_secs == 0 {
            return Err(ClientError::config("widget.update_interval_secs must be positive"));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ClientError::config("feed.timeout_secs must be positive"));
        }
        if self.scope.ahead_secs <= 0 || self.scope.past_secs <= 0 {
            return Err(ClientError::config(
                "scope.ahead_secs and scope.past_secs must be positive",
            ));
        }
        Ok(())
    }

    /// HTTP settings for the feed.
    pub fn feed_client_config(&self) -> ClientResult<FeedClientConfig> {
        if self.feed.url.trim().is_empty() {
            return Err(ClientError::config(format!(
                "feed.url is not set; add it to {}",
                Self::default_path().display()
            )));
        }
        let config = FeedClientConfig::new(self.feed.url.trim())?
            .with_timeout(Duration::from_secs(self.feed.timeout_secs));
        Ok(config)
    }

    pub fn resolved_marker(&self) -> ClientResult<ResolvedMarker> {
        Ok(ResolvedMarker::new(self.feed.resolved_marker.clone())?)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.scope.ahead_secs, self.scope.past_secs)
    }

    /// Directory for the raw feed cache and the snapshot.
    pub fn working_directory(&self) -> PathBuf {
        self.paths
            .working_directory
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(Duration::from_secs(self.widget.update_interval_secs))
    }

    /// Pop-up settings with every state resolved.
    pub fn notify_config(&self) -> NotifyConfig {
        let mut config = NotifyConfig::default().with_enabled(self.widget.notifications);
        if let Some(ref dir) = self.widget.icon_path {
            config = config.with_icon_path(dir);
        }
        if let Some(ref url) = self.widget.calendar_url {
            config = config.with_calendar_url(url);
        }
        DisplayState::ALL.into_iter().fold(config, |config, state| {
            config.with_state(state, self.states.get(state).resolve(state))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("outagenotifier")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("outagenotifier")
    }
}
