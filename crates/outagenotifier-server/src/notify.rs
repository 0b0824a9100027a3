//! Desktop pop-ups for outage transitions.
//!
//! The engine fingerprints every classified bucket set with SHA-256 and only
//! speaks when the fingerprint moves, so a steady state is announced once.
//! An empty bucket set shows the `none` state; a failed cycle shows the
//! `error` state, once per failure streak.

use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(target_os = "linux")]
use notify_rust::Urgency as DesktopUrgency;
use notify_rust::{Notification, Timeout};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use outagenotifier_core::{Buckets, DisplayState, Popup, StateDisplay, Urgency, popups};

/// Configuration for the notification engine.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Application name for notifications.
    pub app_name: String,
    /// Whether pop-ups are shown at all.
    pub enabled: bool,
    /// Directory holding `<icon>.svg` files. Icons are looked up by name in
    /// the desktop theme when unset.
    pub icon_path: Option<PathBuf>,
    /// Calendar link added to every outage pop-up.
    pub calendar_url: Option<String>,
    /// Per-state overrides; missing states use [`StateDisplay::for_state`].
    pub states: BTreeMap<DisplayState, StateDisplay>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            app_name: "outagenotifier".to_string(),
            enabled: true,
            icon_path: None,
            calendar_url: None,
            states: BTreeMap::new(),
        }
    }
}

impl NotifyConfig {
    /// Builder: enable or disable pop-ups.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set icon directory.
    pub fn with_icon_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon_path = Some(path.into());
        self
    }

    /// Builder: set calendar URL.
    pub fn with_calendar_url(mut self, url: impl Into<String>) -> Self {
        self.calendar_url = Some(url.into());
        self
    }

    /// Builder: override the display metadata of one state.
    pub fn with_state(mut self, state: DisplayState, display: StateDisplay) -> Self {
        self.states.insert(state, display);
        self
    }

    /// Display metadata for `state`.
    pub fn display_for(&self, state: DisplayState) -> StateDisplay {
        self.states
            .get(&state)
            .cloned()
            .unwrap_or_else(|| StateDisplay::for_state(state))
    }

    /// Icon reference for `state`: a file under `icon_path` or a theme name.
    pub fn icon_for(&self, state: DisplayState) -> String {
        let icon = self.display_for(state).icon;
        match self.icon_path {
            Some(ref dir) => dir.join(format!("{icon}.svg")).display().to_string(),
            None => icon,
        }
    }
}

/// Where pop-ups end up.
pub trait PopupSink: Send {
    /// Shows one pop-up. Returns an error message when delivery failed.
    fn show(&mut self, popup: &Popup, icon: &str, display: &StateDisplay) -> Result<(), String>;
}

/// Delivers pop-ups through the desktop notification service.
#[derive(Debug, Clone)]
pub struct DesktopSink {
    app_name: String,
}

impl DesktopSink {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl PopupSink for DesktopSink {
    fn show(&mut self, popup: &Popup, icon: &str, display: &StateDisplay) -> Result<(), String> {
        let timeout = match display.timeout_ms {
            0 => Timeout::Never,
            ms => Timeout::Milliseconds(ms),
        };

        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&popup.title)
            .body(&popup.body)
            .icon(icon)
            .timeout(timeout);

        #[cfg(target_os = "linux")]
        notification.urgency(desktop_urgency(display.urgency));

        notification.show().map(|_| ()).map_err(|e| e.to_string())
    }
}

#[cfg(target_os = "linux")]
fn desktop_urgency(urgency: Urgency) -> DesktopUrgency {
    match urgency {
        Urgency::Low => DesktopUrgency::Low,
        Urgency::Normal => DesktopUrgency::Normal,
        Urgency::Critical => DesktopUrgency::Critical,
    }
}

/// Hex SHA-256 of a classified bucket set.
pub fn buckets_fingerprint(buckets: &Buckets) -> String {
    let mut hasher = Sha256::new();
    for (status, record) in buckets.iter() {
        hasher.update(status.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(record.title().as_bytes());
        hasher.update([0]);
        hasher.update(record.start_time().to_le_bytes());
        hasher.update(record.end_time().to_le_bytes());
        hasher.update(record.link().as_bytes());
        hasher.update([0]);
        hasher.update([u8::from(record.is_resolved())]);
    }
    hex::encode(hasher.finalize())
}

/// Announces transitions of the classified state.
pub struct NotifyEngine {
    config: NotifyConfig,
    sink: Box<dyn PopupSink>,
    last_fingerprint: Option<String>,
    error_shown: bool,
}

impl NotifyEngine {
    /// Creates an engine that talks to the desktop notification service.
    pub fn new(config: NotifyConfig) -> Self {
        let sink = DesktopSink::new(config.app_name.clone());
        Self::with_sink(config, Box::new(sink))
    }

    pub fn with_sink(config: NotifyConfig, sink: Box<dyn PopupSink>) -> Self {
        Self {
            config,
            sink,
            last_fingerprint: None,
            error_shown: false,
        }
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Shows pop-ups for `buckets` if they differ from the last announced
    /// set. Returns the number of pop-ups delivered.
    pub fn announce(&mut self, buckets: &Buckets) -> usize {
        self.error_shown = false;

        let fingerprint = buckets_fingerprint(buckets);
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            debug!(fingerprint = %fingerprint, "Outage state unchanged, nothing to announce");
            return 0;
        }
        self.last_fingerprint = Some(fingerprint);

        if !self.config.enabled {
            return 0;
        }

        let batch = if buckets.is_empty() {
            vec![Popup::for_state(DisplayState::None, None)]
        } else {
            popups(buckets, self.config.calendar_url.as_deref())
        };
        info!(count = batch.len(), "Announcing outage changes");
        batch.iter().filter(|popup| self.deliver(popup)).count()
    }

    /// Shows the `error` state unless it is already showing.
    pub fn announce_error(&mut self, detail: &str) -> bool {
        if self.error_shown || !self.config.enabled {
            return false;
        }
        self.error_shown = true;
        self.deliver(&Popup::for_state(DisplayState::Error, Some(detail)))
    }

    fn deliver(&mut self, popup: &Popup) -> bool {
        let shown = self.config.display_for(popup.state);
        let icon = self.config.icon_for(popup.state);

        debug!(
            title = %popup.title,
            state = %popup.state,
            icon = %icon,
            urgency = %shown.urgency,
            timeout_ms = shown.timeout_ms,
            "Sending notification"
        );

        match self.sink.show(popup, &icon, &shown) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, title = %popup.title, "Failed to send notification");
                false
            }
        }
    }
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
