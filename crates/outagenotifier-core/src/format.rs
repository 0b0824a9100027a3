//! Human-readable rendering of classified outages.
//!
//! Two outputs share the same sentences:
//! - **Console**: one block per outage with the link underneath, optionally
//!   colored through [`colored`]
//! - **Pop-up**: a title/body pair per outage for desktop notifications
//!
//! Both walk the buckets in presentation order: completed, scheduled, active.

use chrono::{Local, TimeZone};
use colored::Colorize;

use crate::classify::Buckets;
use crate::record::OutageRecord;
use crate::status::{DisplayState, OutageStatus};

/// Header printed above each link on the console.
pub const CONSOLE_LINK_TEXT: &str = "Please see the following URL for more information:";
/// Footer of every pop-up.
pub const POPUP_FOOTER: &str = "Right click the outages toolbar icon for more information.";

/// Formats a timestamp as local time, e.g. `June 24 at 08:35am`.
pub fn format_date(timestamp: i64) -> String {
    match Local.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.format("%B %d at %I:%M%P").to_string(),
        None => timestamp.to_string(),
    }
}

/// The plain sentence describing one classified outage.
pub fn status_text(status: OutageStatus, record: &OutageRecord) -> String {
    match status {
        OutageStatus::Completed => format!("{} is now complete.", record.title()),
        OutageStatus::Scheduled => format!(
            "{} is scheduled to start on {}.",
            record.title(),
            format_date(record.start_time())
        ),
        OutageStatus::Active => format!("{}{}", record.title(), active_suffix(record)),
    }
}

fn active_suffix(record: &OutageRecord) -> String {
    if record.has_end_time() {
        format!(" is in progress until {}.", format_date(record.end_time()))
    } else {
        " is in progress.".to_string()
    }
}

/// Renders buckets as console text.
///
/// With `color` set the styled text goes through [`colored`], which still
/// honors its global switch (`colored::control::set_override`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleFormatter {
    color: bool,
}

impl ConsoleFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Renders every bucket. Returns an empty string when nothing is in scope.
    pub fn render(&self, buckets: &Buckets) -> String {
        buckets
            .iter()
            .map(|(status, record)| self.render_record(status, record))
            .collect()
    }

    /// Renders one outage block, ending with a blank line.
    pub fn render_record(&self, status: OutageStatus, record: &OutageRecord) -> String {
        let text = if self.color {
            self.colored_text(status, record)
        } else {
            status_text(status, record)
        };
        let link = if self.color {
            record.link().blue().to_string()
        } else {
            record.link().to_string()
        };
        format!("{text}\n{CONSOLE_LINK_TEXT}\n\t{link}\n\n")
    }

    fn colored_text(&self, status: OutageStatus, record: &OutageRecord) -> String {
        match status {
            OutageStatus::Completed => status_text(status, record).yellow().bold().to_string(),
            OutageStatus::Scheduled => format!(
                "{} is scheduled to start on {}.",
                record.title().bold(),
                format_date(record.start_time()).green()
            ),
            OutageStatus::Active => format!(
                "{}{}",
                record.title().bold(),
                active_suffix(record).red().bold()
            ),
        }
    }
}

/// One desktop pop-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub state: DisplayState,
    pub title: String,
    pub body: String,
}

impl Popup {
    /// A pop-up for a state without a specific outage (`none`, `error`).
    pub fn for_state(state: DisplayState, detail: Option<&str>) -> Self {
        let body = match detail {
            Some(detail) => format!("{}\n{detail}", state.tooltip()),
            None => state.tooltip().to_string(),
        };
        Self {
            state,
            title: "Outages".to_string(),
            body,
        }
    }
}

/// Builds one pop-up per classified outage.
///
/// `calendar_url`, when set, is appended above the footer so users without
/// a tray icon still find the calendar.
pub fn popups(buckets: &Buckets, calendar_url: Option<&str>) -> Vec<Popup> {
    buckets
        .iter()
        .map(|(status, record)| {
            let mut lines = vec![status_text(status, record)];
            if status == OutageStatus::Scheduled {
                lines.push(record.link().to_string());
            }
            if let Some(url) = calendar_url {
                lines.push(url.to_string());
            }
            lines.push(POPUP_FOOTER.to_string());

            Popup {
                state: status.into(),
                title: record.title().to_string(),
                body: lines.join("\n"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NO_TIME;

    fn at(mo: u32, d: u32, h: u32, mi: u32) -> i64 {
        Local
            .with_ymd_and_hms(2015, mo, d, h, mi, 0)
            .earliest()
            .unwrap()
            .timestamp()
    }

    fn record(title: &str, start: i64, end: i64) -> OutageRecord {
        OutageRecord::new(title, start, end, "http://calendar/event/1", NO_TIME, false).unwrap()
    }

    fn buckets() -> Buckets {
        Buckets {
            completed: vec![record("Scratch cleanup", at(6, 1, 9, 0), at(6, 1, 10, 0))],
            scheduled: vec![record("Cluster upgrade", at(6, 24, 8, 35), NO_TIME)],
            active: vec![
                record("Login nodes", at(6, 2, 13, 0), at(6, 2, 21, 5)),
                record("NFS", at(6, 2, 14, 0), NO_TIME),
            ],
        }
    }

    #[test]
    fn date_is_month_day_and_lowercase_period() {
        insta::assert_snapshot!(format_date(at(6, 24, 8, 35)), @"June 24 at 08:35am");
        insta::assert_snapshot!(format_date(at(12, 5, 21, 5)), @"December 05 at 09:05pm");
    }

    #[test]
    fn sentences_per_status() {
        let b = buckets();
        insta::assert_snapshot!(
            status_text(OutageStatus::Completed, &b.completed[0]),
            @"Scratch cleanup is now complete."
        );
        insta::assert_snapshot!(
            status_text(OutageStatus::Scheduled, &b.scheduled[0]),
            @"Cluster upgrade is scheduled to start on June 24 at 08:35am."
        );
        insta::assert_snapshot!(
            status_text(OutageStatus::Active, &b.active[0]),
            @"Login nodes is in progress until June 02 at 09:05pm."
        );
        insta::assert_snapshot!(
            status_text(OutageStatus::Active, &b.active[1]),
            @"NFS is in progress."
        );
    }

    #[test]
    fn console_output_in_presentation_order() {
        let output = ConsoleFormatter::new(false).render(&buckets());
        let expected = "\
Scratch cleanup is now complete.
Please see the following URL for more information:
\thttp://calendar/event/1

Cluster upgrade is scheduled to start on June 24 at 08:35am.
Please see the following URL for more information:
\thttp://calendar/event/1

Login nodes is in progress until June 02 at 09:05pm.
Please see the following URL for more information:
\thttp://calendar/event/1

NFS is in progress.
Please see the following URL for more information:
\thttp://calendar/event/1

";
        assert_eq!(output, expected);
    }

    #[test]
    fn console_output_empty_when_nothing_in_scope() {
        assert_eq!(ConsoleFormatter::new(true).render(&Buckets::default()), "");
    }

    #[test]
    fn colored_output_wraps_text_in_escapes() {
        colored::control::set_override(true);
        let b = buckets();
        let output = ConsoleFormatter::new(true).render_record(OutageStatus::Completed, &b.completed[0]);
        assert!(output.starts_with("\x1b[1;33mScratch cleanup is now complete.\x1b[0m\n"));
        assert!(output.contains("\x1b[34mhttp://calendar/event/1\x1b[0m"));

        let active = ConsoleFormatter::new(true).render_record(OutageStatus::Active, &b.active[1]);
        assert!(active.starts_with("\x1b[1mNFS\x1b[0m\x1b[1;31m is in progress.\x1b[0m"));

        let scheduled =
            ConsoleFormatter::new(true).render_record(OutageStatus::Scheduled, &b.scheduled[0]);
        assert!(scheduled.starts_with(
            "\x1b[1mCluster upgrade\x1b[0m is scheduled to start on \x1b[32mJune 24 at 08:35am\x1b[0m."
        ));
        colored::control::unset_override();
    }

    #[test]
    fn popups_carry_state_and_footer() {
        let popups = popups(&buckets(), None);
        assert_eq!(popups.len(), 4);
        assert_eq!(popups[0].state, DisplayState::Completed);
        assert_eq!(popups[0].title, "Scratch cleanup");
        assert_eq!(
            popups[0].body,
            format!("Scratch cleanup is now complete.\n{POPUP_FOOTER}")
        );
        assert_eq!(
            popups[1].body,
            format!(
                "Cluster upgrade is scheduled to start on June 24 at 08:35am.\nhttp://calendar/event/1\n{POPUP_FOOTER}"
            )
        );
        assert_eq!(popups[3].state, DisplayState::Active);
    }

    #[test]
    fn popups_include_calendar_url() {
        let popups = popups(&buckets(), Some("http://calendar"));
        assert!(popups[0].body.contains("\nhttp://calendar\n"));
    }

    #[test]
    fn state_popup_uses_tooltip() {
        let popup = Popup::for_state(DisplayState::Error, Some("network error: timed out"));
        assert_eq!(popup.body, "There was an error checking for outages.\nnetwork error: timed out");
        assert_eq!(Popup::for_state(DisplayState::None, None).body, "No upcoming outages.");
    }
}
