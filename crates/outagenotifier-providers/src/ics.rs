//! Normalization of the iCalendar feed.
//!
//! Fields map directly onto [`OutageRecord`]:
//!
//! | property        | field                 |
//! |-----------------|-----------------------|
//! | `SUMMARY`       | title (sanitized)     |
//! | `DTSTART`       | start_time            |
//! | `DTEND`         | end_time              |
//! | `URL`           | link                  |
//! | `LAST-MODIFIED` | mod_time              |
//! | `DESCRIPTION`   | resolved marker scan  |

use chrono::{Local, NaiveDateTime, TimeZone};
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use outagenotifier_core::{NO_TIME, OutageRecord};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::resolved::ResolvedMarker;

/// Parses ICS content into outage records, in feed order.
///
/// # Errors
///
/// Fails on unparsable content, on an event without `DTSTART` and on the
/// first record that violates the record invariants. One bad event aborts
/// the whole feed.
pub fn parse_ics(ics: &str, marker: &ResolvedMarker) -> ProviderResult<Vec<OutageRecord>> {
    let calendar = ics
        .parse::<Calendar>()
        .map_err(|e| ProviderError::invalid_response(format!("Failed to parse ICS: {}", e)))?;

    let records = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => Some(parse_event(event, marker)),
            _ => None,
        })
        .collect::<ProviderResult<Vec<_>>>()?;

    debug!(count = records.len(), "Parsed outages from ICS");
    Ok(records)
}

fn parse_event(event: &Event, marker: &ResolvedMarker) -> ProviderResult<OutageRecord> {
    let title = event.get_summary().unwrap_or_default();
    let start = event.get_start().ok_or_else(|| {
        ProviderError::invalid_response(format!("Event '{}' has no DTSTART", title))
    })?;
    let start_time = to_timestamp(start)?;

    // A missing DTEND, or one equal to DTSTART, means no explicit end.
    let end_time = match event.get_end() {
        Some(end) => match to_timestamp(end)? {
            t if t == start_time => NO_TIME,
            t => t,
        },
        None => NO_TIME,
    };

    let link = event.property_value("URL").unwrap_or_default();
    let mod_time = event
        .get_last_modified()
        .map_or(NO_TIME, |dt| dt.timestamp());
    let resolved = event
        .get_description()
        .is_some_and(|desc| marker.is_resolved(desc));

    debug!(
        title = %title,
        start_time,
        end_time,
        link = %link,
        mod_time,
        resolved,
        "Parsed ICS event"
    );

    Ok(OutageRecord::new(
        title, start_time, end_time, link, mod_time, resolved,
    )?)
}

/// Converts an ICS date or date-time to a unix timestamp.
///
/// UTC values are absolute. Floating and `TZID` values are read as local
/// wall-clock time, and all-day dates as local midnight.
fn to_timestamp(value: DatePerhapsTime) -> ProviderResult<i64> {
    match value {
        DatePerhapsTime::Date(date) => date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| ProviderError::invalid_response(format!("Invalid date {}", date)))
            .and_then(|naive| local_timestamp(&naive)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Ok(dt.timestamp()),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => local_timestamp(&naive),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => {
            local_timestamp(&date_time)
        }
    }
}

fn local_timestamp(naive: &NaiveDateTime) -> ProviderResult<i64> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| {
            ProviderError::invalid_response(format!("{} does not exist in local time", naive))
        })
}
