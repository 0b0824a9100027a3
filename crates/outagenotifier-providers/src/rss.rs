//! Normalization of the RSS feed.
//!
//! RSS items carry only a title, a link and an HTML description. Dates are
//! recovered from the description with [`DateRangeParser`]; the feed has no
//! modification time, so `mod_time` is always [`NO_TIME`].

use outagenotifier_core::{DateRangeParser, NO_TIME, OutageRecord};
use quick_xml::events::Event;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::resolved::ResolvedMarker;

/// The fields of one `<item>` as found in the feed.
#[derive(Debug, Default)]
struct RawItem {
    title: String,
    link: String,
    description: String,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
}

/// Parses RSS content into outage records, in feed order.
///
/// # Errors
///
/// Fails on malformed XML, on the first description whose date range cannot
/// be parsed and on the first record that violates the record invariants.
pub fn parse_rss(
    xml: &str,
    marker: &ResolvedMarker,
    dates: &DateRangeParser,
) -> ProviderResult<Vec<OutageRecord>> {
    let records = read_items(xml)?
        .into_iter()
        .map(|item| to_record(item, marker, dates))
        .collect::<ProviderResult<Vec<_>>>()?;

    debug!(count = records.len(), "Parsed outages from RSS");
    Ok(records)
}

fn to_record(
    item: RawItem,
    marker: &ResolvedMarker,
    dates: &DateRangeParser,
) -> ProviderResult<OutageRecord> {
    let range = dates.parse(&item.description).map_err(|e| {
        ProviderError::from(e).with_feed(format!("rss item '{}'", item.title))
    })?;
    let resolved = marker.is_resolved(&item.description);

    debug!(
        title = %item.title,
        start_time = range.start_time,
        end_time = range.end_time,
        link = %item.link,
        resolved,
        "Parsed RSS item"
    );

    Ok(OutageRecord::new(
        &item.title,
        range.start_time,
        range.end_time,
        item.link,
        NO_TIME,
        resolved,
    )?)
}

fn read_items(xml: &str) -> ProviderResult<Vec<RawItem>> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<RawItem> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            // Prefixed names such as `media:title` belong to extensions.
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => current = Some(RawItem::default()),
                b"title" => field = Some(Field::Title),
                b"link" => field = Some(Field::Link),
                b"description" => field = Some(Field::Description),
                _ => field = None,
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item"
                    && let Some(item) = current.take()
                {
                    items.push(item);
                }
                field = None;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    ProviderError::invalid_response("Invalid escape in RSS text").with_source(err)
                })?;
                append(&mut current, field, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).to_string();
                append(&mut current, field, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ProviderError::invalid_response(format!(
                    "Malformed RSS near byte {}",
                    reader.buffer_position()
                ))
                .with_source(e));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

/// Adds text to the open field of the open item. Channel-level fields are
/// ignored.
fn append(item: &mut Option<RawItem>, field: Option<Field>, text: &str) {
    let (Some(item), Some(field)) = (item.as_mut(), field) else {
        return;
    };
    let target = match field {
        Field::Title => &mut item.title,
        Field::Link => &mut item.link,
        Field::Description => &mut item.description,
    };
    target.push_str(text);
}
