//! Recovery of outage start/end times from free-text HTML date ranges.
//!
//! Syndication entries carry no structured dates. Their description starts
//! with a block like `Mar 24 8:35am to Mar 25 9:35pm`, written in one of
//! five shorthand forms:
//!
//! ```text
//! Mar 24 8:35am  Mar 25 9:35pm    date time date time   -> as-is
//! Mar 28 3:00pm  5:00pm           date time time        -> end shares start date
//! Mar 29  Mar 30                  date date             -> 00:00 .. 23:59
//! Mar 26 10:10pm                  date time             -> start only, no end
//! Mar 27                          date                  -> 00:00 .. 23:59
//! ```
//!
//! A 4-digit year may follow any date; when it is absent the parser's year
//! (the current one by default) is used. All times are local wall-clock.

use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::record::NO_TIME;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static DATE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*\bclass\s*=\s*["'][^"']*even[^"']*["'][^>]*>(.*?)</div>"#)
        .expect("Invalid date block regex")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("Invalid tag regex"));

static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(3[01]|[12][0-9]|0?[1-9])\b",
        r"|\b(\d{4})\b",
        r"|\b(\d{1,2}):([0-5][0-9])\s?([aApP][mM])\b",
    ))
    .expect("Invalid date token regex")
});

/// Start and end of an outage as unix timestamps.
///
/// `end_time` is [`NO_TIME`] when the text names no end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start_time: i64,
    pub end_time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Date {
        month: u32,
        day: u32,
        year: Option<i32>,
    },
    Time {
        hour: u32,
        minute: u32,
    },
}

impl Token {
    fn is_date(&self) -> bool {
        matches!(self, Token::Date { .. })
    }
}

const MIDNIGHT: Token = Token::Time { hour: 0, minute: 0 };
const END_OF_DAY: Token = Token::Time {
    hour: 23,
    minute: 59,
};

/// Parses the date-range block of a syndication entry description.
#[derive(Debug, Clone, Copy)]
pub struct DateRangeParser {
    year: i32,
}

impl Default for DateRangeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DateRangeParser {
    /// Creates a parser that fills missing years with the current local year.
    pub fn new() -> Self {
        Self {
            year: Local::now().year(),
        }
    }

    /// Creates a parser that fills missing years with `year`.
    pub fn with_year(year: i32) -> Self {
        Self { year }
    }

    /// Parses an HTML description fragment into a [`DateRange`].
    ///
    /// # Errors
    ///
    /// Returns a parse error ([`CoreError::is_parse`]) when the token
    /// sequence has an unknown shape or names an impossible local time.
    pub fn parse(&self, html: &str) -> CoreResult<DateRange> {
        let region = date_region(html);
        let tokens = tokenize(&region)?;
        debug!(raw = ?tokens, "Date range tokens");

        let (start, end) = normalize(&tokens)?;
        let start_time = self.timestamp(start.0, start.1)?;
        let end_time = match end {
            Some((date, time)) => self.timestamp(date, time)?,
            None => NO_TIME,
        };

        debug!(start_time, end_time, "Parsed date range");
        Ok(DateRange {
            start_time,
            end_time,
        })
    }

    fn timestamp(&self, date: Token, time: Token) -> CoreResult<i64> {
        let (Token::Date { month, day, year }, Token::Time { hour, minute }) = (date, time) else {
            return Err(CoreError::InvalidDate(format!("{date:?} {time:?}")));
        };
        let year = year.unwrap_or(self.year);

        let day_value = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            CoreError::InvalidDate(format!("{} {day} {year}", MONTHS[month as usize - 1]))
        })?;
        let time_value = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| CoreError::InvalidDate(format!("{hour:02}:{minute:02}")))?;
        let naive = NaiveDateTime::new(day_value, time_value);

        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| CoreError::InvalidDate(format!("{naive} does not exist locally")))
    }
}

/// Returns the text of the first `<div>` whose class mentions `even`, with
/// markup stripped. Falls back to the whole fragment.
fn date_region(html: &str) -> String {
    let block = DATE_BLOCK
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map_or(html, |m| m.as_str());
    TAG.replace_all(block, " ")
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
}

fn tokenize(text: &str) -> CoreResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();

    for (position, caps) in DATE_TOKEN.captures_iter(text).enumerate() {
        if let (Some(month), Some(day)) = (caps.get(1), caps.get(2)) {
            tokens.push(Token::Date {
                month: month_number(month.as_str()),
                day: parse_number(day.as_str(), position)?,
                year: None,
            });
        } else if let Some(year) = caps.get(3) {
            let value: i32 = parse_number(year.as_str(), position)?;
            match tokens.last_mut() {
                Some(Token::Date { year: slot @ None, .. }) => *slot = Some(value),
                _ => {
                    return Err(CoreError::InvalidToken {
                        token: year.as_str().to_string(),
                        position,
                    });
                }
            }
        } else if let (Some(hour), Some(minute), Some(period)) =
            (caps.get(4), caps.get(5), caps.get(6))
        {
            let raw: u32 = parse_number(hour.as_str(), position)?;
            if !(1..=12).contains(&raw) {
                return Err(CoreError::InvalidToken {
                    token: caps[0].to_string(),
                    position,
                });
            }
            let pm = period.as_str().eq_ignore_ascii_case("pm");
            tokens.push(Token::Time {
                hour: to_24_hour(raw, pm),
                minute: parse_number(minute.as_str(), position)?,
            });
        }
    }

    Ok(tokens)
}

/// A `(date, time)` pair.
type Endpoint = (Token, Token);

/// Pads a raw token sequence to a start endpoint plus an optional end.
fn normalize(tokens: &[Token]) -> CoreResult<(Endpoint, Option<Endpoint>)> {
    let expect = |index: usize, date: bool| -> CoreResult<Token> {
        let token = tokens[index];
        if token.is_date() == date {
            Ok(token)
        } else {
            Err(CoreError::InvalidToken {
                token: format!("{token:?}"),
                position: index,
            })
        }
    };

    match tokens.len() {
        4 => Ok((
            (expect(0, true)?, expect(1, false)?),
            Some((expect(2, true)?, expect(3, false)?)),
        )),
        3 => {
            let date = expect(0, true)?;
            Ok(((date, expect(1, false)?), Some((date, expect(2, false)?))))
        }
        2 => {
            let date = expect(0, true)?;
            if tokens[1].is_date() {
                Ok(((date, MIDNIGHT), Some((tokens[1], END_OF_DAY))))
            } else {
                Ok(((date, tokens[1]), None))
            }
        }
        1 => {
            let date = expect(0, true)?;
            Ok(((date, MIDNIGHT), Some((date, END_OF_DAY))))
        }
        count => Err(CoreError::UnexpectedTokenCount { count }),
    }
}

fn month_number(name: &str) -> u32 {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map_or(1, |index| index as u32 + 1)
}

fn parse_number<T: std::str::FromStr>(raw: &str, position: usize) -> CoreResult<T> {
    raw.parse().map_err(|_| CoreError::InvalidToken {
        token: raw.to_string(),
        position,
    })
}

fn to_24_hour(hour: u32, pm: bool) -> u32 {
    match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    }
}
