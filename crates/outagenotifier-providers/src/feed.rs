//! Supported feed formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two shapes the outage calendar is published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    /// iCalendar export with structured `DTSTART`/`DTEND` fields.
    #[default]
    Ical,
    /// RSS whose item descriptions carry the dates as HTML text.
    Rss,
}

impl FeedFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ical => "ical",
            Self::Rss => "rss",
        }
    }

    /// File name of the raw feed cache inside the working directory.
    pub fn cache_file_name(&self) -> &'static str {
        match self {
            Self::Ical => "OutagesCache.ics",
            Self::Rss => "OutagesCache.xml",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ical" | "ics" => Ok(Self::Ical),
            "rss" | "xml" => Ok(Self::Rss),
            other => Err(format!("unknown feed format '{other}', expected ical or rss")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("ICS".parse::<FeedFormat>(), Ok(FeedFormat::Ical));
        assert_eq!("rss".parse::<FeedFormat>(), Ok(FeedFormat::Rss));
        assert!("atom".parse::<FeedFormat>().is_err());
    }

    #[test]
    fn cache_file_names() {
        assert_eq!(FeedFormat::Ical.cache_file_name(), "OutagesCache.ics");
        assert_eq!(FeedFormat::Rss.cache_file_name(), "OutagesCache.xml");
    }
}
