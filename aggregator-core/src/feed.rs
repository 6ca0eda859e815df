use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FetchError;

/// A subscribed feed as listed in feeds.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FeedDescriptor {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub url: String,
}

/// One entry of a fetched feed. Lives for a single cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchedEntry {
    pub link: String,
    pub title: String,
    pub description: String,
    pub pub_date: Option<String>,
    pub iso_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeed {
    pub entries: Vec<FetchedEntry>,
}

impl FetchedEntry {
    pub fn from_rss_item(item: &rss::Item) -> Self {
        let iso_date = item
            .dublin_core_ext()
            .and_then(|dc| dc.dates().first().cloned());

        Self {
            link: item.link().unwrap_or_default().trim().to_owned(),
            title: item.title().unwrap_or_default().to_owned(),
            description: item.description().unwrap_or_default().to_owned(),
            pub_date: item.pub_date().map(ToOwned::to_owned),
            iso_date,
        }
    }

    pub fn from_atom_entry(entry: &atom_syndication::Entry) -> Self {
        let link = entry
            .links()
            .iter()
            .find(|link| link.rel() == "alternate")
            .or_else(|| entry.links().first())
            .map(|link| link.href().trim().to_owned())
            .unwrap_or_default();
        let published = entry.published().unwrap_or_else(|| entry.updated());

        Self {
            link,
            title: entry.title().value.clone(),
            description: entry
                .summary()
                .map(|text| text.value.clone())
                .unwrap_or_default(),
            pub_date: None,
            iso_date: Some(published.to_rfc3339()),
        }
    }

    /// Publish time of the entry in epoch milliseconds.
    ///
    /// The ISO field wins whenever it is present; the RFC-822 field is only
    /// consulted when it is missing. Either string may be in either format.
    pub fn timestamp_ms(&self) -> Option<i64> {
        let raw = self
            .iso_date
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .or(self.pub_date.as_deref())?;
        parse_timestamp(raw).map(|dt| dt.timestamp_millis())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a response body as RSS 2.0, falling back to Atom.
pub fn parse_feed(body: Bytes) -> Result<ParsedFeed, FetchError> {
    let rss_err = match rss::Channel::read_from(&body[..]) {
        Ok(channel) => {
            let entries = channel
                .items()
                .iter()
                .map(FetchedEntry::from_rss_item)
                .collect();
            return Ok(ParsedFeed { entries });
        }
        Err(err) => err,
    };

    match atom_syndication::Feed::read_from(&body[..]) {
        Ok(feed) => Ok(ParsedFeed {
            entries: feed
                .entries()
                .iter()
                .map(FetchedEntry::from_atom_entry)
                .collect(),
        }),
        Err(atom_err) => {
            debug!(error = %atom_err, "body is not an atom feed either");
            Err(FetchError::Parse(rss_err))
        }
    }
}
