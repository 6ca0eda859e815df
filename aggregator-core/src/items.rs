//! Persisted item records, retention sweeping and merging of fetched entries.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::feed::{FetchedEntry, ParsedFeed};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Item map keyed by link URL.
pub type ItemMap = HashMap<String, ItemRecord>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub title: String,
    pub url: String,
    pub description: String,
    /// Publish time in epoch milliseconds, fixed when the record is created.
    pub datetime: i64,
    pub feed_url: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub starred: bool,
}

impl ItemRecord {
    fn from_entry(entry: &FetchedEntry, feed_url: &str, datetime: i64) -> Self {
        Self {
            title: entry.title.clone(),
            url: entry.link.clone(),
            description: entry.description.clone(),
            datetime,
            feed_url: feed_url.to_owned(),
            read: false,
            starred: false,
        }
    }
}

/// Instant at or before which unstarred items are dropped.
pub fn retention_cutoff(now_ms: i64, retention_days: u32) -> i64 {
    now_ms - i64::from(retention_days) * DAY_MS
}

/// Removes unstarred records dated at or before `cutoff_ms`. Returns how many went.
pub fn sweep_expired(items: &mut ItemMap, cutoff_ms: i64) -> usize {
    let before = items.len();
    items.retain(|_, record| record.starred || record.datetime > cutoff_ms);
    before - items.len()
}

/// Adds a record for every entry whose link is unknown and whose publish time
/// parses to an instant after `cutoff_ms`. Existing records are never touched.
/// Returns the number of records added.
pub fn merge_new_items(
    items: &mut ItemMap,
    successes: &HashMap<String, ParsedFeed>,
    cutoff_ms: i64,
) -> usize {
    let mut added = 0;
    for (feed_url, feed) in successes {
        for entry in &feed.entries {
            if entry.link.is_empty() {
                debug!(feed = %feed_url, title = %entry.title, "skipping entry without a link");
                continue;
            }
            let slot = match items.entry(entry.link.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => slot,
            };
            let Some(datetime) = entry.timestamp_ms() else {
                warn!(
                    feed = %feed_url,
                    link = %entry.link,
                    pub_date = ?entry.pub_date,
                    iso_date = ?entry.iso_date,
                    "could not parse publish time of entry"
                );
                continue;
            };
            if datetime <= cutoff_ms {
                trace!(link = %entry.link, "entry older than retention window");
                continue;
            }
            slot.insert(ItemRecord::from_entry(entry, feed_url, datetime));
            added += 1;
        }
    }
    added
}

/// Records sorted newest first.
pub fn newest_first(items: &ItemMap) -> Vec<ItemRecord> {
    let mut sorted: Vec<ItemRecord> = items.values().cloned().collect();
    sorted.sort_by(|a, b| b.datetime.cmp(&a.datetime).then_with(|| a.url.cmp(&b.url)));
    sorted
}
