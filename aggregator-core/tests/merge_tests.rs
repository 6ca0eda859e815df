use std::collections::HashMap;

use aggregator_core::items::DAY_MS;
use aggregator_core::{
    merge_new_items, retention_cutoff, sweep_expired, FetchedEntry, ItemMap, ItemRecord,
    ParsedFeed,
};
use chrono::DateTime;

const NOW: i64 = 1_700_000_000_000;
const FEED: &str = "https://x/feed.xml";

fn iso(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms).unwrap().to_rfc3339()
}

fn entry(link: &str, iso_date: Option<String>, pub_date: Option<&str>) -> FetchedEntry {
    FetchedEntry {
        link: link.into(),
        title: format!("title of {link}"),
        description: "desc".into(),
        pub_date: pub_date.map(Into::into),
        iso_date,
    }
}

fn batch(entries: Vec<FetchedEntry>) -> HashMap<String, ParsedFeed> {
    HashMap::from([(FEED.to_string(), ParsedFeed { entries })])
}

fn record(url: &str, datetime: i64, starred: bool) -> ItemRecord {
    ItemRecord {
        title: "old".into(),
        url: url.into(),
        description: "old desc".into(),
        datetime,
        feed_url: FEED.into(),
        read: false,
        starred,
    }
}

fn cutoff() -> i64 {
    retention_cutoff(NOW, 7)
}

#[test]
fn new_entry_becomes_unread_unstarred_record() {
    let mut items = ItemMap::new();
    let added = merge_new_items(
        &mut items,
        &batch(vec![entry("https://x/1", Some(iso(NOW)), None)]),
        cutoff(),
    );

    assert_eq!(added, 1);
    assert_eq!(items.len(), 1);
    let rec = &items["https://x/1"];
    assert_eq!(rec.url, "https://x/1");
    assert_eq!(rec.feed_url, FEED);
    assert_eq!(rec.datetime, NOW);
    assert!(!rec.read);
    assert!(!rec.starred);
}

#[test]
fn known_link_is_not_overwritten() {
    let mut items = ItemMap::new();
    let mut existing = record("https://x/1", NOW - DAY_MS, false);
    existing.read = true;
    items.insert(existing.url.clone(), existing.clone());

    let added = merge_new_items(
        &mut items,
        &batch(vec![entry("https://x/1", Some(iso(NOW)), None)]),
        cutoff(),
    );

    assert_eq!(added, 0);
    assert_eq!(items.len(), 1);
    assert_eq!(items["https://x/1"], existing);
}

#[test]
fn merging_the_same_batch_twice_is_idempotent() {
    let fetched = batch(vec![
        entry("https://x/1", Some(iso(NOW - 1000)), None),
        entry("https://x/2", None, Some("Tue, 14 Nov 2023 22:00:00 GMT")),
    ]);
    let mut items = ItemMap::new();
    merge_new_items(&mut items, &fetched, cutoff());
    let first = items.clone();

    let added = merge_new_items(&mut items, &fetched, cutoff());
    assert_eq!(added, 0);
    assert_eq!(items, first);
}

#[test]
fn existing_records_keep_their_fields_across_merges() {
    let mut items = ItemMap::new();
    let mut kept = record("https://x/keep", NOW - 2 * DAY_MS, true);
    kept.read = true;
    items.insert(kept.url.clone(), kept.clone());

    let mut changed = entry("https://x/keep", Some(iso(NOW)), None);
    changed.title = "a brand new title".into();
    changed.description = "rewritten".into();
    merge_new_items(
        &mut items,
        &batch(vec![changed, entry("https://x/other", Some(iso(NOW)), None)]),
        cutoff(),
    );

    assert_eq!(items.len(), 2);
    assert_eq!(items["https://x/keep"], kept);
}

#[test]
fn unparsable_date_drops_entry() {
    let mut items = ItemMap::new();
    let added = merge_new_items(
        &mut items,
        &batch(vec![entry("https://x/bad", None, Some("sometime last week"))]),
        cutoff(),
    );
    assert_eq!(added, 0);
    assert!(items.is_empty());
}

#[test]
fn entry_without_any_date_is_dropped() {
    let mut items = ItemMap::new();
    let added = merge_new_items(
        &mut items,
        &batch(vec![entry("https://x/none", None, None)]),
        cutoff(),
    );
    assert_eq!(added, 0);
    assert!(items.is_empty());
}

#[test]
fn iso_date_takes_precedence_over_pub_date() {
    let mut items = ItemMap::new();
    merge_new_items(
        &mut items,
        &batch(vec![entry(
            "https://x/1",
            Some(iso(NOW - 5000)),
            Some("Mon, 01 Jan 2001 00:00:00 GMT"),
        )]),
        cutoff(),
    );
    assert_eq!(items["https://x/1"].datetime, NOW - 5000);
}

#[test]
fn blank_iso_date_falls_back_to_pub_date() {
    let mut items = ItemMap::new();
    merge_new_items(
        &mut items,
        &batch(vec![entry(
            "https://x/1",
            Some("  ".into()),
            Some("Tue, 14 Nov 2023 22:00:00 GMT"),
        )]),
        cutoff(),
    );
    let expected = DateTime::parse_from_rfc2822("Tue, 14 Nov 2023 22:00:00 GMT")
        .unwrap()
        .timestamp_millis();
    assert_eq!(items["https://x/1"].datetime, expected);
}

#[test]
fn entries_at_or_before_cutoff_are_dropped() {
    let cutoff = cutoff();
    let mut items = ItemMap::new();
    let added = merge_new_items(
        &mut items,
        &batch(vec![
            entry("https://x/at", Some(iso(cutoff)), None),
            entry("https://x/before", Some(iso(cutoff - 1)), None),
            entry("https://x/after", Some(iso(cutoff + 1)), None),
        ]),
        cutoff,
    );
    assert_eq!(added, 1);
    assert!(items.contains_key("https://x/after"));
}

#[test]
fn entries_without_link_are_dropped() {
    let mut items = ItemMap::new();
    let added = merge_new_items(
        &mut items,
        &batch(vec![entry("", Some(iso(NOW)), None)]),
        cutoff(),
    );
    assert_eq!(added, 0);
    assert!(items.is_empty());
}

#[test]
fn sweep_removes_old_unstarred_and_keeps_starred() {
    let mut items = ItemMap::new();
    items.insert("https://x/old".into(), record("https://x/old", NOW - 10 * DAY_MS, false));
    items.insert("https://x/star".into(), record("https://x/star", NOW - 10 * DAY_MS, true));
    items.insert("https://x/fresh".into(), record("https://x/fresh", NOW - DAY_MS, false));

    let removed = sweep_expired(&mut items, cutoff());

    assert_eq!(removed, 1);
    assert!(!items.contains_key("https://x/old"));
    assert!(items.contains_key("https://x/star"));
    assert!(items.contains_key("https://x/fresh"));
}

#[test]
fn sweep_leaves_only_starred_or_recent_records() {
    let cutoff = cutoff();
    let mut items = ItemMap::new();
    for (i, offset) in [-3 * DAY_MS, -1, 0, 1, DAY_MS, 5 * DAY_MS].iter().enumerate() {
        for starred in [false, true] {
            let url = format!("https://x/{i}/{starred}");
            items.insert(url.clone(), record(&url, cutoff + offset, starred));
        }
    }

    sweep_expired(&mut items, cutoff);

    assert!(items
        .values()
        .all(|record| record.starred || record.datetime > cutoff));
    assert_eq!(items.values().filter(|record| record.starred).count(), 6);
}

#[test]
fn record_json_uses_camel_case_and_defaults_flags() {
    let json = serde_json::json!({
        "title": "t",
        "url": "https://x/1",
        "description": "d",
        "datetime": NOW,
        "feedUrl": FEED
    });
    let rec: ItemRecord = serde_json::from_value(json).unwrap();
    assert!(!rec.read && !rec.starred);
    assert_eq!(rec.feed_url, FEED);

    let back = serde_json::to_value(&rec).unwrap();
    assert_eq!(back["feedUrl"], FEED);
    assert_eq!(back["starred"], false);
}
