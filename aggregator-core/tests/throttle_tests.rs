use std::time::Duration;

use aggregator_core::RecheckThrottle;

const INTERVAL_MS: i64 = 30 * 60 * 1000;
const T: i64 = 1_700_000_000_000;

fn throttle() -> RecheckThrottle {
    RecheckThrottle::new(Duration::from_millis(INTERVAL_MS as u64))
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn unseen_sources_are_due_and_stamped() {
    let mut throttle = throttle();
    let due = throttle.due(urls(&["a", "b"]), T);
    assert_eq!(due, urls(&["a", "b"]));
    assert_eq!(throttle.last_checked("a"), Some(T));
    assert_eq!(throttle.last_checked("b"), Some(T));
}

#[test]
fn source_is_held_back_until_interval_is_exceeded() {
    let mut throttle = throttle();
    throttle.due(urls(&["a"]), T);

    assert!(throttle.due(urls(&["a"]), T + INTERVAL_MS - 1).is_empty());
    assert!(throttle.due(urls(&["a"]), T + INTERVAL_MS).is_empty());
    assert_eq!(throttle.due(urls(&["a"]), T + INTERVAL_MS + 1), urls(&["a"]));
    assert_eq!(throttle.last_checked("a"), Some(T + INTERVAL_MS + 1));
}

#[test]
fn new_source_is_due_while_old_one_waits() {
    let mut throttle = throttle();
    throttle.due(urls(&["a"]), T);

    let due = throttle.due(urls(&["a", "b"]), T + 5_000);
    assert_eq!(due, urls(&["b"]));
}

#[test]
fn duplicate_candidates_are_returned_once() {
    let mut throttle = throttle();
    let due = throttle.due(urls(&["a", "a", "b", "a"]), T);
    assert_eq!(due, urls(&["a", "b"]));
    assert_eq!(throttle.len(), 2);
}

#[test]
fn held_back_source_keeps_its_original_stamp() {
    let mut throttle = throttle();
    throttle.due(urls(&["a"]), T);
    throttle.due(urls(&["a"]), T + 1_000);
    assert_eq!(throttle.last_checked("a"), Some(T));
}
