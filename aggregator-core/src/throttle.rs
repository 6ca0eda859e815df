use std::collections::HashMap;
use std::time::Duration;

/// Remembers when each source was last scheduled and keeps it out of the
/// next batches until `interval` has elapsed.
#[derive(Debug, Clone)]
pub struct RecheckThrottle {
    interval_ms: i64,
    last_checked: HashMap<String, i64>,
}

impl RecheckThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_checked: HashMap::new(),
        }
    }

    /// Returns the due subset of `candidates` and stamps each of them with `now_ms`.
    pub fn due<I>(&mut self, candidates: I, now_ms: i64) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut due = Vec::new();
        for source in candidates {
            let is_due = match self.last_checked.get(&source) {
                None => true,
                Some(&last) => now_ms.saturating_sub(last) > self.interval_ms,
            };
            if is_due {
                self.last_checked.insert(source.clone(), now_ms);
                due.push(source);
            }
        }
        due
    }

    pub fn last_checked(&self, source: &str) -> Option<i64> {
        self.last_checked.get(source).copied()
    }

    pub fn len(&self) -> usize {
        self.last_checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_checked.is_empty()
    }
}
