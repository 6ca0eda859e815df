use std::collections::{HashMap, HashSet};

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::feed::ParsedFeed;
use crate::fetcher::Fetcher;

#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: FetchError,
}

/// Settled result of one batch: every requested source lands in exactly one half.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: HashMap<String, ParsedFeed>,
    pub failures: Vec<SourceFailure>,
}

impl BatchOutcome {
    pub fn entry_count(&self) -> usize {
        self.successes.values().map(|feed| feed.entries.len()).sum()
    }
}

/// Fetches every distinct source concurrently and waits for all of them to settle.
pub async fn fetch_all<F, I>(fetcher: &F, sources: I) -> BatchOutcome
where
    F: Fetcher + ?Sized,
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let sources: Vec<String> = sources
        .into_iter()
        .filter(|source| seen.insert(source.clone()))
        .collect();

    let mut outcome = BatchOutcome::default();
    if sources.is_empty() {
        return outcome;
    }

    let results = join_all(sources.into_iter().map(|source| async move {
        let result = fetcher.fetch(&source).await;
        (source, result)
    }))
    .await;

    for (source, result) in results {
        match result {
            Ok(feed) => {
                debug!(source = %source, entries = feed.entries.len(), "fetched feed");
                outcome.successes.insert(source, feed);
            }
            Err(error) => {
                warn!(source = %source, error = %error, "failed to fetch feed");
                outcome.failures.push(SourceFailure { source, error });
            }
        }
    }
    outcome
}
