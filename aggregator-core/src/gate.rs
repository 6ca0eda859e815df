use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::feed::ParsedFeed;
use crate::items::{merge_new_items, retention_cutoff, sweep_expired};
use crate::notify::{Event, Notifier};
use crate::store::{load_items, load_retention_days, save_items, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Another write was still in flight; nothing was read or written.
    Skipped,
    Written {
        swept: usize,
        added: usize,
        total: usize,
    },
}

/// Single-flight guard around the read-modify-write of the item map.
///
/// Clones share the same flag. A caller that finds the flag taken skips
/// instead of waiting.
#[derive(Debug, Clone, Default)]
pub struct PersistenceGate {
    in_flight: Arc<AtomicBool>,
}

/// Holds the flag; dropping it releases the flag exactly once.
#[derive(Debug)]
pub struct WriteGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

impl PersistenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Option<WriteGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| WriteGuard {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Sweeps expired items, merges `successes` and writes the map back,
    /// then reports the number of added items through `notifier`.
    pub async fn persist<S, N>(
        &self,
        store: &S,
        notifier: &N,
        successes: &HashMap<String, ParsedFeed>,
        now_ms: i64,
    ) -> Result<PersistOutcome, StoreError>
    where
        S: Store + ?Sized,
        N: Notifier + ?Sized,
    {
        let Some(guard) = self.try_begin() else {
            info!("previous write still in flight, skipping this save");
            return Ok(PersistOutcome::Skipped);
        };

        let retention_days = load_retention_days(store).await?;
        let mut items = load_items(store).await?;
        let cutoff = retention_cutoff(now_ms, retention_days);

        let swept = sweep_expired(&mut items, cutoff);
        let before = items.len();
        merge_new_items(&mut items, successes, cutoff);
        let after = items.len();

        save_items(store, &items).await?;
        drop(guard);

        let added = after.saturating_sub(before);
        debug!(swept, added, total = after, retention_days, "item map saved");
        if added > 0 {
            notifier.notify(&Event::NewItems { count: added });
        }

        Ok(PersistOutcome::Written {
            swept,
            added,
            total: after,
        })
    }
}
