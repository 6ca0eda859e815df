use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;
use crate::items::{newest_first, ItemRecord};
use crate::store::{load_items, load_retention_days, save_items, Store, RETENTION_DAYS_KEY};

/// Read and toggle access to the persisted items, as used by a frontend.
///
/// Every mutation rewrites the whole item map under the same key the
/// aggregator uses, without taking the aggregator's persistence gate.
#[derive(Debug, Clone)]
pub struct ItemsApi<S> {
    store: S,
}

impl<S: Store> ItemsApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// All stored items, newest first.
    pub async fn list_items(&self) -> Result<Vec<ItemRecord>, StoreError> {
        let items = load_items(&self.store).await?;
        Ok(newest_first(&items))
    }

    pub async fn unread_count(&self) -> Result<usize, StoreError> {
        let items = load_items(&self.store).await?;
        Ok(items.values().filter(|record| !record.read).count())
    }

    /// Sets `read` to `value`, or flips it when `value` is `None`. Returns the new state.
    pub async fn toggle_read(&self, url: &str, value: Option<bool>) -> Result<bool, StoreError> {
        self.update(url, |record| {
            record.read = value.unwrap_or(!record.read);
            record.read
        })
        .await
    }

    /// Sets `starred` to `value`, or flips it when `value` is `None`. Returns the new state.
    pub async fn toggle_starred(&self, url: &str, value: Option<bool>) -> Result<bool, StoreError> {
        self.update(url, |record| {
            record.starred = value.unwrap_or(!record.starred);
            record.starred
        })
        .await
    }

    pub async fn retention_days(&self) -> Result<u32, StoreError> {
        load_retention_days(&self.store).await
    }

    pub async fn set_retention_days(&self, days: u32) -> Result<(), StoreError> {
        if days == 0 {
            return Err(StoreError::InvalidRetention);
        }
        self.store.set(RETENTION_DAYS_KEY, Value::from(days)).await
    }

    /// Read-modify-write of the whole item map, outside the persistence gate.
    ///
    /// A toggle that lands between an aggregation cycle's read and its write is
    /// overwritten by that cycle's save and is lost.
    async fn update(
        &self,
        url: &str,
        apply: impl FnOnce(&mut ItemRecord) -> bool,
    ) -> Result<bool, StoreError> {
        let mut items = load_items(&self.store).await?;
        let record = items
            .get_mut(url)
            .ok_or_else(|| StoreError::UnknownItem(url.to_owned()))?;
        let state = apply(record);
        save_items(&self.store, &items).await?;
        debug!(url, state, "item updated");
        Ok(state)
    }
}
