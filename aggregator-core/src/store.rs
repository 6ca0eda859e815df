use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::items::ItemMap;

/// Key of the whole item map.
pub const ITEMS_KEY: &str = "aggregated-rss";
/// Key of the retention window, in days.
pub const RETENTION_DAYS_KEY: &str = "retention-days";
pub const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Whole-value async key-value store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }
}

pub async fn load_items<S: Store + ?Sized>(store: &S) -> Result<ItemMap, StoreError> {
    match store.get(ITEMS_KEY).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(ItemMap::new()),
    }
}

pub async fn save_items<S: Store + ?Sized>(store: &S, items: &ItemMap) -> Result<(), StoreError> {
    store.set(ITEMS_KEY, serde_json::to_value(items)?).await
}

/// Reads the retention window, falling back to the default for absent or unusable values.
pub async fn load_retention_days<S: Store + ?Sized>(store: &S) -> Result<u32, StoreError> {
    let days = match store.get(RETENTION_DAYS_KEY).await? {
        None => DEFAULT_RETENTION_DAYS,
        Some(value) => match value.as_u64().and_then(|days| u32::try_from(days).ok()) {
            Some(days) if days > 0 => days,
            _ => {
                warn!(%value, "ignoring invalid retention setting");
                DEFAULT_RETENTION_DAYS
            }
        },
    };
    Ok(days)
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.write().await.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Stores every key as `<dir>/<key>.json`, written atomically through a temp file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path_for(key);
        read_json_with_tmp_fallback(&path).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec_pretty(&value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(key, bytes = bytes.len(), "store value written");
        Ok(())
    }
}

/// Reads JSON from `path`; a corrupted file is replaced by its `.json.tmp` sibling if that parses.
///
/// Only a missing file reads as `None`. Any other i/o error, or a corrupted
/// file without a usable tmp copy, is an error so that callers never rewrite
/// the file from an empty default.
pub(crate) async fn read_json_with_tmp_fallback<T, E>(path: &Path) -> Result<Option<T>, E>
where
    T: serde::de::DeserializeOwned,
    E: From<std::io::Error> + From<serde_json::Error>,
{
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(error = %err, path = %path.display(), "failed to parse JSON, trying tmp fallback");
            let tmp = path.with_extension("json.tmp");
            match tokio::fs::read(&tmp).await {
                Ok(tmp_bytes) => serde_json::from_slice::<T>(&tmp_bytes)
                    .map(Some)
                    .map_err(|_| err.into()),
                Err(_) => Err(err.into()),
            }
        }
    }
}
