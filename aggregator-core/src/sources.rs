use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceListError;
use crate::feed::FeedDescriptor;
use crate::store::read_json_with_tmp_fallback;

/// Supplies the candidate feed URLs for a cycle. Duplicates are allowed.
#[async_trait]
pub trait SourceLister: Send + Sync {
    async fn list_sources(&self) -> Result<Vec<String>, SourceListError>;
}

#[async_trait]
impl<T: SourceLister + ?Sized> SourceLister for std::sync::Arc<T> {
    async fn list_sources(&self) -> Result<Vec<String>, SourceListError> {
        (**self).list_sources().await
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticSources(pub Vec<String>);

#[async_trait]
impl SourceLister for StaticSources {
    async fn list_sources(&self) -> Result<Vec<String>, SourceListError> {
        Ok(self.0.clone())
    }
}

/// Re-reads a feeds.json file on every call, so edits are picked up on the next tick.
#[derive(Debug, Clone)]
pub struct FeedListFile {
    path: PathBuf,
}

impl FeedListFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// A missing file lists no feeds; an unreadable or corrupted one is an error.
    pub async fn feeds(&self) -> Result<Vec<FeedDescriptor>, SourceListError> {
        let feeds =
            read_json_with_tmp_fallback::<Vec<FeedDescriptor>, SourceListError>(&self.path)
                .await?;
        Ok(feeds.unwrap_or_default())
    }
}

#[async_trait]
impl SourceLister for FeedListFile {
    async fn list_sources(&self) -> Result<Vec<String>, SourceListError> {
        let feeds = self.feeds().await?;
        Ok(feeds.into_iter().map(|feed| feed.url).collect())
    }
}
