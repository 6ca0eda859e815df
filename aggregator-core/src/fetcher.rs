use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::feed::{parse_feed, ParsedFeed};

/// Fetches and parses one source. Calls share no state.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, source: &str) -> Result<ParsedFeed, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, source: &str) -> Result<ParsedFeed, FetchError> {
        (**self).fetch(source).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    request_timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, request_timeout: Duration) -> Self {
        Self {
            client,
            request_timeout,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> Result<ParsedFeed, FetchError> {
        let url = Url::parse(source)?;
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        debug!(source, bytes = body.len(), "feed downloaded");
        parse_feed(body)
    }
}
