use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("feed parsing error: {0}")]
    Parse(#[from] rss::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store value could not be (de)serialized: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("no item stored for {0}")]
    UnknownItem(String),
    #[error("retention must be at least one day")]
    InvalidRetention,
}

#[derive(Debug, Error)]
pub enum SourceListError {
    #[error("source list i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("source list is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("listing sources failed: {0}")]
    SourceList(#[from] SourceListError),
    #[error("persisting items failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("config i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
