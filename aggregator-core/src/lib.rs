pub mod batch;
pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod gate;
pub mod items;
pub mod notify;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod throttle;

pub use batch::{fetch_all, BatchOutcome, SourceFailure};
pub use config::{AggregatorConfig, ScheduleConfig};
pub use data::ItemsApi;
pub use error::{ConfigError, CycleError, FetchError, SchedulerError, SourceListError, StoreError};
pub use feed::{parse_feed, FeedDescriptor, FetchedEntry, ParsedFeed};
pub use fetcher::{Fetcher, HttpFetcher};
pub use gate::{PersistOutcome, PersistenceGate};
pub use items::{merge_new_items, retention_cutoff, sweep_expired, ItemMap, ItemRecord};
pub use notify::{ChannelNotifier, Event, LogNotifier, Notifier};
pub use scheduler::{
    spawn_scheduler, CycleReport, CycleScheduler, CycleState, SchedulerContext, SchedulerHandle,
};
pub use sources::{FeedListFile, SourceLister, StaticSources};
pub use store::{JsonFileStore, MemoryStore, Store, ITEMS_KEY, RETENTION_DAYS_KEY};
pub use throttle::RecheckThrottle;
