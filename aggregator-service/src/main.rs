use std::path::PathBuf;

use aggregator_core::{
    spawn_scheduler, AggregatorConfig, CycleScheduler, FeedListFile, HttpFetcher, JsonFileStore,
    LogNotifier,
};
use reqwest::{redirect, ClientBuilder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "aggregator stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let dir = app_dir();
    let config = AggregatorConfig::load(&dir.join("config.json"));

    let client = ClientBuilder::new()
        .redirect(redirect::Policy::limited(config.max_redirects))
        .user_agent(config.user_agent.clone())
        .build()?;
    let fetcher = HttpFetcher::new(client, config.request_timeout());
    let store = JsonFileStore::open(dir.join("store")).await?;
    let sources = FeedListFile::new(dir.join("feeds.json"));
    let schedule = config.schedule();

    info!(
        dir = %dir.display(),
        tick_secs = schedule.tick_interval.as_secs(),
        aggregate_secs = schedule.aggregate_interval.as_secs(),
        "starting feed aggregator"
    );

    let scheduler = CycleScheduler::new(sources, fetcher, store, LogNotifier, schedule);
    let handle = spawn_scheduler(scheduler);

    tokio::signal::ctrl_c().await?;
    info!("interrupt received, waiting for the current cycle");
    handle.stop().await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn app_dir() -> PathBuf {
    // Linux: ~/.config/rss-aggregator
    AggregatorConfig::app_dir().unwrap_or_else(|_| PathBuf::from(".rss-aggregator"))
}
