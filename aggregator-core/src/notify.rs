use std::fmt;

use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    NewItems { count: usize },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::NewItems { count: 1 } => f.write_str("1 new item"),
            Event::NewItems { count } => write!(f, "{count} new items"),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: &Event);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, event: &Event) {
        (**self).notify(event)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: &Event) {
        info!(%event, "feed aggregator");
    }
}

/// Forwards events to a frontend without ever blocking the cycle.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Event>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: &Event) {
        if let Err(err) = self.tx.try_send(event.clone()) {
            warn!(error = %err, "dropping notification");
        }
    }
}
