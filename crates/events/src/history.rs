//! Bounded in-memory log of recent pipeline events.
//!
//! [`EventHistory::run`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and appends every received [`PipelineEvent`] to a ring buffer. It runs as
//! a long-lived background task and stops when the bus sender is dropped.
//! Nothing is written to disk; the log lives as long as the process.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::bus::PipelineEvent;

/// Default number of events retained.
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug)]
pub struct EventHistory {
    limit: usize,
    events: RwLock<VecDeque<PipelineEvent>>,
}

impl EventHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            events: RwLock::new(VecDeque::new()),
        }
    }

    /// Run the recording loop until the channel closes.
    pub async fn run(history: Arc<Self>, mut receiver: broadcast::Receiver<PipelineEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => history.record(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event history lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, history recorder shutting down");
                    break;
                }
            }
        }
    }

    pub async fn record(&self, event: PipelineEvent) {
        let mut events = self.events.write().await;
        if events.len() == self.limit {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Most recent events, oldest first, at most `limit` of them.
    pub async fn recent(&self, limit: usize) -> Vec<PipelineEvent> {
        let events = self.events.read().await;
        let skip = events.len().saturating_sub(limit);
        events.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
