use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use vectorflow_core::session::{EditorSession, SessionChange};
use vectorflow_events::{EventBus, EventHistory, PipelineEvent};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The single editing session. The mutex admits one interaction at a time.
    pub session: Arc<Mutex<EditorSession>>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Fan-out of committed session changes.
    pub event_bus: Arc<EventBus>,
    /// Recent events, fed by a background subscriber.
    pub history: Arc<EventHistory>,
    /// Incremented once per published change.
    pub revision: Arc<AtomicU64>,
}

impl AppState {
    /// Fresh state with a new session built from `config`.
    pub fn new(config: ServerConfig, event_bus: Arc<EventBus>, history: Arc<EventHistory>) -> Self {
        let session = EditorSession::new(
            config.anchor_policy,
            config.pipeline_name.clone(),
            chrono::Utc::now(),
        );
        Self {
            session: Arc::new(Mutex::new(session)),
            config: Arc::new(config),
            event_bus,
            history,
            revision: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn current_revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Publish a committed change and return the new revision.
    pub fn publish(&self, change: &SessionChange) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        self.event_bus
            .publish(PipelineEvent::from_change(change, revision));
        tracing::debug!(
            event_type = change.event_type(),
            revision,
            subscribers = self.event_bus.subscriber_count(),
            "Session change published"
        );
        revision
    }
}
