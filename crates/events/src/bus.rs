//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans out one [`PipelineEvent`] per committed editor change.
//! It is designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vectorflow_core::session::SessionChange;
use vectorflow_core::types::ProcessorId;

// ---------------------------------------------------------------------------
// PipelineEvent
// ---------------------------------------------------------------------------

/// A change that was committed to the editing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Dot-separated event name, e.g. `"processor.added"`.
    pub event_type: String,

    /// Processor the change concerns, if any.
    pub processor_id: Option<ProcessorId>,

    /// Session revision after the change was applied.
    pub revision: u64,

    /// Change-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PipelineEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            processor_id: None,
            revision: 0,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Build the event describing a committed [`SessionChange`].
    pub fn from_change(change: &SessionChange, revision: u64) -> Self {
        let processor_id = match change {
            SessionChange::ProcessorAdded { processor_id, .. }
            | SessionChange::ProcessorRemoved { processor_id }
            | SessionChange::ProcessorUpdated { processor_id, .. }
            | SessionChange::EntryAdded { processor_id, .. }
            | SessionChange::EntryRemoved { processor_id, .. }
            | SessionChange::EntryUpdated { processor_id, .. } => Some(*processor_id),
            SessionChange::Reordered { .. }
            | SessionChange::SettingsUpdated
            | SessionChange::DragStateChanged { .. } => None,
        };
        let payload = serde_json::to_value(change).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to encode change payload");
            serde_json::Value::Null
        });

        let event = Self::new(change.event_type())
            .with_revision(revision)
            .with_payload(payload);
        match processor_id {
            Some(id) => event.with_processor(id),
            None => event,
        }
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn with_processor(mut self, processor_id: ProcessorId) -> Self {
        self.processor_id = Some(processor_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// # Usage
///
/// ```rust
/// use vectorflow_events::bus::{EventBus, PipelineEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PipelineEvent::new("processor.added"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no active subscribers the event is silently dropped.
    pub fn publish(&self, event: PipelineEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
