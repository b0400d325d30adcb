//! Vectorflow event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PipelineEvent`]: envelope for every committed editor change.
//! - [`EventHistory`]: bounded in-memory log of recent events, fed by a
//!   background subscriber.

pub mod bus;
pub mod history;

pub use bus::{EventBus, PipelineEvent};
pub use history::EventHistory;
