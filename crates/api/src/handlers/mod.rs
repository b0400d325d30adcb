pub mod definition;
pub mod drag;
pub mod events;
pub mod pipeline;

use serde::Serialize;
use vectorflow_core::session::{SessionChange, SessionSnapshot};
use vectorflow_core::types::ProcessorId;

use crate::error::{AppError, AppResult};

/// Session snapshot tagged with the revision it reflects.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub revision: u64,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

/// Result of a committed mutation: what changed and the state afterwards.
#[derive(Debug, Serialize)]
pub struct ChangeResponse<T: Serialize = ()> {
    pub change: SessionChange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<T>,
    #[serde(flatten)]
    pub view: SessionView,
}

/// Parse a `p{n}` path segment.
pub(crate) fn parse_processor_id(raw: &str) -> AppResult<ProcessorId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid processor id '{raw}'")))
}
