//! Vectorflow pipeline editor domain logic.
//!
//! Pure, synchronous state model for editing an ingestion pipeline: the
//! ordered processor list, per-processor entry lists, the drag-to-reorder
//! gesture and the serialized definition. No I/O happens in this crate.

pub mod access;
pub mod definition;
pub mod document;
pub mod drag;
pub mod entry;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod session;
pub mod sink;
pub mod source;
pub mod types;
pub mod validation;
