//! The ordered processor list edited in one session.
//!
//! [`Pipeline`] owns its processors and enforces the list-level invariants:
//!
//! - at least one processor at all times;
//! - identifiers are unique and never reused after deletion;
//! - copy-values processors keep at least one entry;
//! - the [`AnchorPolicy`] decides whether the last ML inference stage may go.
//!
//! Every mutation builds the next sequence on the side and swaps it in as a
//! new `Arc`, so a [`Pipeline::snapshot`] taken earlier never changes and no
//! caller can observe a half-applied edit. A rejected call leaves the
//! pipeline untouched.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entry::{Entry, EntryUpdate};
use crate::error::CoreError;
use crate::processor::{
    CopyValuesConfig, MlInferenceUpdate, Processor, ProcessorKind, ProcessorKindTag,
    MAX_ENTRIES_PER_PROCESSOR, MIN_ENTRIES_PER_PROCESSOR,
};
use crate::types::ProcessorId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of processors in one pipeline.
pub const MAX_PROCESSORS: usize = 50;

/// Minimum number of processors in one pipeline.
pub const MIN_PROCESSORS: usize = 1;

// ---------------------------------------------------------------------------
// AnchorPolicy
// ---------------------------------------------------------------------------

/// Removal rule for ML inference processors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// At least one ML inference processor must remain.
    #[default]
    RequireMlInference,
    /// Only the non-empty rule applies.
    NonEmptyOnly,
}

impl AnchorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequireMlInference => "require_ml_inference",
            Self::NonEmptyOnly => "non_empty_only",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "require_ml_inference" => Ok(Self::RequireMlInference),
            "non_empty_only" => Ok(Self::NonEmptyOnly),
            _ => Err(CoreError::Validation(format!(
                "Invalid anchor policy: '{s}'. Must be one of: require_ml_inference, non_empty_only"
            ))),
        }
    }
}

impl std::fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pipeline {
    processors: Arc<Vec<Processor>>,
    next_id: u64,
    policy: AnchorPolicy,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AnchorPolicy::default())
    }
}

impl Pipeline {
    /// Start a pipeline holding a single default ML inference processor `p0`.
    pub fn new(policy: AnchorPolicy) -> Self {
        let first = Processor::new(
            ProcessorId::new(0),
            ProcessorKind::default_for(ProcessorKindTag::MlInference),
        );
        Self {
            processors: Arc::new(vec![first]),
            next_id: 1,
            policy,
        }
    }

    pub fn policy(&self) -> AnchorPolicy {
        self.policy
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    /// Shared handle to the current sequence; unaffected by later edits.
    pub fn snapshot(&self) -> Arc<Vec<Processor>> {
        Arc::clone(&self.processors)
    }

    pub fn ids(&self) -> Vec<ProcessorId> {
        self.processors.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn contains(&self, id: ProcessorId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: ProcessorId) -> Option<usize> {
        self.processors.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: ProcessorId) -> Result<&Processor, CoreError> {
        self.processors
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::unknown_processor(id))
    }

    fn ml_inference_count(&self) -> usize {
        self.processors.iter().filter(|p| p.is_ml_inference()).count()
    }

    /// Whether [`remove_processor`](Self::remove_processor) would accept `id`.
    ///
    /// The UI uses this to disable the remove control.
    pub fn can_remove(&self, id: ProcessorId) -> Result<(), CoreError> {
        let processor = self.get(id)?;
        if self.len() <= MIN_PROCESSORS {
            return Err(CoreError::InvariantViolation(format!(
                "Cannot remove {id}: the pipeline must keep at least {MIN_PROCESSORS} processor"
            )));
        }
        if self.policy == AnchorPolicy::RequireMlInference
            && processor.is_ml_inference()
            && self.ml_inference_count() == 1
        {
            return Err(CoreError::InvariantViolation(format!(
                "Cannot remove {id}: it is the last ml_inference processor"
            )));
        }
        Ok(())
    }

    // -- internal helpers ----------------------------------------------------

    fn allocate_id(&mut self) -> ProcessorId {
        let id = ProcessorId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn commit(&mut self, next: Vec<Processor>) {
        self.processors = Arc::new(next);
    }

    /// Replace the processor at `id` with the result of `edit`, or fail
    /// without touching the sequence.
    fn replace_processor<F>(&mut self, id: ProcessorId, edit: F) -> Result<(), CoreError>
    where
        F: FnOnce(&Processor) -> Result<Processor, CoreError>,
    {
        let idx = self
            .position(id)
            .ok_or_else(|| CoreError::unknown_processor(id))?;
        let replacement = edit(&self.processors[idx])?;
        let mut next = self.processors.as_ref().clone();
        next[idx] = replacement;
        self.commit(next);
        Ok(())
    }

    // -- processor operations -----------------------------------------------

    /// Append a processor of the given kind with default configuration.
    pub fn add_processor(&mut self, tag: ProcessorKindTag) -> Result<ProcessorId, CoreError> {
        if self.len() >= MAX_PROCESSORS {
            return Err(CoreError::InvariantViolation(format!(
                "Pipeline already holds the maximum of {MAX_PROCESSORS} processors"
            )));
        }
        let id = self.allocate_id();
        let mut next = self.processors.as_ref().clone();
        next.push(Processor::new(id, ProcessorKind::default_for(tag)));
        self.commit(next);
        tracing::debug!(processor_id = %id, kind = %tag, "Processor added");
        Ok(id)
    }

    /// Append a copy-values processor holding one empty entry.
    pub fn add_copy_values_processor(&mut self) -> Result<ProcessorId, CoreError> {
        self.add_processor(ProcessorKindTag::CopyValues)
    }

    /// Append a default ML inference processor.
    pub fn add_ml_inference_processor(&mut self) -> Result<ProcessorId, CoreError> {
        self.add_processor(ProcessorKindTag::MlInference)
    }

    pub fn remove_processor(&mut self, id: ProcessorId) -> Result<Processor, CoreError> {
        self.can_remove(id)?;
        let mut next = self.processors.as_ref().clone();
        let idx = next
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::unknown_processor(id))?;
        let removed = next.remove(idx);
        self.commit(next);
        tracing::debug!(processor_id = %id, "Processor removed");
        Ok(removed)
    }

    /// Replace the order with `new_order`, which must be a permutation of the
    /// current identifiers.
    pub fn reorder(&mut self, new_order: &[ProcessorId]) -> Result<(), CoreError> {
        if new_order.len() != self.len() {
            return Err(CoreError::InvalidPermutation(format!(
                "Expected {} identifiers, got {}",
                self.len(),
                new_order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(new_order.len());
        let mut next = Vec::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(*id) {
                return Err(CoreError::InvalidPermutation(format!(
                    "Identifier {id} appears more than once"
                )));
            }
            let processor = self.get(*id).map_err(|_| {
                CoreError::InvalidPermutation(format!("Identifier {id} is not in the pipeline"))
            })?;
            next.push(processor.clone());
        }
        self.commit(next);
        tracing::debug!(order = ?new_order, "Pipeline reordered");
        Ok(())
    }

    /// Apply one scalar edit to an ML inference processor.
    pub fn update_ml_inference(
        &mut self,
        id: ProcessorId,
        update: MlInferenceUpdate,
    ) -> Result<(), CoreError> {
        let field = update.field_name();
        self.replace_processor(id, |p| {
            let cfg = p.as_ml_inference()?;
            Ok(Processor::new(
                p.id,
                ProcessorKind::MlInference(cfg.with_update(update)),
            ))
        })?;
        tracing::debug!(processor_id = %id, field, "ML inference field updated");
        Ok(())
    }

    // -- entry operations ----------------------------------------------------

    /// Append an empty entry to a copy-values processor, returning its index.
    pub fn add_entry(&mut self, id: ProcessorId) -> Result<usize, CoreError> {
        let mut index = 0;
        self.replace_processor(id, |p| {
            let cfg = p.as_copy_values()?;
            if cfg.entries.len() >= MAX_ENTRIES_PER_PROCESSOR {
                return Err(CoreError::InvariantViolation(format!(
                    "Processor {id} already holds the maximum of \
                     {MAX_ENTRIES_PER_PROCESSOR} entries"
                )));
            }
            let mut entries = cfg.entries.clone();
            entries.push(Entry::default());
            index = entries.len() - 1;
            Ok(Processor::new(
                p.id,
                ProcessorKind::CopyValues(CopyValuesConfig { entries }),
            ))
        })?;
        tracing::debug!(processor_id = %id, index, "Entry added");
        Ok(index)
    }

    pub fn remove_entry(&mut self, id: ProcessorId, index: usize) -> Result<Entry, CoreError> {
        let mut removed = None;
        self.replace_processor(id, |p| {
            let cfg = p.as_copy_values()?;
            if index >= cfg.entries.len() {
                return Err(CoreError::unknown_entry(id, index));
            }
            if cfg.entries.len() <= MIN_ENTRIES_PER_PROCESSOR {
                return Err(CoreError::InvariantViolation(format!(
                    "Cannot remove the last entry of processor {id}"
                )));
            }
            let mut entries = cfg.entries.clone();
            removed = Some(entries.remove(index));
            Ok(Processor::new(
                p.id,
                ProcessorKind::CopyValues(CopyValuesConfig { entries }),
            ))
        })?;
        tracing::debug!(processor_id = %id, index, "Entry removed");
        removed.ok_or_else(|| CoreError::Internal("entry removal produced no entry".into()))
    }

    pub fn update_entry(
        &mut self,
        id: ProcessorId,
        index: usize,
        update: EntryUpdate,
    ) -> Result<(), CoreError> {
        let field = update.field_name();
        self.replace_processor(id, |p| {
            let cfg = p.as_copy_values()?;
            let current = cfg
                .entries
                .get(index)
                .ok_or_else(|| CoreError::unknown_entry(id, index))?;
            let mut entries = cfg.entries.clone();
            entries[index] = current.with_update(update);
            Ok(Processor::new(
                p.id,
                ProcessorKind::CopyValues(CopyValuesConfig { entries }),
            ))
        })?;
        tracing::debug!(processor_id = %id, index, field, "Entry updated");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
