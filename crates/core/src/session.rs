//! One editing session: the pipeline, its drag gesture and the definition
//! settings, driven by discrete UI events.
//!
//! Each event method returns a [`SessionChange`] describing what was
//! committed, so the hosting layer can publish it to observers.

use std::sync::Arc;

use serde::Serialize;

use crate::access::ServiceAccess;
use crate::definition::{DefinitionSettings, PipelineDefinition};
use crate::drag::{DragController, DragState, DropOutcome, DropPreview};
use crate::entry::{Entry, EntryUpdate};
use crate::error::CoreError;
use crate::pipeline::{AnchorPolicy, Pipeline};
use crate::processor::{MlInferenceUpdate, Processor, ProcessorKindTag};
use crate::types::{ProcessorId, Timestamp};
use crate::validation::ValidationReport;

/// A committed change, suitable for publishing as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum SessionChange {
    ProcessorAdded {
        processor_id: ProcessorId,
        kind: ProcessorKindTag,
    },
    ProcessorRemoved {
        processor_id: ProcessorId,
    },
    ProcessorUpdated {
        processor_id: ProcessorId,
        field: &'static str,
    },
    Reordered {
        order: Vec<ProcessorId>,
    },
    EntryAdded {
        processor_id: ProcessorId,
        index: usize,
    },
    EntryRemoved {
        processor_id: ProcessorId,
        index: usize,
    },
    EntryUpdated {
        processor_id: ProcessorId,
        index: usize,
        field: &'static str,
    },
    SettingsUpdated,
    /// Drag gesture state changed; the pipeline itself did not.
    DragStateChanged {
        state: DragState,
    },
}

impl SessionChange {
    /// Dot-separated event name, e.g. `"processor.added"`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProcessorAdded { .. } => "processor.added",
            Self::ProcessorRemoved { .. } => "processor.removed",
            Self::ProcessorUpdated { .. } => "processor.updated",
            Self::Reordered { .. } => "pipeline.reordered",
            Self::EntryAdded { .. } => "entry.added",
            Self::EntryRemoved { .. } => "entry.removed",
            Self::EntryUpdated { .. } => "entry.updated",
            Self::SettingsUpdated => "settings.updated",
            Self::DragStateChanged { .. } => "drag.state_changed",
        }
    }

    /// Whether the change altered the processor sequence.
    pub fn mutates_pipeline(&self) -> bool {
        !matches!(
            self,
            Self::SettingsUpdated | Self::DragStateChanged { .. }
        )
    }
}

/// Point-in-time view of the session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub processors: Arc<Vec<Processor>>,
    pub drag: DragState,
    pub policy: AnchorPolicy,
    pub settings: DefinitionSettings,
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    pipeline: Pipeline,
    drag: DragController,
    settings: DefinitionSettings,
}

impl EditorSession {
    /// Fresh session with a single ML inference processor and a generated
    /// service role name.
    pub fn new(policy: AnchorPolicy, name: impl Into<String>, now: Timestamp) -> Self {
        Self {
            pipeline: Pipeline::new(policy),
            drag: DragController::new(),
            settings: DefinitionSettings::new(name, ServiceAccess::create_default(now)),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn settings(&self) -> &DefinitionSettings {
        &self.settings
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            processors: self.pipeline.snapshot(),
            drag: self.drag.state(),
            policy: self.pipeline.policy(),
            settings: self.settings.clone(),
        }
    }

    // -- processors -----------------------------------------------------------

    pub fn add_processor(&mut self, kind: ProcessorKindTag) -> Result<SessionChange, CoreError> {
        let processor_id = self.pipeline.add_processor(kind)?;
        Ok(SessionChange::ProcessorAdded { processor_id, kind })
    }

    pub fn add_copy_values_processor(&mut self) -> Result<SessionChange, CoreError> {
        self.add_processor(ProcessorKindTag::CopyValues)
    }

    pub fn remove_processor(&mut self, id: ProcessorId) -> Result<SessionChange, CoreError> {
        self.pipeline.remove_processor(id)?;
        if self.drag.dragged_id() == Some(id) {
            self.drag.drag_end();
        }
        Ok(SessionChange::ProcessorRemoved { processor_id: id })
    }

    pub fn update_ml_inference(
        &mut self,
        id: ProcessorId,
        update: MlInferenceUpdate,
    ) -> Result<SessionChange, CoreError> {
        let field = update.field_name();
        self.pipeline.update_ml_inference(id, update)?;
        Ok(SessionChange::ProcessorUpdated {
            processor_id: id,
            field,
        })
    }

    pub fn reorder(&mut self, order: &[ProcessorId]) -> Result<SessionChange, CoreError> {
        self.pipeline.reorder(order)?;
        Ok(SessionChange::Reordered {
            order: order.to_vec(),
        })
    }

    // -- entries --------------------------------------------------------------

    pub fn add_entry(&mut self, id: ProcessorId) -> Result<SessionChange, CoreError> {
        let index = self.pipeline.add_entry(id)?;
        Ok(SessionChange::EntryAdded {
            processor_id: id,
            index,
        })
    }

    pub fn remove_entry(
        &mut self,
        id: ProcessorId,
        index: usize,
    ) -> Result<(Entry, SessionChange), CoreError> {
        let removed = self.pipeline.remove_entry(id, index)?;
        Ok((
            removed,
            SessionChange::EntryRemoved {
                processor_id: id,
                index,
            },
        ))
    }

    pub fn update_entry(
        &mut self,
        id: ProcessorId,
        index: usize,
        update: EntryUpdate,
    ) -> Result<SessionChange, CoreError> {
        let field = update.field_name();
        self.pipeline.update_entry(id, index, update)?;
        Ok(SessionChange::EntryUpdated {
            processor_id: id,
            index,
            field,
        })
    }

    // -- drag gesture -------------------------------------------------------------

    pub fn drag_start(&mut self, id: ProcessorId) -> Result<SessionChange, CoreError> {
        self.drag.drag_start(id, &self.pipeline)?;
        Ok(SessionChange::DragStateChanged {
            state: self.drag.state(),
        })
    }

    pub fn drag_over(&self, target: ProcessorId) -> Option<DropPreview> {
        self.drag.drag_over(target, &self.pipeline)
    }

    /// Resolve the gesture. A committed move yields [`SessionChange::Reordered`],
    /// anything else only a drag state change.
    pub fn drop_on(
        &mut self,
        target: ProcessorId,
    ) -> Result<(DropOutcome, SessionChange), CoreError> {
        let outcome = self.drag.drop_on(target, &mut self.pipeline)?;
        let change = match &outcome {
            DropOutcome::Moved { order, .. } => SessionChange::Reordered {
                order: order.clone(),
            },
            DropOutcome::Ignored { .. } => SessionChange::DragStateChanged {
                state: self.drag.state(),
            },
        };
        Ok((outcome, change))
    }

    pub fn drag_end(&mut self) -> SessionChange {
        self.drag.drag_end();
        SessionChange::DragStateChanged {
            state: self.drag.state(),
        }
    }

    // -- definition -----------------------------------------------------------------

    pub fn replace_settings(&mut self, settings: DefinitionSettings) -> SessionChange {
        self.settings = settings;
        SessionChange::SettingsUpdated
    }

    /// Validation state of the whole definition, for inline UI messages.
    pub fn validate(&self) -> ValidationReport {
        let mut errors = self.settings.violations();
        errors.extend(crate::document::validate_processors(self.pipeline.processors()).errors);
        ValidationReport::from_violations(errors)
    }

    pub fn build_definition(&self) -> Result<PipelineDefinition, CoreError> {
        PipelineDefinition::build(&self.settings, self.pipeline.processors())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::ActionType;
    use crate::sink::OpenSearchSink;
    use crate::source::S3Source;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn pid(n: u64) -> ProcessorId {
        ProcessorId::new(n)
    }

    fn session() -> EditorSession {
        let now = chrono::Utc.timestamp_opt(1_769_711_899, 0).unwrap();
        EditorSession::new(AnchorPolicy::default(), "chapter-embeddings", now)
    }

    #[test]
    fn new_session_defaults() {
        let s = session();
        assert_eq!(s.pipeline().ids(), vec![pid(0)]);
        assert_eq!(s.drag_state(), DragState::Idle);
        assert_eq!(
            s.settings().access,
            ServiceAccess::CreateNew {
                role_name: "MLInferenceOSIRole-1769711899".into()
            }
        );
    }

    #[test]
    fn changes_name_their_events() {
        let mut s = session();
        let change = s.add_copy_values_processor().unwrap();
        assert_eq!(
            change,
            SessionChange::ProcessorAdded {
                processor_id: pid(1),
                kind: ProcessorKindTag::CopyValues
            }
        );
        assert_eq!(change.event_type(), "processor.added");
        assert!(change.mutates_pipeline());

        let change = s.drag_start(pid(1)).unwrap();
        assert_eq!(change.event_type(), "drag.state_changed");
        assert!(!change.mutates_pipeline());
    }

    #[test]
    fn committed_drop_reports_reorder() {
        let mut s = session();
        s.add_copy_values_processor().unwrap();
        s.add_copy_values_processor().unwrap();
        s.drag_start(pid(0)).unwrap();
        let (outcome, change) = s.drop_on(pid(2)).unwrap();
        assert_matches!(outcome, DropOutcome::Moved { .. });
        assert_eq!(
            change,
            SessionChange::Reordered {
                order: vec![pid(1), pid(0), pid(2)]
            }
        );
        assert_eq!(s.drag_state(), DragState::Idle);
    }

    #[test]
    fn drop_on_self_reports_only_drag_change() {
        let mut s = session();
        s.add_copy_values_processor().unwrap();
        s.drag_start(pid(1)).unwrap();
        let (_, change) = s.drop_on(pid(1)).unwrap();
        assert_eq!(
            change,
            SessionChange::DragStateChanged {
                state: DragState::Idle
            }
        );
        assert_eq!(s.pipeline().ids(), vec![pid(0), pid(1)]);
    }

    #[test]
    fn removing_dragged_processor_clears_gesture() {
        let mut s = session();
        s.add_copy_values_processor().unwrap();
        s.drag_start(pid(1)).unwrap();
        s.remove_processor(pid(1)).unwrap();
        assert_eq!(s.drag_state(), DragState::Idle);
    }

    #[test]
    fn rejected_event_leaves_snapshot_untouched() {
        let mut s = session();
        let p1 = s.pipeline().snapshot();
        assert!(s.remove_processor(pid(0)).is_err());
        assert!(s.remove_entry(pid(0), 0).is_err());
        assert!(s.reorder(&[pid(3)]).is_err());
        assert!(Arc::ptr_eq(&p1, &s.pipeline().snapshot()));
    }

    #[test]
    fn build_definition_after_editing() {
        let mut s = session();
        s.update_ml_inference(pid(0), MlInferenceUpdate::ModelId("m-1".into()))
            .unwrap();
        s.update_ml_inference(pid(0), MlInferenceUpdate::ActionType(ActionType::Predict))
            .unwrap();
        let mut settings = s.settings().clone();
        settings.source = Some(S3Source {
            bucket: "docs-bucket".into(),
            metadata_prefix: None,
        });
        settings.sink = Some(OpenSearchSink {
            endpoint: "https://search.example.com".into(),
            index: "docs".into(),
        });
        assert!(!s.validate().is_valid);
        s.replace_settings(settings);
        assert!(s.validate().is_valid);

        let def = s.build_definition().unwrap();
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(
            value["chapter-embeddings"]["processor"][0]["ml_inference"]["action_type"],
            "predict"
        );
    }

    #[test]
    fn snapshot_serializes_for_rendering() {
        let mut s = session();
        s.add_copy_values_processor().unwrap();
        let value = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(value["processors"][1]["id"], "p1");
        assert_eq!(value["drag"]["state"], "idle");
        assert_eq!(value["policy"], "require_ml_inference");
    }
}
