//! Drag-to-reorder gesture tracking.
//!
//! [`DragController`] is a two-state machine (`Idle`, `Dragging`) sitting
//! between raw drag events and [`Pipeline::reorder`]. A gesture always ends
//! in `Idle`, and a completed drop issues at most one `reorder` call.
//!
//! Drop semantics are insert-before: the dragged processor is taken out of
//! the sequence and reinserted immediately before the drop target. Given
//! `[A, B, C]`, dragging `A` onto `C` yields `[B, A, C]`; dragging `C` onto
//! `A` yields `[C, A, B]`. Dropping onto the processor directly after the
//! dragged one leaves the order as it was.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pipeline::Pipeline;
use crate::types::ProcessorId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "dragged_id", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging(ProcessorId),
}

/// Advisory result of a drag-over event, used for visual feedback only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPreview {
    /// Whether dropping here would change the order.
    pub would_move: bool,
    /// The order a drop on this target would produce.
    pub resulting_order: Vec<ProcessorId>,
}

/// How a drop event was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// A reorder was committed.
    Moved {
        dragged_id: ProcessorId,
        target_id: ProcessorId,
        order: Vec<ProcessorId>,
    },
    /// The gesture ended without touching the pipeline.
    Ignored { reason: IgnoreReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotDragging,
    DroppedOnSelf,
    UnknownTarget,
    DraggedProcessorGone,
}

/// Order produced by moving `dragged` to just before `target`.
///
/// Returns `None` if either identifier is missing or they are equal.
pub fn move_before(
    order: &[ProcessorId],
    dragged: ProcessorId,
    target: ProcessorId,
) -> Option<Vec<ProcessorId>> {
    if dragged == target {
        return None;
    }
    let from = order.iter().position(|id| *id == dragged)?;
    if !order.contains(&target) {
        return None;
    }
    let mut next = order.to_vec();
    next.remove(from);
    let to = next.iter().position(|id| *id == target)?;
    next.insert(to, dragged);
    Some(next)
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn dragged_id(&self) -> Option<ProcessorId> {
        match self.state {
            DragState::Dragging(id) => Some(id),
            DragState::Idle => None,
        }
    }

    /// Begin a gesture on `id`. A start during an active gesture replaces it.
    pub fn drag_start(&mut self, id: ProcessorId, pipeline: &Pipeline) -> Result<(), CoreError> {
        if !pipeline.contains(id) {
            return Err(CoreError::unknown_processor(id));
        }
        if let DragState::Dragging(previous) = self.state {
            tracing::debug!(%previous, processor_id = %id, "Drag restarted");
        }
        self.state = DragState::Dragging(id);
        Ok(())
    }

    /// Report what a drop on `target` would do. Never mutates anything.
    pub fn drag_over(&self, target: ProcessorId, pipeline: &Pipeline) -> Option<DropPreview> {
        let dragged = self.dragged_id()?;
        let current = pipeline.ids();
        let resulting_order =
            move_before(&current, dragged, target).unwrap_or_else(|| current.clone());
        Some(DropPreview {
            would_move: resulting_order != current,
            resulting_order,
        })
    }

    /// Finish the gesture on `target`, reordering the pipeline when the drop
    /// is a real move. The controller is `Idle` afterwards in every case.
    pub fn drop_on(
        &mut self,
        target: ProcessorId,
        pipeline: &mut Pipeline,
    ) -> Result<DropOutcome, CoreError> {
        let state = std::mem::take(&mut self.state);
        let dragged = match state {
            DragState::Idle => {
                return Ok(DropOutcome::Ignored {
                    reason: IgnoreReason::NotDragging,
                })
            }
            DragState::Dragging(id) => id,
        };

        if dragged == target {
            return Ok(DropOutcome::Ignored {
                reason: IgnoreReason::DroppedOnSelf,
            });
        }
        if !pipeline.contains(dragged) {
            return Ok(DropOutcome::Ignored {
                reason: IgnoreReason::DraggedProcessorGone,
            });
        }
        let Some(order) = move_before(&pipeline.ids(), dragged, target) else {
            return Ok(DropOutcome::Ignored {
                reason: IgnoreReason::UnknownTarget,
            });
        };

        pipeline.reorder(&order)?;
        tracing::debug!(dragged_id = %dragged, target_id = %target, "Drop committed");
        Ok(DropOutcome::Moved {
            dragged_id: dragged,
            target_id: target,
            order,
        })
    }

    /// Abandon the gesture without touching the pipeline.
    pub fn drag_end(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn pid(n: u64) -> ProcessorId {
        ProcessorId::new(n)
    }

    /// `[p0, p1, p2]` standing in for `[A, B, C]`.
    fn abc() -> Pipeline {
        let mut p = Pipeline::default();
        p.add_copy_values_processor().unwrap();
        p.add_copy_values_processor().unwrap();
        p
    }

    // -- move_before ------------------------------------------------------------

    #[test]
    fn move_first_onto_last() {
        let order = [pid(0), pid(1), pid(2)];
        assert_eq!(
            move_before(&order, pid(0), pid(2)).unwrap(),
            vec![pid(1), pid(0), pid(2)]
        );
    }

    #[test]
    fn move_last_onto_first() {
        let order = [pid(0), pid(1), pid(2)];
        assert_eq!(
            move_before(&order, pid(2), pid(0)).unwrap(),
            vec![pid(2), pid(0), pid(1)]
        );
    }

    #[test]
    fn move_onto_next_neighbour_is_unchanged() {
        let order = [pid(0), pid(1), pid(2)];
        assert_eq!(move_before(&order, pid(1), pid(2)).unwrap(), order.to_vec());
    }

    #[test]
    fn move_onto_previous_neighbour_swaps() {
        let order = [pid(0), pid(1), pid(2)];
        assert_eq!(
            move_before(&order, pid(2), pid(1)).unwrap(),
            vec![pid(0), pid(2), pid(1)]
        );
    }

    #[test]
    fn move_rejects_self_and_unknown() {
        let order = [pid(0), pid(1)];
        assert!(move_before(&order, pid(0), pid(0)).is_none());
        assert!(move_before(&order, pid(5), pid(0)).is_none());
        assert!(move_before(&order, pid(0), pid(5)).is_none());
    }

    // -- state machine --------------------------------------------------------------

    #[test]
    fn starts_idle() {
        assert_eq!(DragController::new().state(), DragState::Idle);
    }

    #[test]
    fn drop_moves_single_element_before_target() {
        let mut p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(0), &p).unwrap();
        assert_eq!(drag.state(), DragState::Dragging(pid(0)));

        let outcome = drag.drop_on(pid(2), &mut p).unwrap();
        assert_matches!(outcome, DropOutcome::Moved { dragged_id, target_id, .. }
            if dragged_id == pid(0) && target_id == pid(2));
        assert_eq!(p.ids(), vec![pid(1), pid(0), pid(2)]);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drop_on_first_element_moves_to_front() {
        let mut p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(2), &p).unwrap();
        drag.drop_on(pid(0), &mut p).unwrap();
        assert_eq!(p.ids(), vec![pid(2), pid(0), pid(1)]);
    }

    #[test]
    fn drop_on_self_is_noop() {
        let mut p = abc();
        let before = p.snapshot();
        let mut drag = DragController::new();
        drag.drag_start(pid(1), &p).unwrap();
        let outcome = drag.drop_on(pid(1), &mut p).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Ignored {
                reason: IgnoreReason::DroppedOnSelf
            }
        );
        assert_eq!(*p.snapshot(), *before);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drop_on_unknown_target_is_noop() {
        let mut p = abc();
        let before = p.snapshot();
        let mut drag = DragController::new();
        drag.drag_start(pid(1), &p).unwrap();
        let outcome = drag.drop_on(pid(99), &mut p).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Ignored {
                reason: IgnoreReason::UnknownTarget
            }
        );
        assert_eq!(*p.snapshot(), *before);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drop_while_idle_is_noop() {
        let mut p = abc();
        let before = p.snapshot();
        let mut drag = DragController::new();
        let outcome = drag.drop_on(pid(1), &mut p).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Ignored {
                reason: IgnoreReason::NotDragging
            }
        );
        assert!(std::sync::Arc::ptr_eq(&before, &p.snapshot()));
    }

    #[test]
    fn drop_after_dragged_processor_removed_is_noop() {
        let mut p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(1), &p).unwrap();
        p.remove_processor(pid(1)).unwrap();
        let outcome = drag.drop_on(pid(0), &mut p).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Ignored {
                reason: IgnoreReason::DraggedProcessorGone
            }
        );
        assert_eq!(p.ids(), vec![pid(0), pid(2)]);
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drag_end_cancels_without_mutation() {
        let p = abc();
        let before = p.snapshot();
        let mut drag = DragController::new();
        drag.drag_start(pid(0), &p).unwrap();
        drag.drag_end();
        assert_eq!(drag.state(), DragState::Idle);
        assert!(std::sync::Arc::ptr_eq(&before, &p.snapshot()));
    }

    #[test]
    fn drag_over_is_advisory() {
        let p = abc();
        let before = p.snapshot();
        let mut drag = DragController::new();
        assert!(drag.drag_over(pid(2), &p).is_none());

        drag.drag_start(pid(0), &p).unwrap();
        let preview = drag.drag_over(pid(2), &p).unwrap();
        assert!(preview.would_move);
        assert_eq!(preview.resulting_order, vec![pid(1), pid(0), pid(2)]);

        let preview = drag.drag_over(pid(1), &p).unwrap();
        assert!(!preview.would_move);

        assert_eq!(drag.state(), DragState::Dragging(pid(0)));
        assert!(std::sync::Arc::ptr_eq(&before, &p.snapshot()));
    }

    #[test]
    fn drag_start_unknown_id_keeps_active_gesture() {
        let p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(1), &p).unwrap();
        assert_matches!(
            drag.drag_start(pid(42), &p),
            Err(CoreError::UnknownReference { entity: "processor", .. })
        );
        assert_eq!(drag.state(), DragState::Dragging(pid(1)));
    }

    #[test]
    fn drag_start_unknown_id_while_idle_stays_idle() {
        let p = abc();
        let mut drag = DragController::new();
        assert!(drag.drag_start(pid(42), &p).is_err());
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn drag_start_during_gesture_restarts() {
        let mut p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(0), &p).unwrap();
        drag.drag_start(pid(2), &p).unwrap();
        assert_eq!(drag.dragged_id(), Some(pid(2)));
        drag.drop_on(pid(1), &mut p).unwrap();
        assert_eq!(p.ids(), vec![pid(0), pid(2), pid(1)]);
    }

    #[test]
    fn no_dangling_state_across_gestures() {
        let mut p = abc();
        let mut drag = DragController::new();
        drag.drag_start(pid(0), &p).unwrap();
        drag.drop_on(pid(2), &mut p).unwrap();
        // Second drop without a new start must not reuse p0.
        let outcome = drag.drop_on(pid(1), &mut p).unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Ignored {
                reason: IgnoreReason::NotDragging
            }
        );
        assert_eq!(p.ids(), vec![pid(1), pid(0), pid(2)]);
    }

    #[test]
    fn state_wire_format() {
        let json = serde_json::to_value(DragState::Dragging(pid(3))).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "dragging", "dragged_id": "p3" }));
        let json = serde_json::to_value(DragState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "idle" }));
    }
}
