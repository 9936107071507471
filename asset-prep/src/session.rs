//! Interactive transform session
//!
//! A small state machine binding a manipulation gizmo to the scene root:
//! which manipulation mode is active, whether a drag is in flight, and the
//! ground-snap bookkeeping that runs when a drag ends. The session never
//! renders anything; it only sequences transform edits and snap policy.

use tracing::debug;

use crate::{normalize::NormalizationState, scene::Scene};

/// Active manipulation mode of the transform gizmo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoMode {
    /// Rotate the root node
    Rotate,
    /// Translate the root node
    Translate,
    /// Scale the root node
    Scale,
}

/// Drag/mode state for one interactive editing session
///
/// The translate/rotate asymmetry here is deliberate policy, not an
/// implementation detail: finishing a translate drag records placement intent
/// and suspends automatic ground snapping, while rotate and scale drags
/// always re-fit the model to the ground when they end. Do not generalize
/// one behavior onto the other.
#[derive(Debug)]
pub struct TransformSession {
    mode: GizmoMode,
    dragging: bool,
}

impl TransformSession {
    /// Create a new session with the gizmo in translate mode
    pub fn new() -> Self {
        Self {
            mode: GizmoMode::Translate,
            dragging: false,
        }
    }

    /// Get the active manipulation mode
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    /// Switch the manipulation mode.
    ///
    /// Always legal, takes effect immediately, and never touches the manual
    /// position override.
    pub fn set_mode(&mut self, mode: GizmoMode) {
        self.mode = mode;
    }

    /// Whether a drag is currently in flight
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Whether camera-orbit input may run.
    ///
    /// Orbit and gizmo drags share the same pointer stream; exactly one of
    /// them may own it at a time.
    pub fn orbit_enabled(&self) -> bool {
        !self.dragging
    }

    /// Begin a gizmo drag; camera orbit is disabled until the drag ends
    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    /// End the current drag and apply the mode's snap policy.
    ///
    /// - `Translate`: the user just placed the model deliberately. The manual
    ///   position override is set (until an explicit reset) and no snap runs.
    /// - `Rotate`/`Scale`: the edit changed the model's footprint, so it is
    ///   re-fitted to the ground unconditionally — even when a manual
    ///   override from an earlier translate is active.
    pub fn end_drag(&mut self, scene: &mut Scene, state: &mut NormalizationState) {
        if !self.dragging {
            return;
        }
        self.dragging = false;

        match self.mode {
            GizmoMode::Translate => {
                debug!("drag end: translate, suspending automatic ground snap");
                state.mark_manual_override();
            }
            GizmoMode::Rotate | GizmoMode::Scale => {
                state.refit_ground(scene);
            }
        }
    }

    /// Explicitly reset placement: clear the override and snap immediately
    pub fn reset_position(&mut self, scene: &mut Scene, state: &mut NormalizationState) {
        state.reset_position(scene);
    }
}

impl Default for TransformSession {
    fn default() -> Self {
        Self::new()
    }
}
