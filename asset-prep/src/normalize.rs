//! Canonical pose and scale normalization
//!
//! Normalization moves a freshly decoded scene into the canonical preview
//! frame: horizontal bounds center at the origin, bottom face on the ground
//! plane, largest extent scaled to a fixed preview target. The state captured
//! here is also the reference frame for all later real-world scale math.

use tracing::{debug, warn};

use crate::{
    aabb::AABB,
    error::{Error, Result},
    scene::Scene,
    types::Vector3D,
};

/// Preview extent the largest model dimension is scaled to
pub const DEFAULT_PREVIEW_TARGET: f32 = 2.0;

/// Tunable normalization parameters
#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    /// Target preview extent for the largest dimension
    pub preview_target: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            preview_target: DEFAULT_PREVIEW_TARGET,
        }
    }
}

/// Normalization bookkeeping for one loaded scene
///
/// `original_bounds` is captured once at load time and never mutated
/// afterwards; the real-world scale factor is always derived from it rather
/// than from the preview-scaled extents.
#[derive(Debug, Clone, Copy)]
pub struct NormalizationState {
    original_bounds: AABB,
    center_offset: Vector3D,
    ground_offset: f32,
    preview_scale: f32,
    manual_position_override: bool,
    degenerate: bool,
}

/// Normalize a scene into the canonical preview frame.
///
/// 1. Capture the world bounds as the immutable original reference.
/// 2. Apply a single combined root translation: horizontal bounds center to
///    the origin, bottom face to Y=0.
/// 3. Scale the root uniformly so the largest dimension matches the preview
///    target.
/// 4. Re-run the combined snap — scaling about the root origin shifts both
///    the effective minimum Y and the horizontal center, so centering before
///    scaling does not survive the scale step on its own.
///
/// Zero-size bounds (no geometry, or single-point geometry) leave the scale
/// at 1.0 and flag the state as degenerate instead of propagating a
/// non-finite scale into the hierarchy.
pub fn normalize(scene: &mut Scene, options: &NormalizeOptions) -> NormalizationState {
    let original_bounds = scene.world_bounds();
    let mut state = NormalizationState {
        original_bounds,
        center_offset: Vector3D::ZERO,
        ground_offset: 0.0,
        preview_scale: 1.0,
        manual_position_override: false,
        degenerate: false,
    };

    if original_bounds.is_empty() {
        warn!("normalize: scene has no geometry, leaving transforms untouched");
        state.degenerate = true;
        return state;
    }

    state.snap_to_ground(scene);

    let max_dim = original_bounds.max_dimension();
    if max_dim <= f32::EPSILON {
        warn!(max_dim, "normalize: degenerate bounds, keeping scale 1.0");
        state.degenerate = true;
    } else {
        state.preview_scale = options.preview_target / max_dim;
        scene.root.transform.scale *= state.preview_scale;
    }

    state.snap_to_ground(scene);
    state
}

impl NormalizationState {
    /// Bounds of the scene as it was decoded, before any normalization
    pub fn original_bounds(&self) -> AABB {
        self.original_bounds
    }

    /// Horizontal translation applied by the most recent snap
    pub fn center_offset(&self) -> Vector3D {
        self.center_offset
    }

    /// Vertical translation applied by the most recent snap
    pub fn ground_offset(&self) -> f32 {
        self.ground_offset
    }

    /// Uniform scale applied so the largest dimension fits the preview target
    pub fn preview_scale(&self) -> f32 {
        self.preview_scale
    }

    /// Whether the user has manually repositioned the model
    pub fn manual_position_override(&self) -> bool {
        self.manual_position_override
    }

    /// Whether the source bounds were unusable for scale derivation
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Height of the undistorted source model
    pub fn original_height(&self) -> f32 {
        self.original_bounds.size().y
    }

    /// Real-world scale factor for a target height in millimeters.
    ///
    /// Always relative to the original, pre-preview height; the export baker
    /// divides out the preview scale separately. Degenerate source bounds
    /// cannot anchor real-world scale and are rejected.
    pub fn scale_factor(&self, target_height_mm: f32) -> Result<f32> {
        if !(target_height_mm > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "target height must be positive, got {target_height_mm}"
            )));
        }
        let height = self.original_height();
        if height <= f32::EPSILON {
            return Err(Error::invalid_parameter(
                "cannot derive a scale factor from zero-height source bounds",
            ));
        }
        Ok(target_height_mm / height)
    }

    /// Mark the model as manually positioned.
    ///
    /// Called when a translate-mode drag ends; automatic snapping stays
    /// suppressed until [`NormalizationState::reset_position`].
    pub fn mark_manual_override(&mut self) {
        self.manual_position_override = true;
    }

    /// Apply the combined centering + ground translation to the root.
    ///
    /// Skipped entirely while the manual position override is active: once a
    /// user has placed the model, automated snapping must not silently undo
    /// that placement.
    pub fn snap_to_ground(&mut self, scene: &mut Scene) {
        if self.manual_position_override {
            debug!("snap_to_ground: suppressed by manual position override");
            return;
        }
        self.apply_snap(scene);
    }

    /// Re-fit the model vertically so its bottom face touches the ground.
    ///
    /// Runs unconditionally — rotate/scale edits are expected to need ground
    /// re-fitting even after a manual translate, and only the vertical axis
    /// is touched so horizontal placement survives.
    pub fn refit_ground(&mut self, scene: &mut Scene) {
        let bounds = scene.world_bounds();
        if bounds.is_empty() {
            return;
        }
        let delta = -bounds.min.y;
        scene.root.transform.translation.y += delta;
        self.ground_offset = delta;
    }

    /// Clear the manual override and snap immediately
    pub fn reset_position(&mut self, scene: &mut Scene) {
        self.manual_position_override = false;
        self.apply_snap(scene);
    }

    fn apply_snap(&mut self, scene: &mut Scene) {
        let bounds = scene.world_bounds();
        if bounds.is_empty() {
            return;
        }
        let center = bounds.center();
        let delta = Vector3D::new(-center.x, -bounds.min.y, -center.z);
        scene.root.transform.translation += delta;
        self.center_offset = Vector3D::new(delta.x, 0.0, delta.z);
        self.ground_offset = delta.y;
    }
}
