//! Axis-Aligned Bounding Box (AABB) support
//!
//! Bounds are the backbone of the normalization pipeline: centering, ground
//! snapping, and preview scaling are all derived from the world-space AABB of
//! the scene. Bounds are always recomputed from current transforms, never
//! cached across mutations.

use crate::types::{Matrix4x4, Vector3D};

/// An axis-aligned bounding box in 3D space
///
/// An AABB is defined by its minimum and maximum corner points. The empty
/// state is encoded as `min > max` so that expansion works without a
/// separate initialized flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3D,
    /// Maximum corner of the bounding box
    pub max: Vector3D,
}

impl AABB {
    /// Create a new AABB with the given minimum and maximum points
    pub fn new(min: Vector3D, max: Vector3D) -> Self {
        Self { min, max }
    }

    /// Create an empty AABB (min > max, indicating no volume)
    pub fn empty() -> Self {
        Self {
            min: Vector3D::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3D::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Create an AABB from a collection of points
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3D>,
    {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include_point(point);
        }
        aabb
    }

    /// Check if this AABB is empty (has no contained points)
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Check if this AABB is valid (min <= max for all axes)
    pub fn is_valid(&self) -> bool {
        !self.is_empty()
    }

    /// Get the center point of the AABB
    pub fn center(&self) -> Vector3D {
        (self.min + self.max) * 0.5
    }

    /// Get the size (extent) of the AABB along each axis
    pub fn size(&self) -> Vector3D {
        if self.is_empty() {
            Vector3D::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Get the largest extent across the three axes
    ///
    /// Returns 0.0 for empty or single-point bounds; callers deriving a scale
    /// from this value must guard the division.
    pub fn max_dimension(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }

    /// Expand the AABB to include a point
    pub fn expand_to_include_point(&mut self, point: Vector3D) {
        if self.is_empty() {
            self.min = point;
            self.max = point;
        } else {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }
    }

    /// Expand the AABB to include another AABB
    pub fn expand_to_include_aabb(&mut self, other: &AABB) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
        } else {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// Check if a point is inside this AABB
    pub fn contains_point(&self, point: Vector3D) -> bool {
        !self.is_empty()
            && point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Get the 8 corner points of the AABB
    pub fn corners(&self) -> [Vector3D; 8] {
        [
            Vector3D::new(self.min.x, self.min.y, self.min.z),
            Vector3D::new(self.max.x, self.min.y, self.min.z),
            Vector3D::new(self.min.x, self.max.y, self.min.z),
            Vector3D::new(self.max.x, self.max.y, self.min.z),
            Vector3D::new(self.min.x, self.min.y, self.max.z),
            Vector3D::new(self.max.x, self.min.y, self.max.z),
            Vector3D::new(self.min.x, self.max.y, self.max.z),
            Vector3D::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Transform this AABB by a matrix
    ///
    /// Note: this may result in a larger AABB than necessary for rotated
    /// boxes, as the result is still axis-aligned.
    pub fn transformed(&self, matrix: &Matrix4x4) -> Self {
        if self.is_empty() {
            return *self;
        }

        let mut result = Self::empty();
        for corner in self.corners() {
            result.expand_to_include_point(matrix.transform_point3(corner));
        }
        result
    }
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}
