//! Mesh representation and vertex-level operations

use crate::{
    aabb::AABB,
    types::{Matrix3x3, Matrix4x4, Vector2D, Vector3D},
};

/// A triangle mesh owning its vertex and index buffers
///
/// Buffers are owned, not shared: cloning a mesh yields independent storage,
/// which is what allows the export baker to mutate a cloned hierarchy without
/// corrupting the live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    positions: Vec<Vector3D>,
    normals: Vec<Vector3D>,
    uvs: Vec<Vector2D>,
    indices: Vec<u32>,
    material_index: Option<usize>,
}

impl Mesh {
    /// Create a new mesh with the given name, positions, and triangle indices
    pub fn new<S: Into<String>>(name: S, positions: Vec<Vector3D>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: Vec::new(),
            uvs: Vec::new(),
            indices,
            material_index: None,
        }
    }

    /// Attach per-vertex normals (must match the position count)
    pub fn with_normals(mut self, normals: Vec<Vector3D>) -> Self {
        debug_assert!(normals.is_empty() || normals.len() == self.positions.len());
        self.normals = normals;
        self
    }

    /// Attach per-vertex texture coordinates (must match the position count)
    pub fn with_uvs(mut self, uvs: Vec<Vector2D>) -> Self {
        debug_assert!(uvs.is_empty() || uvs.len() == self.positions.len());
        self.uvs = uvs;
        self
    }

    /// Attach a material table index
    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = Some(material_index);
        self
    }

    /// Get the name of the mesh
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the vertex positions
    pub fn positions(&self) -> &[Vector3D] {
        &self.positions
    }

    /// Get the vertex normals, if present
    pub fn normals(&self) -> Option<&[Vector3D]> {
        if self.normals.is_empty() {
            None
        } else {
            Some(&self.normals)
        }
    }

    /// Get the texture coordinates, if present
    pub fn uvs(&self) -> Option<&[Vector2D]> {
        if self.uvs.is_empty() {
            None
        } else {
            Some(&self.uvs)
        }
    }

    /// Get the triangle indices
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Get the material table index, if assigned
    pub fn material_index(&self) -> Option<usize> {
        self.material_index
    }

    /// Reassign the material table index
    pub fn set_material_index(&mut self, material_index: Option<usize>) {
        self.material_index = material_index;
    }

    /// Get the number of vertices in the mesh
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles in the mesh
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Compute the bounds of the raw vertex positions (mesh-local space)
    pub fn local_bounds(&self) -> AABB {
        AABB::from_points(self.positions.iter().copied())
    }

    /// Bake a world transform directly into the vertex buffers.
    ///
    /// Positions are transformed as points; normals by the inverse-transpose
    /// of the upper 3x3 and renormalized, so non-uniform scale does not skew
    /// shading. After baking, the owning node's transform must be reset to
    /// identity by the caller.
    pub fn bake_transform(&mut self, world: &Matrix4x4) {
        for position in &mut self.positions {
            *position = world.transform_point3(*position);
        }

        if !self.normals.is_empty() {
            let normal_matrix = Matrix3x3::from_mat4(world.inverse().transpose());
            for normal in &mut self.normals {
                let n = normal_matrix * *normal;
                // Degenerate world matrices can flatten normals to zero.
                *normal = n.try_normalize().unwrap_or(Vector3D::Y);
            }
        }
    }

    /// Generate per-vertex normals by area-weighted face-normal accumulation.
    ///
    /// Used when the source asset carries no normals at all; existing normals
    /// are left untouched.
    pub fn generate_normals(&mut self) {
        if !self.normals.is_empty() || self.positions.is_empty() {
            return;
        }

        let mut accumulated = vec![Vector3D::ZERO; self.positions.len()];
        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            if i0 >= accumulated.len() || i1 >= accumulated.len() || i2 >= accumulated.len() {
                continue;
            }
            let edge1 = self.positions[i1] - self.positions[i0];
            let edge2 = self.positions[i2] - self.positions[i0];
            // Cross product length is proportional to face area; summing the
            // unnormalized cross gives area weighting for free.
            let face_normal = edge1.cross(edge2);
            accumulated[i0] += face_normal;
            accumulated[i1] += face_normal;
            accumulated[i2] += face_normal;
        }

        self.normals = accumulated
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vector3D::Y))
            .collect();
    }
}
