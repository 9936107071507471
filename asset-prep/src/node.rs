//! Scene node representation and hierarchy

use crate::types::{Matrix4x4, Quaternion, Vector3D};

/// A decomposed local transform (translation, rotation, scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent node
    pub translation: Vector3D,
    /// Rotation relative to the parent node
    pub rotation: Quaternion,
    /// Scale relative to the parent node
    pub scale: Vector3D,
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Self = Self {
        translation: Vector3D::ZERO,
        rotation: Quaternion::IDENTITY,
        scale: Vector3D::ONE,
    };

    /// Compose this transform into a column-major matrix (T * R * S)
    pub fn matrix(&self) -> Matrix4x4 {
        Matrix4x4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decompose a matrix back into translation/rotation/scale
    pub fn from_matrix(matrix: &Matrix4x4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Whether this is (exactly) the identity transform
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node in the scene hierarchy
///
/// Nodes own their children and reference geometry through indices into the
/// scene's mesh table. The root node is the unit the pipeline manipulates as
/// a whole; its world transform is the product of ancestor transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    /// Local transform relative to the parent
    pub transform: Transform,
    children: Vec<Node>,
    mesh_indices: Vec<usize>,
}

impl Node {
    /// Create a new empty node with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            children: Vec::new(),
            mesh_indices: Vec::new(),
        }
    }

    /// Get the name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach a child node
    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Attach a mesh table index
    pub fn push_mesh_index(&mut self, mesh_index: usize) {
        self.mesh_indices.push(mesh_index);
    }

    /// Get the number of child nodes
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Get an iterator over all child nodes
    pub fn children(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    /// Get a mutable iterator over all child nodes
    pub fn children_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.children.iter_mut()
    }

    /// Get the mesh table indices attached to this node
    pub fn mesh_indices(&self) -> &[usize] {
        &self.mesh_indices
    }

    /// Get a mutable view of the mesh table indices
    pub(crate) fn mesh_indices_mut(&mut self) -> &mut Vec<usize> {
        &mut self.mesh_indices
    }

    /// Whether this node carries renderable geometry
    ///
    /// The capability check used everywhere a mesh-bearing node matters
    /// (bounds, palette extraction, baking); there is no runtime type
    /// inspection anywhere in the pipeline.
    pub fn has_geometry(&self) -> bool {
        !self.mesh_indices.is_empty()
    }

    /// Find a node by name (depth-first, self included)
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find_node(name) {
                return Some(found);
            }
        }
        None
    }

    /// Visit every node depth-first with its accumulated world matrix.
    ///
    /// Parents are visited before children; sibling order is authoring order.
    /// This ordering is what makes palette extraction deterministic.
    pub fn visit_with_world(&self, parent_world: &Matrix4x4, visit: &mut impl FnMut(&Node, &Matrix4x4)) {
        let world = *parent_world * self.transform.matrix();
        visit(self, &world);
        for child in &self.children {
            child.visit_with_world(&world, visit);
        }
    }

    /// Mutable variant of [`Node::visit_with_world`].
    ///
    /// The world matrix passed to the callback is computed from the transform
    /// as it was when the node was reached; the callback may reset the local
    /// transform afterwards (this is exactly what the export baker does).
    pub fn visit_with_world_mut(
        &mut self,
        parent_world: &Matrix4x4,
        visit: &mut impl FnMut(&mut Node, &Matrix4x4),
    ) {
        let world = *parent_world * self.transform.matrix();
        visit(self, &world);
        for child in &mut self.children {
            child.visit_with_world_mut(&world, visit);
        }
    }
}
