//! Scene representation and world-space geometry queries

use crate::{
    aabb::AABB,
    material::Material,
    mesh::Mesh,
    node::Node,
    types::Matrix4x4,
};

/// A decoded 3D scene: a node hierarchy plus mesh and material tables
///
/// The scene is the single unit of mutable state the pipeline operates on.
/// It is mutated in place by normalization and interaction, and deep-cloned
/// (independent geometry buffers) before export so baking never corrupts the
/// live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Root of the node hierarchy; the unit the pipeline manipulates as a whole
    pub root: Node,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl Scene {
    /// Create a scene from a root node and its mesh/material tables
    pub fn new(root: Node, meshes: Vec<Mesh>, materials: Vec<Material>) -> Self {
        Self {
            root,
            meshes,
            materials,
        }
    }

    /// Get the mesh table
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Get the material table
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Get a mesh by table index
    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index)
    }

    /// Get a material by table index
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Replace the mesh table (used by the export baker after re-instancing)
    pub(crate) fn set_meshes(&mut self, meshes: Vec<Mesh>) {
        self.meshes = meshes;
    }

    /// Replace the material table (used when deduplicating at decode time)
    pub(crate) fn set_materials(&mut self, materials: Vec<Material>) {
        self.materials = materials;
    }

    /// Whether any node in the hierarchy carries renderable geometry
    pub fn has_geometry(&self) -> bool {
        let mut found = false;
        self.root.visit_with_world(&Matrix4x4::IDENTITY, &mut |node, _| {
            found |= node.has_geometry();
        });
        found
    }

    /// Total number of vertices across all mesh instances in the hierarchy
    pub fn instance_vertex_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh_instance(&mut |_, _, mesh| count += mesh.vertex_count());
        count
    }

    /// Compute the axis-aligned bounds of the hierarchy in world space.
    ///
    /// Every vertex of every mesh-bearing node is transformed by that node's
    /// accumulated world matrix. Bounds are always derived from the current
    /// transforms; nothing is cached. Returns the empty AABB when the
    /// hierarchy carries no geometry — callers deriving a scale from the
    /// extent must guard against the zero-size case.
    pub fn world_bounds(&self) -> AABB {
        let mut bounds = AABB::empty();
        self.for_each_mesh_instance(&mut |_, world, mesh| {
            for position in mesh.positions() {
                bounds.expand_to_include_point(world.transform_point3(*position));
            }
        });
        bounds
    }

    /// Visit every (node, world matrix, mesh) instance in traversal order.
    ///
    /// A mesh referenced by several nodes is visited once per referencing
    /// node, each time with that node's world matrix.
    pub fn for_each_mesh_instance(&self, visit: &mut impl FnMut(&Node, &Matrix4x4, &Mesh)) {
        self.root.visit_with_world(&Matrix4x4::IDENTITY, &mut |node, world| {
            for &mesh_index in node.mesh_indices() {
                if let Some(mesh) = self.meshes.get(mesh_index) {
                    visit(node, world, mesh);
                }
            }
        });
    }
}
