//! Scene importer functionality
//!
//! Decodes glTF 2.0 containers (binary GLB or JSON) into the owned scene
//! hierarchy the pipeline operates on. Assets must be self-contained:
//! external buffer or image URIs are a decode failure, not a partial load.

use std::collections::HashMap;

use bitflags::bitflags;
use tracing::warn;

use crate::{
    error::{Error, Result},
    material::{Material, MaterialKind},
    mesh::Mesh,
    node::{Node, Transform},
    scene::Scene,
    types::{Color4D, Quaternion, Vector2D, Vector3D},
};

bitflags! {
    /// Optional post-decode steps applied before the scene is handed out
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DecodeSteps: u32 {
        /// Generate per-vertex normals for meshes that carry none
        const GENERATE_NORMALS = 0x1;
        /// Collapse material records sharing the same `(name, color)` identity
        const DEDUP_MATERIALS = 0x2;
    }
}

/// Entry point for decoding assets
///
/// ```no_run
/// use asset_prep::{DecodeSteps, Importer};
///
/// # fn main() -> asset_prep::Result<()> {
/// let bytes = std::fs::read("model.glb")?;
/// let scene = Importer::new()
///     .read_bytes(&bytes)
///     .with_steps(DecodeSteps::GENERATE_NORMALS)
///     .import()?;
/// println!("decoded {} meshes", scene.meshes().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Importer;

impl Importer {
    /// Create a new importer
    pub fn new() -> Self {
        Self
    }

    /// Start building an import from in-memory asset bytes
    pub fn read_bytes<'a>(&self, bytes: &'a [u8]) -> ImportBuilder<'a> {
        ImportBuilder::new(bytes)
    }

    /// Decode asset bytes with no extra decode steps
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<Scene> {
        self.read_bytes(bytes).import()
    }
}

/// Builder for configuring and executing a single decode
#[derive(Debug)]
pub struct ImportBuilder<'a> {
    bytes: &'a [u8],
    steps: DecodeSteps,
}

impl<'a> ImportBuilder<'a> {
    /// Create a builder over raw asset bytes (GLB or JSON glTF)
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            steps: DecodeSteps::empty(),
        }
    }

    /// Replace the configured decode steps
    pub fn with_steps(mut self, steps: DecodeSteps) -> Self {
        self.steps = steps;
        self
    }

    /// Add decode steps to the current configuration
    pub fn add_steps(mut self, steps: DecodeSteps) -> Self {
        self.steps |= steps;
        self
    }

    /// Decode the bytes into an owned scene.
    ///
    /// On failure no partial scene exists; the error carries the underlying
    /// parser cause. The caller decides whether to unmount a previously
    /// loaded scene — decode failure never does it implicitly.
    pub fn import(self) -> Result<Scene> {
        let (document, buffers, _images) =
            gltf::import_slice(self.bytes).map_err(|e| Error::decode_failed(e.to_string()))?;

        let (meshes, mesh_map) = convert_meshes(&document, &buffers);
        let materials = document
            .materials()
            .enumerate()
            .map(|(index, material)| convert_material(index, &material))
            .collect();

        let root = match document.default_scene().or_else(|| document.scenes().next()) {
            Some(gltf_scene) => {
                let mut root = Node::new(gltf_scene.name().unwrap_or("root"));
                for gltf_node in gltf_scene.nodes() {
                    root.push_child(convert_node(&gltf_node, &mesh_map));
                }
                root
            }
            None => {
                warn!("decode: document has no scene, mounting an empty hierarchy");
                Node::new("root")
            }
        };

        let mut scene = Scene::new(root, meshes, materials);
        apply_steps(&mut scene, self.steps);
        Ok(scene)
    }
}

/// Convert every triangle primitive into an owned mesh.
///
/// glTF attaches one mesh (with N primitives) per node; the pipeline models
/// each primitive as its own mesh, so `mesh_map` records which owned meshes a
/// glTF mesh expands to.
fn convert_meshes(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> (Vec<Mesh>, Vec<Vec<usize>>) {
    let mut meshes = Vec::new();
    let mut mesh_map = vec![Vec::new(); document.meshes().len()];

    for gltf_mesh in document.meshes() {
        let name = gltf_mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", gltf_mesh.index()));

        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(
                    mesh = name.as_str(),
                    mode = ?primitive.mode(),
                    "decode: skipping non-triangle primitive"
                );
                continue;
            }

            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                warn!(
                    mesh = name.as_str(),
                    "decode: skipping primitive without positions"
                );
                continue;
            };
            let positions: Vec<Vector3D> = positions.map(Vector3D::from_array).collect();

            // Non-indexed primitives render every vertex in order.
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let mut mesh = Mesh::new(name.clone(), positions, indices);
            if let Some(normals) = reader.read_normals() {
                mesh = mesh.with_normals(normals.map(Vector3D::from_array).collect());
            }
            if let Some(uvs) = reader.read_tex_coords(0) {
                mesh = mesh.with_uvs(uvs.into_f32().map(Vector2D::from_array).collect());
            }
            if let Some(material_index) = primitive.material().index() {
                mesh = mesh.with_material(material_index);
            }

            mesh_map[gltf_mesh.index()].push(meshes.len());
            meshes.push(mesh);
        }
    }

    (meshes, mesh_map)
}

fn convert_material(index: usize, material: &gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{index}"));
    let kind = if material.unlit() {
        MaterialKind::Unlit
    } else {
        MaterialKind::Pbr
    };

    Material::new(name, Color4D::from_array(pbr.base_color_factor()))
        .with_kind(kind)
        .with_metallic(pbr.metallic_factor())
        .with_roughness(pbr.roughness_factor())
        .with_double_sided(material.double_sided())
}

fn convert_node(gltf_node: &gltf::Node<'_>, mesh_map: &[Vec<usize>]) -> Node {
    let mut node = Node::new(gltf_node.name().unwrap_or_default());

    let (translation, rotation, scale) = gltf_node.transform().decomposed();
    node.transform = Transform {
        translation: Vector3D::from_array(translation),
        rotation: Quaternion::from_array(rotation),
        scale: Vector3D::from_array(scale),
    };

    if let Some(gltf_mesh) = gltf_node.mesh() {
        for &mesh_index in &mesh_map[gltf_mesh.index()] {
            node.push_mesh_index(mesh_index);
        }
    }
    for child in gltf_node.children() {
        node.push_child(convert_node(&child, mesh_map));
    }
    node
}

fn apply_steps(scene: &mut Scene, steps: DecodeSteps) {
    if steps.contains(DecodeSteps::GENERATE_NORMALS) {
        let mut meshes = scene.meshes().to_vec();
        for mesh in &mut meshes {
            mesh.generate_normals();
        }
        scene.set_meshes(meshes);
    }

    if steps.contains(DecodeSteps::DEDUP_MATERIALS) {
        dedup_materials(scene);
    }
}

/// Collapse the material table by `(name, color)` identity, first record wins,
/// and remap every mesh's material index onto the collapsed table.
fn dedup_materials(scene: &mut Scene) {
    let mut seen: HashMap<(String, String), usize> = HashMap::new();
    let mut deduped: Vec<Material> = Vec::new();
    let mut remap = Vec::with_capacity(scene.materials().len());

    for material in scene.materials() {
        let index = *seen
            .entry(material.identity_key())
            .or_insert_with(|| {
                deduped.push(material.clone());
                deduped.len() - 1
            });
        remap.push(index);
    }

    let mut meshes = scene.meshes().to_vec();
    for mesh in &mut meshes {
        let remapped = mesh
            .material_index()
            .and_then(|index| remap.get(index).copied());
        mesh.set_material_index(remapped);
    }
    scene.set_meshes(meshes);
    scene.set_materials(deduped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NODES_AND_MATERIALS: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"name": "stage", "nodes": [0]}],
        "nodes": [
            {"name": "hull", "translation": [1.0, 2.0, 3.0], "children": [1]},
            {"name": "turret", "scale": [2.0, 2.0, 2.0]}
        ],
        "materials": [
            {
                "name": "Paint",
                "doubleSided": true,
                "pbrMetallicRoughness": {
                    "baseColorFactor": [1.0, 0.0, 0.0, 1.0],
                    "metallicFactor": 0.5,
                    "roughnessFactor": 0.25
                }
            }
        ]
    }"#;

    #[test]
    fn test_decode_nodes_and_materials() {
        let scene = Importer::new()
            .import_bytes(NODES_AND_MATERIALS.as_bytes())
            .unwrap();

        assert_eq!(scene.root.name(), "stage");
        let hull = scene.root.find_node("hull").unwrap();
        assert_relative_eq!(hull.transform.translation.y, 2.0);
        let turret = scene.root.find_node("turret").unwrap();
        assert_relative_eq!(turret.transform.scale.x, 2.0);

        assert_eq!(scene.materials().len(), 1);
        let paint = &scene.materials()[0];
        assert_eq!(paint.name(), "Paint");
        assert_eq!(paint.color_hex(), "#ff0000");
        assert_relative_eq!(paint.metallic(), 0.5);
        assert!(paint.double_sided());
        assert_eq!(paint.kind(), MaterialKind::Pbr);
    }

    #[test]
    fn test_decode_unlit_extension() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "extensionsUsed": ["KHR_materials_unlit"],
            "scenes": [{"nodes": []}],
            "materials": [
                {
                    "name": "Flat",
                    "pbrMetallicRoughness": {"baseColorFactor": [0.0, 1.0, 0.0, 1.0]},
                    "extensions": {"KHR_materials_unlit": {}}
                }
            ]
        }"#;
        let scene = Importer::new().import_bytes(json.as_bytes()).unwrap();
        assert_eq!(scene.materials()[0].kind(), MaterialKind::Unlit);
    }

    #[test]
    fn test_garbage_bytes_fail_without_partial_scene() {
        let result = Importer::new().import_bytes(b"definitely not a gltf container");
        assert!(matches!(result, Err(Error::DecodeFailed { .. })));
    }

    #[test]
    fn test_empty_bytes_fail() {
        assert!(Importer::new().import_bytes(&[]).is_err());
    }

    #[test]
    fn test_unnamed_material_gets_indexed_name() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": []}],
            "materials": [{"pbrMetallicRoughness": {}}]
        }"#;
        let scene = Importer::new().import_bytes(json.as_bytes()).unwrap();
        assert_eq!(scene.materials()[0].name(), "material_0");
    }

    #[test]
    fn test_dedup_materials_collapses_identities() {
        let json = r#"{
            "asset": {"version": "2.0"},
            "scenes": [{"nodes": []}],
            "materials": [
                {"name": "Trim", "pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0]}},
                {"name": "Trim", "pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0], "roughnessFactor": 0.1}},
                {"name": "Trim", "pbrMetallicRoughness": {"baseColorFactor": [0.0, 0.0, 1.0, 1.0]}}
            ]
        }"#;
        let scene = Importer::new()
            .read_bytes(json.as_bytes())
            .with_steps(DecodeSteps::DEDUP_MATERIALS)
            .import()
            .unwrap();
        // Same name + color collapse; same name, different color survives.
        assert_eq!(scene.materials().len(), 2);
    }

    #[test]
    fn test_builder_step_accumulation() {
        let builder = ImportBuilder::new(&[])
            .with_steps(DecodeSteps::GENERATE_NORMALS)
            .add_steps(DecodeSteps::DEDUP_MATERIALS);
        assert!(builder.steps.contains(DecodeSteps::GENERATE_NORMALS));
        assert!(builder.steps.contains(DecodeSteps::DEDUP_MATERIALS));
    }
}
