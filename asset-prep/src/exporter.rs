//! Scene export functionality
//!
//! Export clones the live hierarchy, bakes every node's accumulated world
//! transform directly into its vertex buffers, and serializes the result as a
//! self-contained GLB. Downstream viewers may not replay a transform
//! hierarchy faithfully, so the exported meshes carry identity transforms;
//! the only transform left in the file is the corrective real-world scale on
//! the root.

use std::borrow::Cow;
use std::collections::BTreeMap;

use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

use crate::{
    error::{Error, Result},
    material::{Material, MaterialKind},
    mesh::Mesh,
    node::{Node, Transform},
    normalize::NormalizationState,
    scene::Scene,
    types::{Matrix4x4, Quaternion, Vector3D},
};

/// Builder for baking and serializing a normalized scene
///
/// ```no_run
/// use asset_prep::{normalize, ExportBuilder, Importer, NormalizeOptions};
///
/// # fn main() -> asset_prep::Result<()> {
/// let bytes = std::fs::read("model.glb")?;
/// let mut scene = Importer::new().import_bytes(&bytes)?;
/// let state = normalize(&mut scene, &NormalizeOptions::default());
///
/// let glb = ExportBuilder::bake(&scene, &state)
///     .with_target_scale(state.scale_factor(120.0)?)
///     .to_glb()?;
/// std::fs::write("sized.glb", glb)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ExportBuilder<'a> {
    scene: &'a Scene,
    preview_scale: f32,
    target_scale_factor: Option<f32>,
}

impl<'a> ExportBuilder<'a> {
    /// Start an export of the given scene in its current (normalized) pose
    pub fn bake(scene: &'a Scene, state: &NormalizationState) -> Self {
        Self {
            scene,
            preview_scale: state.preview_scale(),
            target_scale_factor: None,
        }
    }

    /// Request a real-world target scale for the exported asset.
    ///
    /// The factor is the one derived from the original bounds
    /// ([`NormalizationState::scale_factor`]). The preview scale already baked
    /// into the geometry is divided out here — applying the factor directly
    /// would double-apply it and mis-size the export.
    pub fn with_target_scale(mut self, scale_factor: f32) -> Self {
        self.target_scale_factor = Some(scale_factor);
        self
    }

    /// Clone the live scene and bake world transforms into its geometry.
    ///
    /// Every mesh instance gets its own baked vertex buffers (a mesh shared
    /// by several nodes is duplicated per instance, since their world
    /// matrices differ), every node transform is reset to identity, and the
    /// corrective uniform scale — if a target was requested — becomes the
    /// root's only transform. The live scene is never touched.
    pub fn baked_scene(&self) -> Result<Scene> {
        let mut clone = self.scene.clone();
        bake_world_transforms(&mut clone, self.scene.meshes())?;

        if let Some(scale_factor) = self.target_scale_factor {
            let final_scale = scale_factor / self.preview_scale;
            if !final_scale.is_finite() || final_scale <= 0.0 {
                return Err(Error::invalid_parameter(format!(
                    "final export scale must be positive and finite, got {final_scale}"
                )));
            }
            clone.root.transform.scale = Vector3D::splat(final_scale);
        }
        Ok(clone)
    }

    /// Bake and serialize to a self-contained GLB payload.
    ///
    /// Either returns a complete, valid binary or an error naming the cause;
    /// there is no partial-success payload.
    pub fn to_glb(self) -> Result<Vec<u8>> {
        let baked = self.baked_scene()?;
        serialize_glb(&baked)
    }
}

fn bake_world_transforms(clone: &mut Scene, source_meshes: &[Mesh]) -> Result<()> {
    let mut baked: Vec<Mesh> = Vec::new();
    let mut missing_index: Option<usize> = None;

    clone
        .root
        .visit_with_world_mut(&Matrix4x4::IDENTITY, &mut |node, world| {
            for index in node.mesh_indices_mut().iter_mut() {
                match source_meshes.get(*index) {
                    Some(mesh) => {
                        let mut instance = mesh.clone();
                        instance.bake_transform(world);
                        *index = baked.len();
                        baked.push(instance);
                    }
                    None => missing_index = missing_index.or(Some(*index)),
                }
            }
            node.transform = Transform::IDENTITY;
        });

    if let Some(index) = missing_index {
        return Err(Error::export_failed(format!(
            "mesh index {index} is outside the mesh table"
        )));
    }
    clone.set_meshes(baked);
    Ok(())
}

fn serialize_glb(scene: &Scene) -> Result<Vec<u8>> {
    let mut root = json::Root::default();
    root.asset = json::Asset {
        version: "2.0".to_string(),
        generator: Some(concat!("asset-prep ", env!("CARGO_PKG_VERSION")).to_string()),
        ..Default::default()
    };

    if scene
        .materials()
        .iter()
        .any(|m| m.kind() == MaterialKind::Unlit)
    {
        root.extensions_used.push("KHR_materials_unlit".to_string());
    }

    let material_indices: Vec<json::Index<json::Material>> = scene
        .materials()
        .iter()
        .map(|material| push_material(&mut root, material))
        .collect();

    let mut bin_data: Vec<u8> = Vec::new();
    let root_node = push_node(&mut root, &mut bin_data, scene, &scene.root, &material_indices)?;

    pad_to_4(&mut bin_data);
    if !bin_data.is_empty() {
        let buffer = root.push(json::Buffer {
            byte_length: USize64::from(bin_data.len()),
            uri: None,
            name: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        // Views were written against buffer 0 before it existed.
        for view in root.buffer_views.iter_mut() {
            view.buffer = buffer;
        }
    }

    let scene_index = root.push(json::Scene {
        nodes: vec![root_node],
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });
    root.scene = Some(scene_index);

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| Error::export_failed(format!("glTF serialization failed: {e}")))?;

    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: 0, // to_writer computes this
        },
        json: Cow::Owned(json_string.into_bytes()),
        bin: if bin_data.is_empty() {
            None
        } else {
            Some(Cow::Owned(bin_data))
        },
    };

    let mut bytes = Vec::new();
    glb.to_writer(&mut bytes)
        .map_err(|e| Error::export_failed(format!("GLB encoding failed: {e}")))?;
    Ok(bytes)
}

fn push_node(
    root: &mut json::Root,
    bin_data: &mut Vec<u8>,
    scene: &Scene,
    node: &Node,
    material_indices: &[json::Index<json::Material>],
) -> Result<json::Index<json::Node>> {
    let mut children = Vec::with_capacity(node.num_children());
    for child in node.children() {
        children.push(push_node(root, bin_data, scene, child, material_indices)?);
    }

    let mesh = if node.has_geometry() {
        Some(push_mesh(root, bin_data, scene, node, material_indices)?)
    } else {
        None
    };

    let transform = &node.transform;
    Ok(root.push(json::Node {
        mesh,
        children: if children.is_empty() {
            None
        } else {
            Some(children)
        },
        name: if node.name().is_empty() {
            None
        } else {
            Some(node.name().to_string())
        },
        translation: (transform.translation != Vector3D::ZERO)
            .then(|| transform.translation.to_array()),
        rotation: (transform.rotation != Quaternion::IDENTITY)
            .then(|| json::scene::UnitQuaternion(transform.rotation.to_array())),
        scale: (transform.scale != Vector3D::ONE).then(|| transform.scale.to_array()),
        ..Default::default()
    }))
}

/// One glTF mesh per mesh-bearing node, one primitive per owned mesh
fn push_mesh(
    root: &mut json::Root,
    bin_data: &mut Vec<u8>,
    scene: &Scene,
    node: &Node,
    material_indices: &[json::Index<json::Material>],
) -> Result<json::Index<json::Mesh>> {
    let mut primitives = Vec::with_capacity(node.mesh_indices().len());
    let mut name = None;

    for &mesh_index in node.mesh_indices() {
        let mesh = scene.mesh(mesh_index).ok_or_else(|| {
            Error::export_failed(format!("mesh index {mesh_index} is outside the mesh table"))
        })?;
        name.get_or_insert_with(|| mesh.name().to_string());
        primitives.push(push_primitive(root, bin_data, mesh, material_indices)?);
    }

    Ok(root.push(json::Mesh {
        primitives,
        weights: None,
        name,
        extensions: Default::default(),
        extras: Default::default(),
    }))
}

fn push_primitive(
    root: &mut json::Root,
    bin_data: &mut Vec<u8>,
    mesh: &Mesh,
    material_indices: &[json::Index<json::Material>],
) -> Result<json::mesh::Primitive> {
    if mesh.positions().is_empty() {
        return Err(Error::export_failed(format!(
            "mesh '{}' has no vertex positions",
            mesh.name()
        )));
    }
    let vertex_count = mesh.positions().len();
    if let Some(&bad) = mesh.indices().iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::export_failed(format!(
            "mesh '{}' index {bad} exceeds vertex count {vertex_count}",
            mesh.name()
        )));
    }
    let material = match mesh.material_index() {
        Some(index) => Some(*material_indices.get(index).ok_or_else(|| {
            Error::export_failed(format!(
                "mesh '{}' references material {index} outside the material table",
                mesh.name()
            ))
        })?),
        None => None,
    };

    let mut attributes = BTreeMap::new();

    // --- Positions ---
    let bounds = mesh.local_bounds();
    let byte_offset = bin_data.len();
    for position in mesh.positions() {
        for component in position.to_array() {
            bin_data.extend_from_slice(&component.to_le_bytes());
        }
    }
    let view = push_view(root, bin_data, byte_offset, json::buffer::Target::ArrayBuffer);
    let positions_accessor = root.push(json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(vertex_count),
        component_type: Valid(json::accessor::GenericComponentType(
            json::accessor::ComponentType::F32,
        )),
        type_: Valid(json::accessor::Type::Vec3),
        min: Some(json::Value::from(bounds.min.to_array().to_vec())),
        max: Some(json::Value::from(bounds.max.to_array().to_vec())),
        name: None,
        normalized: false,
        sparse: None,
        extensions: Default::default(),
        extras: Default::default(),
    });
    attributes.insert(Valid(json::mesh::Semantic::Positions), positions_accessor);

    // --- Normals ---
    if let Some(normals) = mesh.normals().filter(|n| n.len() == vertex_count) {
        let byte_offset = bin_data.len();
        for normal in normals {
            for component in normal.to_array() {
                bin_data.extend_from_slice(&component.to_le_bytes());
            }
        }
        let view = push_view(root, bin_data, byte_offset, json::buffer::Target::ArrayBuffer);
        let accessor = root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(vertex_count),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            type_: Valid(json::accessor::Type::Vec3),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        attributes.insert(Valid(json::mesh::Semantic::Normals), accessor);
    }

    // --- Texture coordinates ---
    if let Some(uvs) = mesh.uvs().filter(|uv| uv.len() == vertex_count) {
        let byte_offset = bin_data.len();
        for uv in uvs {
            for component in uv.to_array() {
                bin_data.extend_from_slice(&component.to_le_bytes());
            }
        }
        let view = push_view(root, bin_data, byte_offset, json::buffer::Target::ArrayBuffer);
        let accessor = root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(vertex_count),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::F32,
            )),
            type_: Valid(json::accessor::Type::Vec2),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
            extensions: Default::default(),
            extras: Default::default(),
        });
        attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), accessor);
    }

    // --- Indices ---
    let indices = if mesh.indices().is_empty() {
        None
    } else {
        let byte_offset = bin_data.len();
        for &index in mesh.indices() {
            bin_data.extend_from_slice(&index.to_le_bytes());
        }
        let view = push_view(
            root,
            bin_data,
            byte_offset,
            json::buffer::Target::ElementArrayBuffer,
        );
        Some(root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(mesh.indices().len()),
            component_type: Valid(json::accessor::GenericComponentType(
                json::accessor::ComponentType::U32,
            )),
            type_: Valid(json::accessor::Type::Scalar),
            min: None,
            max: None,
            name: None,
            normalized: false,
            sparse: None,
            extensions: Default::default(),
            extras: Default::default(),
        }))
    };

    Ok(json::mesh::Primitive {
        attributes,
        indices,
        material,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
        extensions: Default::default(),
        extras: Default::default(),
    })
}

fn push_material(root: &mut json::Root, material: &Material) -> json::Index<json::Material> {
    let extensions = (material.kind() == MaterialKind::Unlit).then(|| {
        json::extensions::material::Material {
            unlit: Some(json::extensions::material::Unlit {}),
            ..Default::default()
        }
    });

    root.push(json::Material {
        name: Some(material.name().to_string()),
        double_sided: material.double_sided(),
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_factor: json::material::PbrBaseColorFactor(material.base_color().to_array()),
            metallic_factor: json::material::StrengthFactor(material.metallic()),
            roughness_factor: json::material::StrengthFactor(material.roughness()),
            ..Default::default()
        },
        extensions,
        ..Default::default()
    })
}

fn push_view(
    root: &mut json::Root,
    bin_data: &mut Vec<u8>,
    byte_offset: usize,
    target: json::buffer::Target,
) -> json::Index<json::buffer::View> {
    pad_to_4(bin_data);
    let byte_length = bin_data.len() - byte_offset;
    root.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64::from(byte_length),
        byte_offset: Some(USize64::from(byte_offset)),
        byte_stride: None,
        target: Some(Valid(target)),
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    })
}

fn pad_to_4(bin_data: &mut Vec<u8>) {
    while bin_data.len() % 4 != 0 {
        bin_data.push(0);
    }
}
