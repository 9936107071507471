//! End-to-end pipeline properties
//!
//! Exercises the public API the way the cataloging flow does: decode,
//! normalize, interact, extract, capture, export, and decode again. The
//! worked sizing example (2x1x4 raw bounds, 100 mm target) runs through the
//! real GLB round trip rather than against intermediate math.

use approx::assert_relative_eq;
use asset_prep::loader::LoadTracker;
use asset_prep::thumbnail::{self, CropOptions, FrameRenderer};
use asset_prep::{
    extract, normalize, Color4D, DecodeSteps, ExportBuilder, GizmoMode, Importer, Material,
    MaterialKind, Mesh, Node, NormalizeOptions, Scene, TransformSession, Vector3D,
};
use image::{Rgba, RgbaImage};

/// A closed box spanning `min..max`, 8 vertices, 12 triangles
fn box_mesh(min: Vector3D, max: Vector3D) -> Mesh {
    let positions = vec![
        Vector3D::new(min.x, min.y, min.z),
        Vector3D::new(max.x, min.y, min.z),
        Vector3D::new(max.x, max.y, min.z),
        Vector3D::new(min.x, max.y, min.z),
        Vector3D::new(min.x, min.y, max.z),
        Vector3D::new(max.x, min.y, max.z),
        Vector3D::new(max.x, max.y, max.z),
        Vector3D::new(min.x, max.y, max.z),
    ];
    let indices = vec![
        0, 1, 2, 0, 2, 3, // -z
        4, 6, 5, 4, 7, 6, // +z
        0, 3, 7, 0, 7, 4, // -x
        1, 5, 6, 1, 6, 2, // +x
        0, 4, 5, 0, 5, 1, // -y
        3, 2, 6, 3, 6, 7, // +y
    ];
    Mesh::new("box", positions, indices)
}

fn box_scene(min: Vector3D, max: Vector3D) -> Scene {
    let mut root = Node::new("root");
    root.push_mesh_index(0);
    Scene::new(root, vec![box_mesh(min, max)], Vec::new())
}

#[test]
fn ground_snap_invariant() {
    let mut scene = box_scene(Vector3D::new(3.0, -2.0, 1.0), Vector3D::new(5.0, 4.0, 2.0));
    normalize(&mut scene, &NormalizeOptions::default());
    assert_relative_eq!(scene.world_bounds().min.y, 0.0, epsilon = 1e-5);
}

#[test]
fn centering_invariant() {
    let mut scene = box_scene(Vector3D::new(10.0, 0.0, -6.0), Vector3D::new(14.0, 2.0, -1.0));
    normalize(&mut scene, &NormalizeOptions::default());
    let center = scene.world_bounds().center();
    assert_relative_eq!(center.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(center.z, 0.0, epsilon = 1e-5);
}

#[test]
fn preview_scale_invariant() {
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::new(7.0, 3.0, 5.0));
    normalize(&mut scene, &NormalizeOptions::default());
    assert_relative_eq!(scene.world_bounds().max_dimension(), 2.0, epsilon = 1e-5);
}

#[test]
fn translate_drag_alone_keeps_manual_position() {
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::ONE);
    let mut state = normalize(&mut scene, &NormalizeOptions::default());
    let mut session = TransformSession::new();

    session.set_mode(GizmoMode::Translate);
    session.begin_drag();
    scene.root.transform.translation.y += 0.6;
    session.end_drag(&mut scene, &mut state);

    // The manual Y position survives; nothing forces min.y back to 0.
    assert_relative_eq!(scene.world_bounds().min.y, 0.6, epsilon = 1e-5);
    assert!(state.manual_position_override());
}

#[test]
fn rotate_drag_after_translate_reruns_ground_snap() {
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::ONE);
    let mut state = normalize(&mut scene, &NormalizeOptions::default());
    let mut session = TransformSession::new();

    session.set_mode(GizmoMode::Translate);
    session.begin_drag();
    scene.root.transform.translation.y += 0.6;
    session.end_drag(&mut scene, &mut state);

    session.set_mode(GizmoMode::Rotate);
    session.begin_drag();
    scene.root.transform.rotation = asset_prep::Quaternion::from_rotation_y(0.7);
    session.end_drag(&mut scene, &mut state);

    assert_relative_eq!(scene.world_bounds().min.y, 0.0, epsilon = 1e-5);
}

#[test]
fn scale_factor_round_trip_through_glb() {
    // Raw bounds 2x1x4: previewScale 0.5, originalHeight 1, target 100 mm.
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::new(2.0, 1.0, 4.0));
    let state = normalize(&mut scene, &NormalizeOptions::default());
    assert_relative_eq!(state.preview_scale(), 0.5);

    let scale_factor = state.scale_factor(100.0).unwrap();
    assert_relative_eq!(scale_factor, 100.0);

    let glb = ExportBuilder::bake(&scene, &state)
        .with_target_scale(scale_factor)
        .to_glb()
        .unwrap();

    let reimported = Importer::new().import_bytes(&glb).unwrap();
    assert_relative_eq!(reimported.world_bounds().size().y, 100.0, epsilon = 1e-2);
}

#[test]
fn exported_meshes_carry_identity_transforms() {
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::new(2.0, 1.0, 4.0));
    // A nested child with its own transform, to prove baking flattens it.
    let mut child = Node::new("lid");
    child.transform.translation = Vector3D::new(0.0, 1.0, 0.0);
    child.push_mesh_index(0);
    scene.root.push_child(child);

    let state = normalize(&mut scene, &NormalizeOptions::default());
    let glb = ExportBuilder::bake(&scene, &state)
        .with_target_scale(state.scale_factor(100.0).unwrap())
        .to_glb()
        .unwrap();
    let reimported = Importer::new().import_bytes(&glb).unwrap();

    // The corrective scale is the only non-identity transform in the file.
    let mut non_identity = Vec::new();
    reimported
        .root
        .visit_with_world(&asset_prep::Matrix4x4::IDENTITY, &mut |node, _| {
            if !node.transform.is_identity() {
                non_identity.push(node.transform);
            }
        });
    assert_eq!(non_identity.len(), 1);
    assert_relative_eq!(non_identity[0].scale.x, 200.0, epsilon = 1e-3);
    assert_eq!(non_identity[0].translation, Vector3D::ZERO);
}

#[test]
fn glb_round_trip_preserves_materials() {
    let mesh_a = box_mesh(Vector3D::ZERO, Vector3D::ONE).with_material(0);
    let mesh_b = box_mesh(Vector3D::new(2.0, 0.0, 0.0), Vector3D::new(3.0, 1.0, 1.0))
        .with_material(1);
    let mut root = Node::new("root");
    root.push_mesh_index(0);
    root.push_mesh_index(1);
    let mut scene = Scene::new(
        root,
        vec![mesh_a, mesh_b],
        vec![
            Material::new("Paint", Color4D::new(1.0, 0.0, 0.0, 1.0))
                .with_metallic(0.5)
                .with_roughness(0.25)
                .with_double_sided(true),
            Material::new("Flat", Color4D::new(0.0, 1.0, 0.0, 1.0)).with_kind(MaterialKind::Unlit),
        ],
    );

    let state = normalize(&mut scene, &NormalizeOptions::default());
    let glb = ExportBuilder::bake(&scene, &state).to_glb().unwrap();
    let reimported = Importer::new().import_bytes(&glb).unwrap();

    assert_eq!(reimported.materials().len(), 2);
    let paint = &reimported.materials()[0];
    assert_eq!(paint.name(), "Paint");
    assert_eq!(paint.color_hex(), "#ff0000");
    assert_relative_eq!(paint.metallic(), 0.5);
    assert_relative_eq!(paint.roughness(), 0.25);
    assert!(paint.double_sided());
    assert_eq!(reimported.materials()[1].kind(), MaterialKind::Unlit);
}

#[test]
fn generate_normals_step_fills_missing_normals() {
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::ONE);
    let state = normalize(&mut scene, &NormalizeOptions::default());
    let glb = ExportBuilder::bake(&scene, &state).to_glb().unwrap();

    let plain = Importer::new().import_bytes(&glb).unwrap();
    assert!(plain.meshes()[0].normals().is_none());

    let with_normals = Importer::new()
        .read_bytes(&glb)
        .with_steps(DecodeSteps::GENERATE_NORMALS)
        .import()
        .unwrap();
    let normals = with_normals.meshes()[0].normals().unwrap();
    assert_eq!(normals.len(), with_normals.meshes()[0].vertex_count());
}

#[test]
fn material_dedup_is_idempotent_and_collapses_identities() {
    let mesh_a = box_mesh(Vector3D::ZERO, Vector3D::ONE).with_material(0);
    let mesh_b = box_mesh(Vector3D::new(2.0, 0.0, 0.0), Vector3D::new(3.0, 1.0, 1.0))
        .with_material(1);
    let mut left = Node::new("left");
    left.push_mesh_index(0);
    let mut right = Node::new("right");
    right.push_mesh_index(1);
    let mut root = Node::new("root");
    root.push_child(left);
    root.push_child(right);

    // Two regions sharing name + color: one descriptor, not two.
    let scene = Scene::new(
        root,
        vec![mesh_a, mesh_b],
        vec![
            Material::new("Hull", Color4D::new(0.2, 0.3, 0.4, 1.0)),
            Material::new("Hull", Color4D::new(0.2, 0.3, 0.4, 1.0)),
        ],
    );

    let first = extract(&scene);
    let second = extract(&scene);
    assert_eq!(first, second);
    assert_eq!(first.materials.len(), 1);
    assert_eq!(first.colors.len(), 1);
}

#[test]
fn color_palette_excludes_black() {
    let mesh = box_mesh(Vector3D::ZERO, Vector3D::ONE).with_material(0);
    let mut root = Node::new("root");
    root.push_mesh_index(0);
    let scene = Scene::new(
        root,
        vec![mesh],
        vec![Material::new("Void", Color4D::new(0.0, 0.0, 0.0, 1.0))],
    );

    let palette = extract(&scene);
    assert_eq!(palette.materials.len(), 1);
    assert!(palette.colors.is_empty());
}

/// Deterministic stand-in for the render context: a fixed sprite on a
/// transparent frame, with begin/end bookkeeping the capture protocol drives.
struct SpriteRenderer {
    frame: RgbaImage,
    capturing: bool,
}

impl SpriteRenderer {
    fn new() -> Self {
        let mut frame = RgbaImage::new(120, 80);
        for y in 30..50 {
            for x in 40..70 {
                frame.put_pixel(x, y, Rgba([200, 120, 40, 255]));
            }
        }
        Self {
            frame,
            capturing: false,
        }
    }
}

impl FrameRenderer for SpriteRenderer {
    fn begin_capture(&mut self) {
        self.capturing = true;
    }

    fn render_frame(&mut self) -> asset_prep::Result<RgbaImage> {
        assert!(self.capturing);
        Ok(self.frame.clone())
    }

    fn end_capture(&mut self) {
        self.capturing = false;
    }
}

#[test]
fn thumbnail_capture_is_deterministic() {
    let mut renderer = SpriteRenderer::new();
    let options = CropOptions::default();

    let first = thumbnail::capture(&mut renderer, &options).unwrap();
    let second = thumbnail::capture(&mut renderer, &options).unwrap();

    assert_eq!(first.as_raw(), second.as_raw());
    assert!(!renderer.capturing);
    // Cropped to the 30x20 sprite plus default padding on every side.
    assert_eq!(first.dimensions(), (30 + 32, 20 + 32));
}

#[test]
fn empty_frame_returns_uncropped() {
    struct EmptyRenderer;
    impl FrameRenderer for EmptyRenderer {
        fn begin_capture(&mut self) {}
        fn render_frame(&mut self) -> asset_prep::Result<RgbaImage> {
            Ok(RgbaImage::new(64, 48))
        }
        fn end_capture(&mut self) {}
    }

    let cropped = thumbnail::capture(&mut EmptyRenderer, &CropOptions::default()).unwrap();
    assert_eq!(cropped.dimensions(), (64, 48));
}

const SCENE_A: &str = r#"{
    "asset": {"version": "2.0"},
    "scenes": [{"name": "scene-a", "nodes": []}]
}"#;

const SCENE_B: &str = r#"{
    "asset": {"version": "2.0"},
    "scenes": [{"name": "scene-b", "nodes": []}]
}"#;

#[test]
fn stale_decode_is_discarded_whichever_side_finishes_first() {
    // A's decode straggles in after B completed.
    let tracker = LoadTracker::new();
    let ticket_a = tracker.begin();
    let ticket_b = tracker.begin();
    assert!(tracker.complete(&ticket_b, Importer::new().import_bytes(SCENE_B.as_bytes()).unwrap()));
    assert!(!tracker.complete(&ticket_a, Importer::new().import_bytes(SCENE_A.as_bytes()).unwrap()));
    tracker.with_current(|scene| assert_eq!(scene.unwrap().root.name(), "scene-b"));

    // A finishes first but was already superseded when B began.
    let tracker = LoadTracker::new();
    let ticket_a = tracker.begin();
    let ticket_b = tracker.begin();
    assert!(!tracker.complete(&ticket_a, Importer::new().import_bytes(SCENE_A.as_bytes()).unwrap()));
    assert!(tracker.complete(&ticket_b, Importer::new().import_bytes(SCENE_B.as_bytes()).unwrap()));
    tracker.with_current(|scene| assert_eq!(scene.unwrap().root.name(), "scene-b"));
}

#[test]
fn stale_decode_discarded_under_thread_race() {
    use std::sync::Arc;
    use std::thread;

    let tracker: Arc<LoadTracker<&str>> = Arc::new(LoadTracker::new());
    let ticket_a = tracker.begin();
    let ticket_b = tracker.begin();

    let installer_a = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || tracker.complete(&ticket_a, "content-a"))
    };
    let installer_b = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || tracker.complete(&ticket_b, "content-b"))
    };

    assert!(!installer_a.join().unwrap());
    assert!(installer_b.join().unwrap());
    tracker.with_current(|v| assert_eq!(v, Some(&"content-b")));
}

#[test]
fn worked_example_end_to_end() {
    // Load: raw bounds X [0,2], Y [0,1], Z [0,4].
    let mut scene = box_scene(Vector3D::ZERO, Vector3D::new(2.0, 1.0, 4.0));
    let state = normalize(&mut scene, &NormalizeOptions::default());

    // Normalization: previewScale 0.5, bounds X [-0.5,0.5], Y [0,0.5], Z [-1,1].
    assert_relative_eq!(state.preview_scale(), 0.5);
    let bounds = scene.world_bounds();
    assert_relative_eq!(bounds.min.x, -0.5, epsilon = 1e-5);
    assert_relative_eq!(bounds.max.x, 0.5, epsilon = 1e-5);
    assert_relative_eq!(bounds.min.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(bounds.max.y, 0.5, epsilon = 1e-5);
    assert_relative_eq!(bounds.min.z, -1.0, epsilon = 1e-5);
    assert_relative_eq!(bounds.max.z, 1.0, epsilon = 1e-5);

    // targetHeightMm 100 over originalHeight 1: scaleFactor 100, final 200.
    let scale_factor = state.scale_factor(100.0).unwrap();
    let baked = ExportBuilder::bake(&scene, &state)
        .with_target_scale(scale_factor)
        .baked_scene()
        .unwrap();
    assert_relative_eq!(baked.root.transform.scale.x, 200.0, epsilon = 1e-3);
    assert_relative_eq!(baked.world_bounds().size().y, 100.0, epsilon = 1e-2);
}
