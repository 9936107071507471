//! Headless walkthrough of the ground-snap policy around gizmo drags:
//! translate drags record placement intent, rotate/scale drags re-fit

use asset_prep::{
    normalize, GizmoMode, Mesh, Node, NormalizeOptions, Quaternion, Scene, TransformSession,
    Vector3D,
};

fn report(label: &str, scene: &Scene) {
    let bounds = scene.world_bounds();
    println!(
        "{label}: min.y = {:+.3}  center = ({:+.3}, {:+.3})",
        bounds.min.y,
        bounds.center().x,
        bounds.center().z
    );
}

fn main() {
    let mesh = Mesh::new(
        "slab",
        vec![Vector3D::ZERO, Vector3D::new(2.0, 1.0, 3.0)],
        vec![0, 1, 0],
    );
    let mut root = Node::new("root");
    root.push_mesh_index(0);
    let mut scene = Scene::new(root, vec![mesh], Vec::new());

    let mut state = normalize(&mut scene, &NormalizeOptions::default());
    report("normalized", &scene);

    let mut session = TransformSession::new();

    // A translate drag lifts the model; the manual position survives.
    session.set_mode(GizmoMode::Translate);
    session.begin_drag();
    scene.root.transform.translation.y += 0.4;
    session.end_drag(&mut scene, &mut state);
    report("after translate drag", &scene);

    // A rotate drag afterwards still re-fits the model to the ground.
    session.set_mode(GizmoMode::Rotate);
    session.begin_drag();
    scene.root.transform.rotation = Quaternion::from_rotation_z(0.5);
    session.end_drag(&mut scene, &mut state);
    report("after rotate drag", &scene);

    // Explicit reset clears the override and re-centers everything.
    session.reset_position(&mut scene, &mut state);
    report("after reset", &scene);
}
