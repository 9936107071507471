//! Material and color palette extraction

use std::collections::HashSet;

use crate::{
    material::MaterialDescriptor,
    scene::Scene,
};

/// Sentinel treated as "no color" rather than a true material color
const BLACK_HEX: &str = "#000000";

/// Deduplicated materials and colors in hierarchy traversal order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    /// One descriptor per distinct `(name, color)` material identity
    pub materials: Vec<MaterialDescriptor>,
    /// Unique `#rrggbb` colors, insertion-ordered, excluding pure black
    pub colors: Vec<String>,
}

/// Walk the scene and collect its material palette.
///
/// Traversal order is node-hierarchy order (parents before children, authored
/// sibling order), so the result is deterministic for an unmodified scene.
/// The first occurrence of a `(name, color)` identity wins; later duplicates
/// are dropped silently. Exact `#000000` never enters the color list — it is
/// the default/no-color sentinel, not a palette entry. Consumers must not
/// assume alphabetical or frequency ordering.
pub fn extract(scene: &Scene) -> Palette {
    let mut palette = Palette::default();
    let mut seen_materials: HashSet<(String, String)> = HashSet::new();
    let mut seen_colors: HashSet<String> = HashSet::new();

    scene.for_each_mesh_instance(&mut |_, _, mesh| {
        let Some(material_index) = mesh.material_index() else {
            return;
        };
        let Some(material) = scene.material(material_index) else {
            return;
        };

        let key = material.identity_key();
        if seen_materials.insert(key) {
            palette.materials.push(MaterialDescriptor::from(material));
        }

        let hex = material.color_hex();
        if hex != BLACK_HEX && seen_colors.insert(hex.clone()) {
            palette.colors.push(hex);
        }
    });

    palette
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        material::Material,
        mesh::Mesh,
        node::Node,
        types::{Color4D, Vector3D},
    };

    fn tri(material_index: usize) -> Mesh {
        Mesh::new(
            "tri",
            vec![Vector3D::ZERO, Vector3D::X, Vector3D::Y],
            vec![0, 1, 2],
        )
        .with_material(material_index)
    }

    fn two_region_scene(materials: Vec<Material>, indices: [usize; 2]) -> Scene {
        let mut root = Node::new("root");
        let mut first = Node::new("first");
        first.push_mesh_index(0);
        let mut second = Node::new("second");
        second.push_mesh_index(1);
        root.push_child(first);
        root.push_child(second);
        Scene::new(root, vec![tri(indices[0]), tri(indices[1])], materials)
    }

    #[test]
    fn test_same_name_and_color_collapse() {
        let materials = vec![
            Material::new("Paint", Color4D::new(1.0, 0.0, 0.0, 1.0)),
            Material::new("Paint", Color4D::new(1.0, 0.0, 0.0, 1.0)),
        ];
        let palette = extract(&two_region_scene(materials, [0, 1]));
        assert_eq!(palette.materials.len(), 1);
        assert_eq!(palette.colors, vec!["#ff0000"]);
    }

    #[test]
    fn test_same_name_different_color_stay_distinct() {
        let materials = vec![
            Material::new("Paint", Color4D::new(1.0, 0.0, 0.0, 1.0)),
            Material::new("Paint", Color4D::new(0.0, 1.0, 0.0, 1.0)),
        ];
        let palette = extract(&two_region_scene(materials, [0, 1]));
        assert_eq!(palette.materials.len(), 2);
        assert_eq!(palette.colors, vec!["#ff0000", "#00ff00"]);
    }

    #[test]
    fn test_black_only_scene_yields_empty_colors() {
        let materials = vec![Material::new("Void", Color4D::new(0.0, 0.0, 0.0, 1.0))];
        let palette = extract(&two_region_scene(materials, [0, 0]));
        assert_eq!(palette.materials.len(), 1);
        assert!(palette.colors.is_empty());
    }

    #[test]
    fn test_traversal_order_preserved() {
        let materials = vec![
            Material::new("Zebra", Color4D::new(0.5, 0.5, 0.5, 1.0)),
            Material::new("Apple", Color4D::new(1.0, 0.0, 0.0, 1.0)),
        ];
        let palette = extract(&two_region_scene(materials, [0, 1]));
        // Insertion order, never sorted.
        assert_eq!(palette.materials[0].name, "Zebra");
        assert_eq!(palette.materials[1].name, "Apple");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let materials = vec![
            Material::new("A", Color4D::new(0.2, 0.4, 0.6, 1.0)),
            Material::new("B", Color4D::new(0.6, 0.4, 0.2, 1.0)),
        ];
        let scene = two_region_scene(materials, [0, 1]);
        assert_eq!(extract(&scene), extract(&scene));
    }

    #[test]
    fn test_mesh_without_material_is_skipped() {
        let mut root = Node::new("root");
        root.push_mesh_index(0);
        let scene = Scene::new(
            root,
            vec![Mesh::new("bare", vec![Vector3D::ZERO], vec![0, 0, 0])],
            Vec::new(),
        );
        let palette = extract(&scene);
        assert!(palette.materials.is_empty());
        assert!(palette.colors.is_empty());
    }
}
