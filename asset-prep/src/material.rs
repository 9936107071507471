//! Material representation and identity

use serde::{Deserialize, Serialize};

use crate::types::{color_to_hex, Color4D};

/// Shading model of a material
///
/// A tagged variant rather than a free-form type string: consumers branch on
/// the variant, never on a runtime type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    /// Physically-based metallic/roughness shading
    Pbr,
    /// Unlit (shadeless) color
    Unlit,
}

/// A surface material attached to mesh geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    kind: MaterialKind,
    base_color: Color4D,
    metallic: f32,
    roughness: f32,
    double_sided: bool,
}

impl Material {
    /// Create a new PBR material with the given name and base color
    pub fn new<S: Into<String>>(name: S, base_color: Color4D) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Pbr,
            base_color,
            metallic: 0.0,
            roughness: 1.0,
            double_sided: false,
        }
    }

    /// Set the shading model
    pub fn with_kind(mut self, kind: MaterialKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the metallic factor (clamped to `[0, 1]`)
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Set the roughness factor (clamped to `[0, 1]`)
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Mark the material as double sided
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Get the name of the material
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the shading model
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    /// Get the RGBA base color
    pub fn base_color(&self) -> Color4D {
        self.base_color
    }

    /// Get the metallic factor
    pub fn metallic(&self) -> f32 {
        self.metallic
    }

    /// Get the roughness factor
    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Whether the material is double sided
    pub fn double_sided(&self) -> bool {
        self.double_sided
    }

    /// Base color as a lowercase `#rrggbb` hex string
    pub fn color_hex(&self) -> String {
        color_to_hex(self.base_color)
    }

    /// Identity key used for deduplication.
    ///
    /// Two materials with the same name and base color collapse to one
    /// descriptor; same name with different colors stay distinct.
    pub fn identity_key(&self) -> (String, String) {
        (self.name.clone(), self.color_hex())
    }
}

/// A deduplicated, serializable summary of a material
///
/// This is the shape handed to the catalog record and the inference
/// collaborator; it carries no geometry references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    /// Material name as authored in the source asset
    pub name: String,
    /// Shading model
    pub kind: MaterialKind,
    /// Base color as `#rrggbb`
    pub color_hex: String,
    /// Metallic factor in `[0, 1]`
    pub metallic: f32,
    /// Roughness factor in `[0, 1]`
    pub roughness: f32,
}

impl From<&Material> for MaterialDescriptor {
    fn from(material: &Material) -> Self {
        Self {
            name: material.name().to_string(),
            kind: material.kind(),
            color_hex: material.color_hex(),
            metallic: material.metallic(),
            roughness: material.roughness(),
        }
    }
}
