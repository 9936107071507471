//! Catalog boundary types
//!
//! The pipeline produces one logical catalog record per uploaded asset but
//! never stores it; persistence, storage addressing, and the inference
//! endpoint are external collaborators. What lives here is the record shape,
//! the fixed category set with its `misc` fallback, and a tolerant reader for
//! the inference collaborator's JSON response — inference failures must never
//! block an upload.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::material::MaterialDescriptor;

/// Fixed category set for cataloged assets
///
/// Inference may suggest a category, but anything outside this set collapses
/// to [`Category::Misc`] rather than growing the taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Characters, creatures, figurines
    Figure,
    /// Vehicles of any era
    Vehicle,
    /// Buildings and other structures
    Building,
    /// Ground pieces, rocks, vegetation
    Terrain,
    /// Hand props and standalone objects
    Prop,
    /// Everything else
    #[default]
    Misc,
}

impl Category {
    /// Every category, in display order
    pub const ALL: [Category; 6] = [
        Category::Figure,
        Category::Vehicle,
        Category::Building,
        Category::Terrain,
        Category::Prop,
        Category::Misc,
    ];

    /// Stable lowercase label (also the storage path segment)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Figure => "figure",
            Category::Vehicle => "vehicle",
            Category::Building => "building",
            Category::Terrain => "terrain",
            Category::Prop => "prop",
            Category::Misc => "misc",
        }
    }

    /// Map a free-form label onto the fixed set.
    ///
    /// Matching is case-insensitive and whitespace-tolerant; any label
    /// outside the set maps to `Misc`. This is the inference-failure
    /// fallback, so it never errors.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "figure" => Category::Figure,
            "vehicle" => Category::Vehicle,
            "building" => Category::Building,
            "terrain" => Category::Terrain,
            "prop" => Category::Prop,
            "misc" => Category::Misc,
            other => {
                if !other.is_empty() {
                    warn!(label = other, "unknown category label, using misc");
                }
                Category::Misc
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields returned by the inference collaborator
///
/// All fields are optional; a missing or malformed field falls back to its
/// default and leaves any previously entered manual value for the caller to
/// keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferredDetails {
    /// Suggested display name
    pub suggested_name: Option<String>,
    /// Estimated real-world height in millimeters
    pub estimated_height_mm: Option<f32>,
    /// Descriptive tags
    pub tags: Vec<String>,
    /// Raw category label as returned (resolve via [`InferredDetails::category`])
    pub category_label: Option<String>,
    /// Dominant colors as `#rrggbb` strings
    pub dominant_colors: Vec<String>,
    /// One-line description
    pub description: Option<String>,
}

impl InferredDetails {
    /// Read an inference response leniently.
    ///
    /// Unparseable JSON yields the empty default; individually malformed
    /// fields are dropped field-by-field. This path must never fail the
    /// upload pipeline, so there is no error return.
    pub fn from_json(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "inference response was not valid JSON, ignoring");
                return Self::default();
            }
        };

        let string_field = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let string_list = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| item.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            suggested_name: string_field("name"),
            estimated_height_mm: value
                .get("height_mm")
                .and_then(|v| v.as_f64())
                .map(|h| h as f32)
                .filter(|h| h.is_finite() && *h > 0.0),
            tags: string_list("tags"),
            category_label: string_field("category"),
            dominant_colors: string_list("colors"),
            description: string_field("description"),
        }
    }

    /// Resolve the suggested category against the fixed set
    pub fn category(&self) -> Category {
        self.category_label
            .as_deref()
            .map(Category::from_label)
            .unwrap_or_default()
    }
}

/// The logical record produced for one uploaded asset
///
/// Serialized field names match the catalog index's JSON convention
/// (camelCase). The record is handed to the storage/persistence
/// collaborators; this crate never writes it anywhere itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Display name
    pub name: String,
    /// Stable retrieval URL returned by the storage collaborator
    pub storage_url: String,
    /// Resolved category
    pub category: Category,
    /// Descriptive tags
    pub tags: Vec<String>,
    /// Cropped thumbnail, PNG-encoded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thumbnail_png: Vec<u8>,
    /// Deduplicated material descriptors
    pub materials: Vec<MaterialDescriptor>,
    /// Ordered color palette
    pub colors: Vec<String>,
    /// Target real-world height, if one was entered
    pub target_height_mm: Option<f32>,
    /// Derived scale factor (target height over original height)
    pub scale_factor: Option<f32>,
    /// One-line description
    pub description: String,
    /// Upload timestamp, ISO-8601, supplied by the caller
    pub uploaded_at: String,
}
