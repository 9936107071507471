//! # Asset Prep
//!
//! Canonical model pipeline for browser-style 3D asset cataloging: decode an
//! asset, normalize it into a canonical pose and scale, capture descriptive
//! metadata and a cropped thumbnail, and re-serialize the result as a
//! self-contained GLB sized to a real-world target.
//!
//! ## Pipeline
//!
//! - **Decode**: [`Importer`] turns GLB/glTF bytes into an owned [`Scene`]
//!   hierarchy; [`loader::LoadTracker`] discards stale decode completions.
//! - **Normalize**: [`normalize()`] centers the model, snaps it to the
//!   ground plane, and scales its largest dimension to a fixed preview size.
//! - **Interact**: [`TransformSession`] sequences gizmo drags and the
//!   ground-snap policy around them.
//! - **Extract**: [`extract()`] collects the deduplicated material and color
//!   palette; [`thumbnail::capture()`] produces a transparent, auto-cropped
//!   thumbnail.
//! - **Export**: [`ExportBuilder`] bakes world transforms into geometry,
//!   applies the corrective real-world scale, and serializes a GLB.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use asset_prep::{normalize, ExportBuilder, Importer, NormalizeOptions};
//!
//! # fn main() -> asset_prep::Result<()> {
//! let bytes = std::fs::read("model.glb")?;
//! let mut scene = Importer::new().import_bytes(&bytes)?;
//!
//! let state = normalize(&mut scene, &NormalizeOptions::default());
//! let palette = asset_prep::palette::extract(&scene);
//! println!("{} materials, {} colors", palette.materials.len(), palette.colors.len());
//!
//! let glb = ExportBuilder::bake(&scene, &state)
//!     .with_target_scale(state.scale_factor(120.0)?)
//!     .to_glb()?;
//! std::fs::write("sized.glb", glb)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Re-export common types for convenience
pub use crate::{
    error::{Error, Result},
    importer::{DecodeSteps, ImportBuilder, Importer},
    scene::Scene,
    types::*,
};

pub use crate::exporter::ExportBuilder;

// Re-export normalization functionality
pub use crate::normalize::{normalize, NormalizationState, NormalizeOptions};

// Re-export palette extraction functionality
pub use crate::palette::{extract, Palette};

// Re-export interaction functionality
pub use crate::session::{GizmoMode, TransformSession};

// Re-export thumbnail functionality
pub use crate::thumbnail::{auto_crop, capture, CropOptions, FrameRenderer};

// Re-export scene data types
pub use crate::aabb::AABB;
pub use crate::material::{Material, MaterialDescriptor, MaterialKind};
pub use crate::mesh::Mesh;
pub use crate::node::{Node, Transform};

// Re-export catalog boundary types
pub use crate::catalog::{CatalogRecord, Category, InferredDetails};

// Core modules
pub mod error;
pub mod importer;
pub mod scene;
pub mod types;

// Component modules
pub mod material;
pub mod mesh;
pub mod node;

// Data structure modules
pub mod aabb;

// Pipeline modules
pub mod exporter;
pub mod loader;
pub mod normalize;
pub mod palette;
pub mod session;
pub mod thumbnail;

// Support modules
pub mod cache;
pub mod catalog;
pub mod queue;
