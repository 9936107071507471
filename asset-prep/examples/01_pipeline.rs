//! Pipeline walkthrough: decode a model, normalize it, report its palette,
//! and export a copy sized to a 100 mm target height

use std::error::Error;

use asset_prep::{normalize, palette, DecodeSteps, ExportBuilder, Importer, NormalizeOptions};

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: 01_pipeline <model.glb>")?;
    let bytes = std::fs::read(&path)?;

    let mut scene = Importer::new()
        .read_bytes(&bytes)
        .with_steps(DecodeSteps::GENERATE_NORMALS | DecodeSteps::DEDUP_MATERIALS)
        .import()?;
    let state = normalize(&mut scene, &NormalizeOptions::default());

    println!("Loaded: {path}");
    println!("Original size: {:?}", state.original_bounds().size());
    println!(
        "Preview scale: {:.4}  (meshes: {}, vertices: {})",
        state.preview_scale(),
        scene.meshes().len(),
        scene.instance_vertex_count()
    );

    let palette = palette::extract(&scene);
    println!("Materials:");
    for descriptor in &palette.materials {
        println!("  {} {}", descriptor.color_hex, descriptor.name);
    }
    println!("Colors: {:?}", palette.colors);

    let glb = ExportBuilder::bake(&scene, &state)
        .with_target_scale(state.scale_factor(100.0)?)
        .to_glb()?;
    let out = format!("{path}.sized.glb");
    std::fs::write(&out, &glb)?;
    println!("Exported 100 mm-tall copy to {out} ({} bytes)", glb.len());

    Ok(())
}
