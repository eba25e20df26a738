//! Example: Dumping the chunk hierarchy of a Pure3D file
//!
//! Prints the chunk tree, then a summary of the assembled model and its
//! animations.
//!
//! Usage: cargo run --example dump_hierarchy -- <path_to_p3d_file>

use std::env;

use anyhow::{Context, bail};
use pure3d::{AssemblyOptions, Model, Pure3dFile};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        bail!("Usage: dump_hierarchy <path_to_p3d_file>");
    };

    let file = Pure3dFile::load(&path).with_context(|| format!("Failed to load {path}"))?;
    print!("{}", file.tree().hierarchy());

    let model = Model::assemble(&file, &AssemblyOptions::default())
        .with_context(|| format!("Failed to assemble {path}"))?;

    println!();
    println!("Bones: {}", model.bones.len());
    for (index, bone) in model.bones.iter().enumerate() {
        println!("  [{index}] {} (parent {})", bone.name, bone.parent);
    }

    println!(
        "Vertices: {}, triangles: {}",
        model.vertices.len(),
        model.indices.len() / 3
    );
    for submesh in &model.submeshes {
        println!(
            "  {} indices from {} with shader '{}' (texture {})",
            submesh.index_count,
            submesh.index_start,
            submesh.shader_name,
            submesh.texture_name.as_deref().unwrap_or("none")
        );
    }

    for animation in &model.animations {
        println!(
            "Animation '{}': {} frames at {} fps ({:.2}s{})",
            animation.name,
            animation.frame_count,
            animation.frame_rate,
            animation.length(),
            if animation.cyclic { ", cyclic" } else { "" }
        );
    }

    Ok(())
}
