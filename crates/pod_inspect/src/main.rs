//! Load a POD file and print what the importer finds in it.
//!
//! Usage: pod_inspect <file.pod> [options.json] [old.png=new.png ...]

use std::env;

use anyhow::{Context, Result};
use pod_core::{ImportOptions, NodeKind, PodImporter, SceneRoot, Skeleton};
use pod_math::Mat4Ext;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: pod_inspect <file.pod> [options.json] [old.png=new.png ...]");
        println!("\nOptions file (JSON, all fields optional):");
        println!("  {{ \"highlight_parents\": false, \"flip_textures\": false }}");
        return Ok(());
    }

    let path = &args[1];
    let (replacements, rest): (Vec<&String>, Vec<&String>) =
        args[2..].iter().partition(|arg| arg.contains('='));
    let options = match rest.first() {
        Some(options_path) => ImportOptions::from_json_file(options_path)
            .with_context(|| format!("Failed to read options from {}", options_path))?,
        None => ImportOptions::default(),
    };

    let mut importer = PodImporter::from_file_with_options(path, options)
        .with_context(|| format!("Failed to load {}", path))?;
    for replacement in replacements {
        if let Some((original, new)) = replacement.split_once('=') {
            importer.modify_texture(original, new);
        }
    }
    println!("{}", importer.pod_info());

    importer
        .build_scene_objects()
        .with_context(|| format!("Failed to build scene objects from {}", path))?;

    let mut root = SceneRoot::new(importer.name());
    let attached = importer.add_nodes_to_scene(&mut root)?;
    let mut skeleton = Skeleton::new(importer.name());
    importer.add_bones_to_skeleton(&mut skeleton)?;

    println!("=== Built scene: {} ===", root.name);
    println!("Attached nodes: {}", attached);
    println!("Mesh nodes: {}", root.count_where(NodeKind::is_mesh));
    println!("Bones: {}", skeleton.bone_count());
    println!("Frames: {}", importer.number_of_frames());

    println!("\n--- Hierarchy (frame 0) ---");
    let worlds = root.world_matrices(0);
    let mut position_of = worlds.iter().map(|(index, world)| (*index, world.position()));
    root.walk(|node, depth| {
        let position = position_of.next().map(|(_, p)| p).unwrap_or_default();
        println!(
            "{}{} ({}) at ({:.2}, {:.2}, {:.2}){}",
            "  ".repeat(depth + 1),
            node.name(),
            node.node.kind.label(),
            position.x,
            position.y,
            position.z,
            if node.node.highlighted { " *" } else { "" }
        );
    });

    println!(
        "\n--- Materials ({} texture overrides) ---",
        importer.texture_overrides().len()
    );
    for material in importer.materials() {
        if !material.has_texture() {
            println!("  {} untextured", material.name);
            continue;
        }
        println!(
            "  {} texture {}{}",
            material.name,
            importer.texture_file_name(material).unwrap_or_default(),
            if material.blending_enabled { " (blended)" } else { "" }
        );
    }

    if let Some(scene) = importer.scene() {
        println!("\n--- Meshes ---");
        for mesh in &scene.meshes {
            let positions = mesh.position_values();
            if let Some(first) = positions.first() {
                let (min, max) = positions
                    .iter()
                    .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
                println!(
                    "  [{}] bounds ({:.2}, {:.2}, {:.2}) - ({:.2}, {:.2}, {:.2})",
                    mesh.index, min.x, min.y, min.z, max.x, max.y, max.z
                );
            }
            println!(
                "  [{}] {} vertices, {} triangles, {} uv channels{}",
                mesh.index,
                mesh.vertex_count,
                mesh.triangle_count(),
                mesh.uvs.len(),
                match &mesh.skin {
                    Some(skin) => format!(", {} bone batches", skin.batches.len()),
                    None => String::new(),
                }
            );
        }

        println!("\n--- Lights ---");
        for light in &scene.lights {
            println!(
                "  {:?} at ({:.2}, {:.2}, {:.2}) facing ({:.2}, {:.2}, {:.2})",
                light.light_type,
                light.position.x,
                light.position.y,
                light.position.z,
                light.direction.x,
                light.direction.y,
                light.direction.z
            );
        }
    }

    Ok(())
}
