//! Decoded POD document.

use std::collections::BTreeSet;
use std::fmt;

use pod_math::{Mat4, Vec3};

use super::types::*;

/// Which record array a node's `object_index` points into.
///
/// POD stores mesh nodes first, then light nodes, then camera nodes, then
/// every other node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeCategory {
    Mesh,
    Light,
    Camera,
    Other,
}

/// The whole file as flat record arrays.
///
/// Immutable once produced by the parser. Contains no resolved references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PodDocument {
    pub version: String,
    pub header: SceneHeader,
    pub nodes: Vec<RawNode>,
    pub meshes: Vec<RawMesh>,
    pub materials: Vec<RawMaterial>,
    pub textures: Vec<RawTexture>,
    pub cameras: Vec<RawCamera>,
    pub lights: Vec<RawLight>,
}

impl PodDocument {
    pub fn number_of_nodes(&self) -> usize {
        self.header.num_nodes as usize
    }

    pub fn number_of_mesh_nodes(&self) -> usize {
        self.header.num_mesh_nodes as usize
    }

    pub fn number_of_meshes(&self) -> usize {
        self.header.num_meshes as usize
    }

    pub fn number_of_cameras(&self) -> usize {
        self.header.num_cameras as usize
    }

    pub fn number_of_lights(&self) -> usize {
        self.header.num_lights as usize
    }

    pub fn number_of_frames(&self) -> usize {
        self.header.num_frames.max(1) as usize
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.header.ambient_color
    }

    pub fn background_color(&self) -> Vec3 {
        self.header.background_color
    }

    /// Category of the node at `index`, derived from its position.
    pub fn node_category(&self, index: usize) -> NodeCategory {
        let mesh_end = self.number_of_mesh_nodes();
        let light_end = mesh_end + self.number_of_lights();
        let camera_end = light_end + self.number_of_cameras();

        if index < mesh_end {
            NodeCategory::Mesh
        } else if index < light_end {
            NodeCategory::Light
        } else if index < camera_end {
            NodeCategory::Camera
        } else {
            NodeCategory::Other
        }
    }

    /// Node indices referenced by any mesh's bone batch table.
    ///
    /// Negative entries are dropped; out-of-range ones are kept so the
    /// builder can report them.
    pub fn bone_node_indices(&self) -> BTreeSet<usize> {
        self.meshes
            .iter()
            .flat_map(|mesh| mesh.bone_batches.bones.iter())
            .filter(|&&bone| bone >= 0)
            .map(|&bone| bone as usize)
            .collect()
    }

    /// Whether the node at `index` is a skeleton joint.
    pub fn is_bone_node(&self, index: usize) -> bool {
        self.node_category(index) == NodeCategory::Other
            && self
                .meshes
                .iter()
                .any(|mesh| mesh.bone_batches.bones.contains(&(index as i32)))
    }

    /// File name of a material's diffuse texture, as stored in the file.
    pub fn texture_name(&self, material: &RawMaterial) -> Option<&str> {
        usize::try_from(material.diffuse_texture)
            .ok()
            .and_then(|i| self.textures.get(i))
            .map(|t| t.file_name.as_str())
    }

    /// Index of the last node called `name`.
    pub fn node_index_by_name(&self, name: &str) -> Option<usize> {
        self.nodes.iter().rposition(|n| n.name == name)
    }

    /// World matrix of the node at `index` computed from the raw records.
    ///
    /// Returns `None` when the parent chain leaves the node array or loops.
    pub fn world_matrix(&self, index: usize, frame: usize) -> Option<Mat4> {
        let mut node = self.nodes.get(index)?;
        let mut world = node.animation.local_transform(frame).to_matrix();

        for _ in 0..self.nodes.len() {
            if node.parent_index == -1 {
                return Some(world);
            }
            node = self.nodes.get(usize::try_from(node.parent_index).ok()?)?;
            world = node.animation.local_transform(frame).to_matrix() * world;
        }
        None
    }
}

fn kind_label(document: &PodDocument, index: usize) -> &'static str {
    match document.node_category(index) {
        NodeCategory::Mesh => "mesh",
        NodeCategory::Light => "light",
        NodeCategory::Camera => "camera",
        NodeCategory::Other if document.is_bone_node(index) => "bone",
        NodeCategory::Other => "node",
    }
}

impl fmt::Display for PodDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "=== POD {} ===", self.version)?;
        writeln!(
            f,
            "Nodes: {} (mesh nodes: {}), meshes: {}, materials: {}, textures: {}, cameras: {}, lights: {}, frames: {}",
            h.num_nodes,
            h.num_mesh_nodes,
            h.num_meshes,
            h.num_materials,
            h.num_textures,
            h.num_cameras,
            h.num_lights,
            self.number_of_frames()
        )?;
        writeln!(
            f,
            "Ambient: ({:.2}, {:.2}, {:.2}), background: ({:.2}, {:.2}, {:.2})",
            h.ambient_color.x,
            h.ambient_color.y,
            h.ambient_color.z,
            h.background_color.x,
            h.background_color.y,
            h.background_color.z
        )?;

        writeln!(f, "\n--- Nodes ---")?;
        for node in &self.nodes {
            writeln!(
                f,
                "  [{}] {} ({}) object {} material {} parent {}{}",
                node.index,
                node.name,
                kind_label(self, node.index),
                node.object_index,
                node.material_index,
                node.parent_index,
                if node.animation.is_animated() { " animated" } else { "" }
            )?;
        }

        writeln!(f, "\n--- Meshes ---")?;
        for (i, mesh) in self.meshes.iter().enumerate() {
            writeln!(
                f,
                "  [{}] {} vertices, {} faces, {} uv channels{}{}",
                i,
                mesh.vertex_count,
                mesh.face_count,
                mesh.uvs.len(),
                if mesh.interleaved.is_some() { ", interleaved" } else { "" },
                if mesh.is_skinned() {
                    format!(", skinned ({} bone batches)", mesh.bone_batches.bone_counts.len())
                } else {
                    String::new()
                }
            )?;
        }

        writeln!(f, "\n--- Materials ---")?;
        for (i, material) in self.materials.iter().enumerate() {
            writeln!(
                f,
                "  [{}] {} texture {} opacity {:.2}",
                i,
                material.name,
                self.texture_name(material).unwrap_or("<none>"),
                material.opacity
            )?;
        }

        writeln!(f, "\n--- Cameras ---")?;
        for (i, camera) in self.cameras.iter().enumerate() {
            writeln!(
                f,
                "  [{}] fov {:.3} near {:.2} far {:.2} target {}",
                i, camera.fov, camera.near, camera.far, camera.target_index
            )?;
        }

        writeln!(f, "\n--- Lights ---")?;
        for (i, light) in self.lights.iter().enumerate() {
            writeln!(
                f,
                "  [{}] {:?} color ({:.2}, {:.2}, {:.2}) target {}",
                i, light.light_type, light.color.x, light.color.y, light.color.z, light.target_index
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_layout() -> PodDocument {
        let mut document = PodDocument {
            header: SceneHeader {
                num_nodes: 6,
                num_mesh_nodes: 2,
                num_lights: 1,
                num_cameras: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        document.nodes = (0..6)
            .map(|i| RawNode {
                index: i,
                name: format!("node{}", i),
                parent_index: -1,
                ..Default::default()
            })
            .collect();
        document.meshes.push(RawMesh {
            bone_batches: BoneBatchTable {
                bones: vec![5],
                bone_counts: vec![1],
                triangle_offsets: vec![0],
                max_bones: 1,
                batch_count: 1,
            },
            ..Default::default()
        });
        document
    }

    #[test]
    fn test_node_categories_follow_position() {
        let document = document_with_layout();
        assert_eq!(document.node_category(0), NodeCategory::Mesh);
        assert_eq!(document.node_category(1), NodeCategory::Mesh);
        assert_eq!(document.node_category(2), NodeCategory::Light);
        assert_eq!(document.node_category(3), NodeCategory::Camera);
        assert_eq!(document.node_category(4), NodeCategory::Other);
        assert!(!document.is_bone_node(4));
        assert!(document.is_bone_node(5));
    }

    #[test]
    fn test_texture_name_lookup() {
        let mut document = PodDocument::default();
        document.textures.push(RawTexture {
            file_name: "skin.png".to_string(),
        });

        let textured = RawMaterial {
            diffuse_texture: 0,
            ..Default::default()
        };
        assert_eq!(document.texture_name(&textured), Some("skin.png"));
        assert_eq!(document.texture_name(&RawMaterial::default()), None);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let mut document = document_with_layout();
        document.nodes[4].name = "node1".to_string();
        assert_eq!(document.node_index_by_name("node1"), Some(4));
        assert_eq!(document.node_index_by_name("missing"), None);
    }

    #[test]
    fn test_display_lists_nodes() {
        let text = document_with_layout().to_string();
        assert!(text.contains("node5 (bone)"));
        assert!(text.contains("node2 (light)"));
    }

    #[test]
    fn test_world_matrix_from_records() {
        let mut document = document_with_layout();
        document.nodes[1].parent_index = 0;
        document.nodes[0].animation.positions = vec![Vec3::new(1.0, 0.0, 0.0)];
        document.nodes[1].animation.positions = vec![Vec3::new(0.0, 2.0, 0.0)];

        let world = document.world_matrix(1, 0).unwrap();
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 0.0));

        // Loops and dangling parents have no world matrix
        document.nodes[0].parent_index = 1;
        assert_eq!(document.world_matrix(1, 0), None);
        document.nodes[0].parent_index = 17;
        assert_eq!(document.world_matrix(1, 0), None);
        assert_eq!(document.world_matrix(40, 0), None);
    }

    #[test]
    fn test_zero_frames_reported_as_one() {
        let mut document = PodDocument::default();
        document.header.num_frames = 0;
        assert_eq!(document.number_of_frames(), 1);
    }
}
