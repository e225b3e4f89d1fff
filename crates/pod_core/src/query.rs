//! Name and index lookups over a built scene.

use std::collections::HashMap;
use std::sync::Arc;

use crate::mesh::Mesh;
use crate::pod::builder::BuiltScene;
use crate::scene::{Camera, Light, Material, SceneNode};

/// Name tables built once after the scene is built.
///
/// Duplicate names resolve to the last node or material carrying them.
#[derive(Clone, Debug, Default)]
pub struct QueryIndex {
    nodes: HashMap<String, usize>,
    mesh_nodes: HashMap<String, usize>,
    materials: HashMap<String, usize>,
}

impl QueryIndex {
    pub fn new(scene: &BuiltScene) -> Self {
        let mut index = Self::default();

        for node in &scene.nodes {
            if let Some(previous) = index.nodes.insert(node.name.clone(), node.index) {
                log::warn!(
                    "Duplicate node name {:?} (nodes {} and {}), using the last",
                    node.name,
                    previous,
                    node.index
                );
            }
            if node.kind.is_mesh() {
                index.mesh_nodes.insert(node.name.clone(), node.index);
            }
        }

        for (i, material) in scene.materials.iter().enumerate() {
            if index.materials.insert(material.name.clone(), i).is_some() {
                log::warn!("Duplicate material name {:?}, using the last", material.name);
            }
        }

        index
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.get(name).copied()
    }

    pub fn material_index(&self, name: &str) -> Option<usize> {
        self.materials.get(name).copied()
    }

    pub fn node_by_name<'s>(&self, scene: &'s BuiltScene, name: &str) -> Option<&'s Arc<SceneNode>> {
        scene.nodes.get(self.node_index(name)?)
    }

    /// Mesh node called `name`; other node kinds with that name are ignored.
    pub fn mesh_node_by_name<'s>(&self, scene: &'s BuiltScene, name: &str) -> Option<&'s Arc<SceneNode>> {
        scene.nodes.get(*self.mesh_nodes.get(name)?)
    }

    pub fn mesh_at<'s>(&self, scene: &'s BuiltScene, index: usize) -> Option<&'s Arc<Mesh>> {
        scene.meshes.get(index)
    }

    /// Mesh carried by the node called `name`.
    pub fn mesh_from_node_named<'s>(&self, scene: &'s BuiltScene, name: &str) -> Option<&'s Arc<Mesh>> {
        scene.mesh_for_node(self.node_by_name(scene, name)?)
    }

    pub fn material_by_name<'s>(&self, scene: &'s BuiltScene, name: &str) -> Option<&'s Arc<Material>> {
        scene.materials.get(self.material_index(name)?)
    }

    pub fn camera_at<'s>(&self, scene: &'s BuiltScene, index: usize) -> Option<&'s Arc<Camera>> {
        scene.cameras.get(index)
    }

    pub fn light_at<'s>(&self, scene: &'s BuiltScene, index: usize) -> Option<&'s Arc<Light>> {
        scene.lights.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportOptions;
    use crate::pod::builder::SceneBuilder;
    use crate::pod::fixtures::{lit_scene, torso_scene, SceneSpec};
    use crate::pod::parser::parse_pod;

    fn built(spec: &SceneSpec) -> BuiltScene {
        let document = parse_pod(&spec.to_bytes()).unwrap();
        SceneBuilder::new(&document, &ImportOptions::default())
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookups_by_name() {
        let scene = built(&torso_scene());
        let index = QueryIndex::new(&scene);

        assert_eq!(index.node_by_name(&scene, "torso").map(|n| n.index), Some(0));
        assert!(index.node_by_name(&scene, "spine").is_some());
        assert!(index.node_by_name(&scene, "tail").is_none());

        assert!(index.mesh_node_by_name(&scene, "torso").is_some());
        assert!(index.mesh_node_by_name(&scene, "spine").is_none());

        let mesh = index.mesh_from_node_named(&scene, "torso").unwrap();
        assert!(Arc::ptr_eq(mesh, index.mesh_at(&scene, 0).unwrap()));
        assert!(index.mesh_from_node_named(&scene, "root").is_none());

        assert_eq!(
            index.material_by_name(&scene, "skin").and_then(|m| m.texture.clone()),
            Some("torso.png".to_string())
        );
    }

    #[test]
    fn test_lookups_by_index() {
        let scene = built(&lit_scene());
        let index = QueryIndex::new(&scene);
        assert!(index.camera_at(&scene, 0).is_some());
        assert!(index.camera_at(&scene, 1).is_none());
        assert!(index.light_at(&scene, 0).is_some());
        assert!(index.mesh_at(&scene, 1).is_none());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let mut spec = lit_scene();
        spec.nodes[3].name = "box_a".to_string();
        let scene = built(&spec);
        let index = QueryIndex::new(&scene);

        assert_eq!(index.node_index("box_a"), Some(3));
        // The mesh-node table only sees mesh nodes
        assert_eq!(index.mesh_node_by_name(&scene, "box_a").map(|n| n.index), Some(0));
    }
}
