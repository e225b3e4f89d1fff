//! Scene graph construction from a decoded POD document.
//!
//! Nodes are instantiated into an index-addressed arena first; parent and
//! child edges are resolved afterwards, so references work regardless of
//! declaration order. Meshes, materials, cameras and lights are built once
//! per record and shared through `Arc`.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use pod_math::{Mat4, Mat4Ext, Vec3};
use thiserror::Error;

use super::document::{NodeCategory, PodDocument};
use super::tags::MATERIAL_BLENDING_ENABLED;
use super::types::{RawMesh, RawNode};
use crate::config::ImportOptions;
use crate::mesh::{BoneBatch, Mesh, Skin};
use crate::scene::{AttachedNode, Camera, Light, Material, NodeKind, SceneContainer, SceneNode};

/// What kind of record an index refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Parent,
    Mesh,
    Material,
    Texture,
    Light,
    Camera,
    Bone,
    Target,
    Vertex,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefKind::Parent => "parent node",
            RefKind::Mesh => "mesh",
            RefKind::Material => "material",
            RefKind::Texture => "texture",
            RefKind::Light => "light",
            RefKind::Camera => "camera",
            RefKind::Bone => "bone",
            RefKind::Target => "target node",
            RefKind::Vertex => "vertex",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building scene objects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("{owner} references {kind} {index}, but only {count} exist")]
    DanglingReference {
        kind: RefKind,
        owner: String,
        index: i64,
        count: usize,
    },

    #[error("Node {node:?} is its own ancestor")]
    ParentCycle { node: String },
}

impl BuildError {
    /// Whether the error is an unresolvable reference (cycles included).
    pub fn is_dangling_reference(&self) -> bool {
        matches!(
            self,
            BuildError::DanglingReference { .. } | BuildError::ParentCycle { .. }
        )
    }
}

/// Result type for build operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// World matrix of `index` at `frame`, walking up the parent chain.
///
/// The chain must be acyclic.
fn compose_world(
    mut index: usize,
    parent_of: impl Fn(usize) -> Option<usize>,
    local_of: impl Fn(usize) -> Mat4,
) -> Mat4 {
    let mut world = local_of(index);
    while let Some(parent) = parent_of(index) {
        world = local_of(parent) * world;
        index = parent;
    }
    world
}

/// All scene objects built from one document.
#[derive(Clone, Debug, Default)]
pub struct BuiltScene {
    /// Node arena, same order as the file
    pub nodes: Vec<Arc<SceneNode>>,

    /// One mesh per mesh record
    pub meshes: Vec<Arc<Mesh>>,

    /// One material per material record
    pub materials: Vec<Arc<Material>>,

    pub cameras: Vec<Arc<Camera>>,

    pub lights: Vec<Arc<Light>>,
}

impl BuiltScene {
    pub fn node(&self, index: usize) -> Option<&Arc<SceneNode>> {
        self.nodes.get(index)
    }

    /// World matrix of a node at `frame`.
    pub fn world_matrix(&self, node: usize, frame: usize) -> Option<Mat4> {
        self.nodes.get(node)?;
        Some(compose_world(
            node,
            |i| self.nodes[i].parent,
            |i| self.nodes[i].local_matrix(frame),
        ))
    }

    /// Mesh carried by a mesh node.
    pub fn mesh_for_node(&self, node: &SceneNode) -> Option<&Arc<Mesh>> {
        match node.kind {
            NodeKind::Mesh { mesh, .. } => self.meshes.get(mesh),
            _ => None,
        }
    }

    /// Material assigned to a mesh node.
    pub fn material_for_node(&self, node: &SceneNode) -> Option<&Arc<Material>> {
        match node.kind {
            NodeKind::Mesh {
                material: Some(material),
                ..
            } => self.materials.get(material),
            _ => None,
        }
    }

    /// Root nodes in file order.
    pub fn roots(&self) -> impl Iterator<Item = &Arc<SceneNode>> + '_ {
        self.nodes.iter().filter(|n| n.is_root())
    }

    fn subtree(&self, node: &Arc<SceneNode>, keep: &dyn Fn(&SceneNode) -> bool) -> AttachedNode {
        let mut attached = AttachedNode::new(Arc::clone(node));
        for &child in &node.children {
            let child = &self.nodes[child];
            if keep(child) {
                attached.children.push(self.subtree(child, keep));
            }
        }
        attached
    }

    /// Attach every node selected by `keep` to `container`.
    ///
    /// A selected node becomes a top-level child when its direct parent is
    /// not selected; otherwise it is nested under that parent. Returns the
    /// number of nodes attached.
    pub fn attach(&self, container: &mut dyn SceneContainer, keep: &dyn Fn(&SceneNode) -> bool) -> usize {
        let mut attached = 0;
        for node in &self.nodes {
            if !keep(node) {
                continue;
            }
            let parent_kept = node.parent.map_or(false, |p| keep(&self.nodes[p]));
            if parent_kept {
                continue;
            }

            let tree = self.subtree(node, keep);
            attached += tree.subtree_len();
            container.add_child(tree);
        }
        attached
    }
}

/// Builds a `BuiltScene` from a document.
pub struct SceneBuilder<'a> {
    document: &'a PodDocument,
    options: &'a ImportOptions,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(document: &'a PodDocument, options: &'a ImportOptions) -> Self {
        Self { document, options }
    }

    /// Resolve every reference and build all scene objects.
    pub fn build(self) -> BuildResult<BuiltScene> {
        let parents = self.resolve_parents()?;
        self.check_cycles(&parents)?;

        let mut children = vec![Vec::new(); parents.len()];
        for (index, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                children[*parent].push(index);
            }
        }

        let bone_nodes = self.resolve_bone_nodes()?;
        let materials = self.build_materials()?;
        let meshes = self.build_meshes(&parents)?;

        let mut nodes = Vec::with_capacity(self.document.nodes.len());
        for (raw, children) in self.document.nodes.iter().zip(children) {
            let kind = self.resolve_kind(raw, &bone_nodes)?;
            let bones = match kind {
                NodeKind::Mesh { mesh, .. } => meshes[mesh]
                    .skin
                    .as_ref()
                    .map(|skin| skin.bone_nodes().into_iter().collect())
                    .unwrap_or_default(),
                _ => Vec::new(),
            };

            nodes.push(Arc::new(SceneNode {
                index: raw.index,
                name: raw.name.clone(),
                kind,
                parent: parents[raw.index],
                highlighted: self.options.highlight_parents && !children.is_empty(),
                children,
                animation: raw.animation.clone(),
                bones,
            }));
        }

        let cameras = self.build_cameras(&nodes)?;
        let lights = self.build_lights(&nodes, &parents)?;

        log::info!(
            "Built {} nodes ({} bones), {} meshes, {} materials, {} cameras, {} lights",
            nodes.len(),
            bone_nodes.len(),
            meshes.len(),
            materials.len(),
            cameras.len(),
            lights.len()
        );

        Ok(BuiltScene {
            nodes,
            meshes,
            materials,
            cameras,
            lights,
        })
    }

    fn dangling(kind: RefKind, owner: impl Into<String>, index: i64, count: usize) -> BuildError {
        BuildError::DanglingReference {
            kind,
            owner: owner.into(),
            index,
            count,
        }
    }

    /// Resolve an index that must exist.
    fn required(kind: RefKind, owner: &str, index: i32, count: usize) -> BuildResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i < count => Ok(i),
            _ => Err(Self::dangling(kind, owner, index as i64, count)),
        }
    }

    /// Resolve an index where -1 means none.
    fn optional(kind: RefKind, owner: &str, index: i32, count: usize) -> BuildResult<Option<usize>> {
        if index == -1 {
            Ok(None)
        } else {
            Self::required(kind, owner, index, count).map(Some)
        }
    }

    fn resolve_parents(&self) -> BuildResult<Vec<Option<usize>>> {
        let count = self.document.nodes.len();
        self.document
            .nodes
            .iter()
            .map(|node| Self::optional(RefKind::Parent, &node.name, node.parent_index, count))
            .collect()
    }

    fn check_cycles(&self, parents: &[Option<usize>]) -> BuildResult<()> {
        const UNVISITED: u8 = 0;
        const ON_PATH: u8 = 1;
        const DONE: u8 = 2;

        let mut state = vec![UNVISITED; parents.len()];
        let mut path = Vec::new();

        for start in 0..parents.len() {
            let mut current = Some(start);
            while let Some(index) = current {
                match state[index] {
                    DONE => break,
                    ON_PATH => {
                        return Err(BuildError::ParentCycle {
                            node: self.document.nodes[index].name.clone(),
                        })
                    }
                    _ => {
                        state[index] = ON_PATH;
                        path.push(index);
                        current = parents[index];
                    }
                }
            }
            for index in path.drain(..) {
                state[index] = DONE;
            }
        }
        Ok(())
    }

    /// Node indices referenced from bone batches, range checked.
    fn resolve_bone_nodes(&self) -> BuildResult<BTreeSet<usize>> {
        let count = self.document.nodes.len();
        let mut bones = BTreeSet::new();
        for (mesh_index, mesh) in self.document.meshes.iter().enumerate() {
            for &bone in &mesh.bone_batches.bones {
                let owner = format!("mesh {}", mesh_index);
                bones.insert(Self::required(RefKind::Bone, &owner, bone, count)?);
            }
        }
        Ok(bones)
    }

    fn resolve_kind(&self, raw: &RawNode, bone_nodes: &BTreeSet<usize>) -> BuildResult<NodeKind> {
        let document = self.document;
        let owner = raw.name.as_str();

        let kind = match document.node_category(raw.index) {
            NodeCategory::Mesh => NodeKind::Mesh {
                mesh: Self::required(RefKind::Mesh, owner, raw.object_index, document.meshes.len())?,
                material: Self::optional(
                    RefKind::Material,
                    owner,
                    raw.material_index,
                    document.materials.len(),
                )?,
            },
            NodeCategory::Light => NodeKind::Light {
                light: Self::required(RefKind::Light, owner, raw.object_index, document.lights.len())?,
            },
            NodeCategory::Camera => NodeKind::Camera {
                camera: Self::required(RefKind::Camera, owner, raw.object_index, document.cameras.len())?,
            },
            NodeCategory::Other if bone_nodes.contains(&raw.index) => NodeKind::Bone,
            NodeCategory::Other => NodeKind::Structural,
        };
        Ok(kind)
    }

    fn build_materials(&self) -> BuildResult<Vec<Arc<Material>>> {
        let document = self.document;
        document
            .materials
            .iter()
            .map(|raw| -> BuildResult<Arc<Material>> {
                let owner = format!("material {:?}", raw.name);
                let texture = Self::optional(RefKind::Texture, &owner, raw.diffuse_texture, document.textures.len())?
                    .map(|i| document.textures[i].file_name.clone());

                Ok(Arc::new(Material {
                    name: raw.name.clone(),
                    diffuse_color: raw.diffuse_color,
                    ambient_color: raw.ambient_color,
                    specular_color: raw.specular_color,
                    opacity: raw.opacity,
                    shininess: raw.shininess,
                    blending_enabled: raw.flags & MATERIAL_BLENDING_ENABLED != 0,
                    blend: raw.blend,
                    texture,
                    flip_texture: self.options.flip_textures,
                }))
            })
            .collect()
    }

    fn raw_world(&self, parents: &[Option<usize>], index: usize) -> Mat4 {
        let nodes = &self.document.nodes;
        compose_world(
            index,
            |i| parents[i],
            |i| nodes[i].animation.local_transform(0).to_matrix(),
        )
    }

    fn build_meshes(&self, parents: &[Option<usize>]) -> BuildResult<Vec<Arc<Mesh>>> {
        let mut meshes = Vec::with_capacity(self.document.meshes.len());
        for (index, raw) in self.document.meshes.iter().enumerate() {
            let mut mesh = Mesh::from_raw(index, raw);
            let owner = format!("mesh {}", index);

            if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= mesh.vertex_count) {
                return Err(Self::dangling(RefKind::Vertex, owner, bad as i64, mesh.vertex_count));
            }

            if raw.is_skinned() {
                mesh.skin = Some(self.build_skin(raw, &mesh, &owner, parents)?);
            }

            log::debug!(
                "Mesh {}: {} vertices, {} triangles{}",
                index,
                mesh.vertex_count,
                mesh.triangle_count(),
                if mesh.is_skinned() { ", skinned" } else { "" }
            );
            meshes.push(Arc::new(mesh));
        }
        Ok(meshes)
    }

    fn build_skin(
        &self,
        raw: &RawMesh,
        mesh: &Mesh,
        owner: &str,
        parents: &[Option<usize>],
    ) -> BuildResult<Skin> {
        let batches: Vec<BoneBatch> = raw
            .bone_batches
            .batches()
            .map(|(bones, first_triangle)| {
                // Bone indices were range checked in resolve_bone_nodes
                let bones: Vec<usize> = bones.iter().map(|&b| b as usize).collect();
                let inverse_bind = bones
                    .iter()
                    .map(|&bone| self.raw_world(parents, bone).inverse())
                    .collect();
                BoneBatch {
                    bones,
                    inverse_bind,
                    first_triangle: first_triangle.max(0) as usize,
                }
            })
            .collect();

        let slots = batches.iter().map(|b| b.bones.len()).max().unwrap_or(0);
        let skin = Skin {
            batches,
            max_bones: (raw.bone_batches.max_bones as usize).max(slots),
        };

        let (Some(indices), Some(weights)) = (&mesh.bone_indices, &mesh.bone_weights) else {
            return Ok(skin);
        };
        let check = |vertex: usize, bone_count: usize| -> BuildResult<()> {
            for c in 0..indices.components.min(weights.components) {
                if weights.component(vertex, c).unwrap_or(0.0) == 0.0 {
                    continue;
                }
                let slot = indices.component_index(vertex, c).unwrap_or(0) as usize;
                if slot >= bone_count {
                    return Err(Self::dangling(RefKind::Bone, owner, slot as i64, bone_count));
                }
            }
            Ok(())
        };

        // A drawn vertex resolves its slots through the batch of its triangle
        for (triangle, corners) in mesh.indices.chunks_exact(3).enumerate() {
            let bone_count = skin
                .batch_for_triangle(triangle)
                .map_or(0, |batch| batch.bones.len());
            for &vertex in corners {
                check(vertex as usize, bone_count)?;
            }
        }
        for vertex in 0..mesh.vertex_count {
            check(vertex, slots)?;
        }

        Ok(skin)
    }

    /// First node of `category` whose object index is `object`.
    fn referencing_node(&self, category: NodeCategory, object: usize) -> Option<usize> {
        self.document.nodes.iter().position(|n| {
            self.document.node_category(n.index) == category && n.object_index == object as i32
        })
    }

    fn build_cameras(&self, nodes: &[Arc<SceneNode>]) -> BuildResult<Vec<Arc<Camera>>> {
        self.document
            .cameras
            .iter()
            .enumerate()
            .map(|(index, raw)| -> BuildResult<Arc<Camera>> {
                let owner = format!("camera {}", index);
                Ok(Arc::new(Camera {
                    node: self.referencing_node(NodeCategory::Camera, index),
                    target: Self::optional(RefKind::Target, &owner, raw.target_index, nodes.len())?,
                    fov: raw.fov,
                    near: raw.near,
                    far: raw.far,
                    fov_animation: raw.fov_animation.clone(),
                }))
            })
            .collect()
    }

    fn build_lights(&self, nodes: &[Arc<SceneNode>], parents: &[Option<usize>]) -> BuildResult<Vec<Arc<Light>>> {
        self.document
            .lights
            .iter()
            .enumerate()
            .map(|(index, raw)| -> BuildResult<Arc<Light>> {
                let owner = format!("light {}", index);
                let node = self.referencing_node(NodeCategory::Light, index);
                let world = node.map(|n| self.raw_world(parents, n)).unwrap_or(Mat4::IDENTITY);

                Ok(Arc::new(Light {
                    node,
                    target: Self::optional(RefKind::Target, &owner, raw.target_index, nodes.len())?,
                    color: raw.color,
                    light_type: raw.light_type,
                    constant_attenuation: raw.constant_attenuation,
                    linear_attenuation: raw.linear_attenuation,
                    quadratic_attenuation: raw.quadratic_attenuation,
                    falloff_angle: raw.falloff_angle,
                    falloff_exponent: raw.falloff_exponent,
                    position: world.position(),
                    direction: world.transform_direction(Vec3::NEG_Y),
                }))
            })
            .collect()
    }
}
