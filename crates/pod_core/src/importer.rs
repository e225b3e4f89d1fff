//! High-level POD importing.
//!
//! `PodImporter` is the main entry point. Construction reads and decodes the
//! file; scene objects are built on the first call that needs them (or
//! explicitly via `build_scene_objects`) and kept for the importer's
//! lifetime.
//!
//! # Example
//!
//! ```ignore
//! use pod_core::{PodImporter, SceneRoot, Skeleton};
//!
//! let mut importer = PodImporter::from_file("character.pod")?;
//! importer.modify_texture("body.pvr", "body.png");
//!
//! let mut root = SceneRoot::new("character");
//! importer.add_meshes_to_scene(&mut root)?;
//!
//! let mut skeleton = Skeleton::new("rig");
//! importer.add_bones_to_skeleton(&mut skeleton)?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pod_math::{Mat4Ext, Vec3};
use thiserror::Error;

use crate::config::{ImportOptions, ResourceBundle};
use crate::mesh::Mesh;
use crate::pod::builder::{BuildError, BuiltScene, SceneBuilder};
use crate::pod::document::PodDocument;
use crate::pod::parser::{parse_pod, ParseError};
use crate::query::QueryIndex;
use crate::scene::{Camera, Light, Material, SceneContainer, SceneNode};
use crate::texture::TextureOverrides;

/// Errors that can occur during POD importing.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Resource not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result of a keyed lookup.
#[derive(Clone, Copy, Debug)]
pub enum SceneObject<'a> {
    Node(&'a Arc<SceneNode>),
    Material(&'a Arc<Material>),
}

#[derive(Debug)]
struct Built {
    scene: BuiltScene,
    index: QueryIndex,
}

/// Importer for a single POD file.
#[derive(Debug)]
pub struct PodImporter {
    name: String,
    document: PodDocument,
    options: ImportOptions,
    overrides: TextureOverrides,
    built: Option<Built>,
}

impl PodImporter {
    /// Read and decode a POD file with default options.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        Self::from_file_with_options(path, ImportOptions::default())
    }

    /// Read and decode a POD file.
    pub fn from_file_with_options<P: AsRef<Path>>(path: P, options: ImportOptions) -> ImportResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ImportError::ResourceNotFound(path.to_path_buf()),
            _ => ImportError::Io(e),
        })?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed");

        let importer = Self::from_bytes_named(name, &bytes, options)?;
        log::info!(
            "Loaded POD {} ({} bytes): {} nodes, {} meshes, {} materials",
            path.display(),
            bytes.len(),
            importer.number_of_nodes(),
            importer.number_of_meshes(),
            importer.document.materials.len()
        );
        Ok(importer)
    }

    /// Decode a POD file found in `bundle` with default options.
    pub fn from_resource(name: &str, bundle: &ResourceBundle) -> ImportResult<Self> {
        Self::from_resource_with_options(name, bundle, ImportOptions::default())
    }

    /// Decode a POD file found in `bundle`.
    pub fn from_resource_with_options(
        name: &str,
        bundle: &ResourceBundle,
        options: ImportOptions,
    ) -> ImportResult<Self> {
        let path = bundle
            .resolve(name)
            .ok_or_else(|| ImportError::ResourceNotFound(PathBuf::from(name)))?;
        Self::from_file_with_options(path, options)
    }

    /// Decode POD bytes already in memory.
    pub fn from_bytes(bytes: &[u8], options: ImportOptions) -> ImportResult<Self> {
        Self::from_bytes_named("memory", bytes, options)
    }

    fn from_bytes_named(name: &str, bytes: &[u8], options: ImportOptions) -> ImportResult<Self> {
        let document = parse_pod(bytes)?;
        Ok(Self {
            name: name.to_string(),
            document,
            options,
            overrides: TextureOverrides::new(),
            built: None,
        })
    }

    /// Importer name (file stem of the source file).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &PodDocument {
        &self.document
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Build all scene objects. Later calls return the same objects.
    ///
    /// On failure nothing is kept and a later call retries.
    pub fn build_scene_objects(&mut self) -> ImportResult<&BuiltScene> {
        let built = match self.built.take() {
            Some(built) => built,
            None => {
                let scene = SceneBuilder::new(&self.document, &self.options).build()?;
                let index = QueryIndex::new(&scene);
                Built { scene, index }
            }
        };
        Ok(&self.built.insert(built).scene)
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Built scene, if `build_scene_objects` has run.
    pub fn scene(&self) -> Option<&BuiltScene> {
        self.built.as_ref().map(|b| &b.scene)
    }

    fn attach(
        &mut self,
        container: &mut dyn SceneContainer,
        what: &str,
        keep: &dyn Fn(&SceneNode) -> bool,
    ) -> ImportResult<usize> {
        let scene = self.build_scene_objects()?;
        let attached = scene.attach(container, keep);
        log::debug!("Attached {} {}", attached, what);
        Ok(attached)
    }

    /// Attach every mesh node. Mesh nodes nest only under mesh-node parents;
    /// the others become top-level children of `root`.
    pub fn add_meshes_to_scene(&mut self, root: &mut dyn SceneContainer) -> ImportResult<usize> {
        self.attach(root, "mesh nodes", &|node| node.kind.is_mesh())
    }

    /// Attach every node with the file's full hierarchy.
    pub fn add_nodes_to_scene(&mut self, root: &mut dyn SceneContainer) -> ImportResult<usize> {
        self.attach(root, "nodes", &|_| true)
    }

    /// Attach every bone node, nested only under bone parents.
    pub fn add_bones_to_skeleton(&mut self, skeleton: &mut dyn SceneContainer) -> ImportResult<usize> {
        self.attach(skeleton, "bones", &|node| node.kind.is_bone())
    }

    pub fn number_of_mesh_nodes(&self) -> usize {
        self.document.number_of_mesh_nodes()
    }

    pub fn number_of_nodes(&self) -> usize {
        self.document.number_of_nodes()
    }

    pub fn number_of_meshes(&self) -> usize {
        self.document.number_of_meshes()
    }

    pub fn number_of_cameras(&self) -> usize {
        self.document.number_of_cameras()
    }

    pub fn number_of_lights(&self) -> usize {
        self.document.number_of_lights()
    }

    pub fn number_of_frames(&self) -> usize {
        self.document.number_of_frames()
    }

    pub fn ambient_color(&self) -> Vec3 {
        self.document.ambient_color()
    }

    pub fn background_color(&self) -> Vec3 {
        self.document.background_color()
    }

    /// Built materials (empty before the build).
    pub fn materials(&self) -> &[Arc<Material>] {
        self.scene().map(|s| s.materials.as_slice()).unwrap_or(&[])
    }

    pub fn mesh_at(&self, index: usize) -> Option<&Arc<Mesh>> {
        let built = self.built.as_ref()?;
        built.index.mesh_at(&built.scene, index)
    }

    pub fn mesh_from_node_named(&self, name: &str) -> Option<&Arc<Mesh>> {
        let built = self.built.as_ref()?;
        built.index.mesh_from_node_named(&built.scene, name)
    }

    pub fn mesh_node_with_name(&self, name: &str) -> Option<&Arc<SceneNode>> {
        let built = self.built.as_ref()?;
        built.index.mesh_node_by_name(&built.scene, name)
    }

    pub fn node_with_name(&self, name: &str) -> Option<&Arc<SceneNode>> {
        let built = self.built.as_ref()?;
        built.index.node_by_name(&built.scene, name)
    }

    pub fn material_with_name(&self, name: &str) -> Option<&Arc<Material>> {
        let built = self.built.as_ref()?;
        built.index.material_by_name(&built.scene, name)
    }

    pub fn camera_at(&self, index: usize) -> Option<&Arc<Camera>> {
        let built = self.built.as_ref()?;
        built.index.camera_at(&built.scene, index)
    }

    pub fn light_at(&self, index: usize) -> Option<&Arc<Light>> {
        let built = self.built.as_ref()?;
        built.index.light_at(&built.scene, index)
    }

    /// Keyed lookup: a node with this name, otherwise a material.
    pub fn lookup(&self, key: &str) -> Option<SceneObject<'_>> {
        self.node_with_name(key)
            .map(SceneObject::Node)
            .or_else(|| self.material_with_name(key).map(SceneObject::Material))
    }

    /// Copy the frame-0 world position and direction of the node called
    /// `node_name` onto `light`. Returns `false` if there is no such node.
    pub fn configure_light(&self, light: &mut Light, node_name: &str) -> bool {
        let world = self
            .document
            .node_index_by_name(node_name)
            .and_then(|index| self.document.world_matrix(index, 0));

        match world {
            Some(world) => {
                light.position = world.position();
                light.direction = world.transform_direction(Vec3::NEG_Y);
                true
            }
            None => {
                log::warn!("Cannot configure light: no node named {:?}", node_name);
                false
            }
        }
    }

    /// Replace texture `original` with `replacement` wherever a material's
    /// texture is resolved, including materials already built.
    pub fn modify_texture(&mut self, original: &str, replacement: &str) {
        self.overrides.insert(original, replacement);
    }

    /// Texture file of `material` after overrides.
    pub fn texture_file_name<'a>(&'a self, material: &'a Material) -> Option<&'a str> {
        material.texture_file(&self.overrides)
    }

    pub fn texture_overrides(&self) -> &TextureOverrides {
        &self.overrides
    }

    /// Log a summary of the file contents.
    pub fn print_pod_info(&self) {
        log::info!("POD {}:\n{}", self.name, self.document);
    }

    /// Summary of the file contents.
    pub fn pod_info(&self) -> String {
        self.document.to_string()
    }
}
