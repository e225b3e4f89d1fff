//! POD Core - Scene importer for PowerVR POD files.
//!
//! This crate provides:
//!
//! - **Decoding**: `ChunkReader` and `parse_pod` turn POD bytes into a
//!   `PodDocument`
//! - **Scene building**: nodes, meshes with skinning, materials, cameras and
//!   lights, shared through `Arc`
//! - **Importing**: `PodImporter` with name/index queries, texture overrides
//!   and attachment into any `SceneContainer`
//!
//! # Example
//!
//! ```ignore
//! use pod_core::{PodImporter, SceneRoot};
//!
//! let mut importer = PodImporter::from_file("scene.pod")?;
//! let mut root = SceneRoot::new("scene");
//! importer.add_nodes_to_scene(&mut root)?;
//! println!("Attached {} nodes, {} frames",
//!     root.node_count(),
//!     importer.number_of_frames());
//! ```

pub mod config;
pub mod importer;
pub mod mesh;
pub mod pod;
pub mod query;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use config::{ConfigError, ImportOptions, ResourceBundle};
pub use importer::{ImportError, ImportResult, PodImporter, SceneObject};
pub use mesh::{BoneBatch, Mesh, Skin, VertexStream};
pub use pod::{parse_pod, BuildError, BuiltScene, ParseError, PodDocument, ReadError};
pub use query::QueryIndex;
pub use scene::{
    AttachedNode, Camera, Light, LocalTransform, Material, NodeKind, SceneContainer, SceneNode,
    SceneRoot, Skeleton, Transform,
};
pub use texture::TextureOverrides;
