//! POD (PowerVR scene) file support.
//!
//! Decoding happens in two stages:
//!
//! 1. `parser` turns the chunked byte stream into a `PodDocument` of flat
//!    record arrays, checking framing and record counts.
//! 2. `builder` resolves the index references between records and builds
//!    shared scene objects.
//!
//! ## Supported content
//!
//! - Node hierarchies with TRS or matrix animation channels
//! - Triangle list and strip meshes, interleaved or per-attribute vertex data
//! - Skinning through bone batches
//! - Materials with a diffuse texture reference
//! - Cameras and point, directional and spot lights
//!
//! Texture images are never loaded; only their file names are exposed.

pub mod builder;
pub mod document;
pub mod parser;
pub mod reader;
pub mod tags;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::{BuildError, BuildResult, BuiltScene, RefKind, SceneBuilder};
pub use document::{NodeCategory, PodDocument};
pub use parser::{parse_pod, ParseError, ParseResult, PodParser};
pub use reader::{ChunkReader, Marker, ReadError, ReadResult};
