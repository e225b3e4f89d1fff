//! Scene graph types produced by the importer.
//!
//! Built nodes live in an index-addressed arena inside `BuiltScene`; the
//! types here describe a single node, its transform and the shared objects
//! it refers to. `SceneContainer` is the seam through which built nodes are
//! handed to a rendering engine.

use std::sync::Arc;

use pod_math::{Mat4, Quat, Vec3};

use crate::pod::types::{BlendState, LightType, NodeAnimation};
use crate::texture::TextureOverrides;

/// One frame of a node's position, rotation and scale channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    /// The channel values a node without animation data falls back to.
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Local matrix `T * R * S`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A node's transform relative to its parent for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalTransform {
    /// Separate translation, rotation and scale
    Trs(Transform),
    /// Raw matrix exported as-is
    Matrix(Mat4),
}

impl Default for LocalTransform {
    fn default() -> Self {
        LocalTransform::Trs(Transform::default())
    }
}

impl LocalTransform {
    pub fn to_matrix(&self) -> Mat4 {
        match self {
            LocalTransform::Trs(transform) => transform.to_matrix(),
            LocalTransform::Matrix(matrix) => *matrix,
        }
    }
}

/// What a built node represents, with indices into the scene's arenas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Mesh {
        mesh: usize,
        material: Option<usize>,
    },
    Light {
        light: usize,
    },
    Camera {
        camera: usize,
    },
    /// Referenced by a skinned mesh's bone batches
    Bone,
    /// Grouping node with no payload
    Structural,
}

impl NodeKind {
    pub fn is_mesh(&self) -> bool {
        matches!(self, NodeKind::Mesh { .. })
    }

    pub fn is_bone(&self) -> bool {
        matches!(self, NodeKind::Bone)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Mesh { .. } => "mesh",
            NodeKind::Light { .. } => "light",
            NodeKind::Camera { .. } => "camera",
            NodeKind::Bone => "bone",
            NodeKind::Structural => "node",
        }
    }
}

/// A node of the built scene graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    /// Position in the node arena (same as in the file)
    pub index: usize,

    pub name: String,

    pub kind: NodeKind,

    /// Parent node index (`None` = root)
    pub parent: Option<usize>,

    /// Child node indices in file order
    pub children: Vec<usize>,

    /// Local transform per frame
    pub animation: NodeAnimation,

    /// Set for parent nodes when `ImportOptions::highlight_parents` is on
    pub highlighted: bool,

    /// Distinct bone nodes a skinned mesh node depends on
    pub bones: Vec<usize>,
}

impl SceneNode {
    /// Local transform at `frame`.
    pub fn local_transform(&self, frame: usize) -> LocalTransform {
        self.animation.local_transform(frame)
    }

    /// Local transform at `frame` as a matrix.
    pub fn local_matrix(&self, frame: usize) -> Mat4 {
        self.local_transform(frame).to_matrix()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_skinned(&self) -> bool {
        !self.bones.is_empty()
    }
}

/// A surface material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,

    /// Diffuse color (RGB, 0-1)
    pub diffuse_color: Vec3,

    pub ambient_color: Vec3,

    pub specular_color: Vec3,

    /// Opacity (0=transparent, 1=opaque)
    pub opacity: f32,

    pub shininess: f32,

    pub blending_enabled: bool,

    pub blend: BlendState,

    /// Diffuse texture file name as stored in the file
    pub texture: Option<String>,

    /// Texture rows should be flipped when uploaded
    pub flip_texture: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_color: Vec3::new(0.5, 0.5, 0.5),
            ambient_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
            opacity: 1.0,
            shininess: 0.0,
            blending_enabled: false,
            blend: BlendState::default(),
            texture: None,
            flip_texture: false,
        }
    }
}

impl Material {
    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    /// Texture file to load for this material, after overrides.
    pub fn texture_file<'a>(&'a self, overrides: &'a TextureOverrides) -> Option<&'a str> {
        self.texture.as_deref().map(|name| overrides.resolve(name))
    }
}

/// A camera built from a camera record.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// First node that refers to this camera
    pub node: Option<usize>,

    /// Look-at target node
    pub target: Option<usize>,

    /// Vertical field of view (radians)
    pub fov: f32,

    pub near: f32,

    pub far: f32,

    /// Field of view per frame, empty when not animated
    pub fov_animation: Vec<f32>,
}

impl Camera {
    /// Field of view at `frame` (clamped to the last animated value).
    pub fn fov_at(&self, frame: usize) -> f32 {
        match self.fov_animation.len() {
            0 => self.fov,
            n => self.fov_animation[frame.min(n - 1)],
        }
    }
}

/// A light built from a light record.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    /// First node that refers to this light
    pub node: Option<usize>,

    pub target: Option<usize>,

    pub color: Vec3,

    pub light_type: LightType,

    pub constant_attenuation: f32,

    pub linear_attenuation: f32,

    pub quadratic_attenuation: f32,

    pub falloff_angle: f32,

    pub falloff_exponent: f32,

    /// World position at frame 0
    pub position: Vec3,

    /// World direction at frame 0 (the node's -Y axis)
    pub direction: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            node: None,
            target: None,
            color: Vec3::ONE,
            light_type: LightType::Point,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            falloff_angle: std::f32::consts::PI,
            falloff_exponent: 0.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
        }
    }
}

impl Light {
    /// Create a point light with the given color.
    pub fn new(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }
}

/// A built node placed in a caller's container, with its attached children.
#[derive(Clone, Debug)]
pub struct AttachedNode {
    pub node: Arc<SceneNode>,
    pub children: Vec<AttachedNode>,
}

impl AttachedNode {
    pub fn new(node: Arc<SceneNode>) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// This node and all its descendants.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(AttachedNode::subtree_len).sum::<usize>()
    }

    /// Depth-first search for a node called `name`.
    pub fn find(&self, name: &str) -> Option<&AttachedNode> {
        if self.node.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn visit<'a>(&'a self, depth: usize, f: &mut dyn FnMut(&'a AttachedNode, usize)) {
        f(self, depth);
        for child in &self.children {
            child.visit(depth + 1, f);
        }
    }
}

/// Receiver of attached node trees.
///
/// Implemented by engine-side objects that can hold scene nodes.
pub trait SceneContainer {
    /// Take ownership of a top-level attached tree.
    fn add_child(&mut self, child: AttachedNode);
}

/// Top-level scene container.
#[derive(Clone, Debug, Default)]
pub struct SceneRoot {
    pub name: String,
    pub children: Vec<AttachedNode>,
}

impl SceneRoot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Total number of attached nodes at any depth.
    pub fn node_count(&self) -> usize {
        self.children.iter().map(AttachedNode::subtree_len).sum()
    }

    /// Number of attached nodes whose kind matches `predicate`.
    pub fn count_where(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        let mut count = 0;
        self.walk(|attached, _| {
            if predicate(&attached.node.kind) {
                count += 1;
            }
        });
        count
    }

    pub fn find(&self, name: &str) -> Option<&AttachedNode> {
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Visit every attached node depth-first with its depth (roots are 0).
    pub fn walk<'a>(&'a self, mut f: impl FnMut(&'a AttachedNode, usize)) {
        for child in &self.children {
            child.visit(0, &mut f);
        }
    }

    /// World matrix of every attached node at `frame`, composed along the
    /// attached hierarchy, in depth-first order.
    pub fn world_matrices(&self, frame: usize) -> Vec<(usize, Mat4)> {
        fn compose(node: &AttachedNode, parent: Mat4, frame: usize, out: &mut Vec<(usize, Mat4)>) {
            let world = parent * node.node.local_matrix(frame);
            out.push((node.node.index, world));
            for child in &node.children {
                compose(child, world, frame, out);
            }
        }

        let mut out = Vec::with_capacity(self.node_count());
        for child in &self.children {
            compose(child, Mat4::IDENTITY, frame, &mut out);
        }
        out
    }
}

impl SceneContainer for SceneRoot {
    fn add_child(&mut self, child: AttachedNode) {
        self.children.push(child);
    }
}

/// Container for bone hierarchies.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub name: String,
    pub bones: Vec<AttachedNode>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Total number of bones at any depth.
    pub fn bone_count(&self) -> usize {
        self.bones.iter().map(AttachedNode::subtree_len).sum()
    }

    pub fn find(&self, name: &str) -> Option<&AttachedNode> {
        self.bones.iter().find_map(|bone| bone.find(name))
    }
}

impl SceneContainer for Skeleton {
    fn add_child(&mut self, child: AttachedNode) {
        self.bones.push(child);
    }
}
