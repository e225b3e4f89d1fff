//! Raw POD records for intermediate representation.
//!
//! These types mirror the file contents one-to-one. Cross-references are
//! kept as the signed indices found in the file; resolving them is the
//! scene builder's job.

use pod_math::{Mat4, Quat, Vec3};

use super::tags::{ANIM_HAS_MATRIX, ANIM_HAS_POSITION, ANIM_HAS_ROTATION, ANIM_HAS_SCALE};
use crate::scene::{LocalTransform, Transform};

/// Component encoding of a vertex data block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Float,
    Int,
    UnsignedShort,
    Rgba,
    Argb,
    D3dColor,
    UByte4,
    Fixed16_16,
    UnsignedByte,
    Short,
    ShortNorm,
    Byte,
    ByteNorm,
    UnsignedByteNorm,
    UnsignedShortNorm,
    UnsignedInt,
}

impl DataType {
    /// Decode the on-disk data type identifier.
    pub fn from_u32(value: u32) -> Option<Self> {
        let data_type = match value {
            1 => DataType::Float,
            2 => DataType::Int,
            3 => DataType::UnsignedShort,
            4 => DataType::Rgba,
            5 => DataType::Argb,
            6 => DataType::D3dColor,
            7 => DataType::UByte4,
            9 => DataType::Fixed16_16,
            10 => DataType::UnsignedByte,
            11 => DataType::Short,
            12 => DataType::ShortNorm,
            13 => DataType::Byte,
            14 => DataType::ByteNorm,
            15 => DataType::UnsignedByteNorm,
            16 => DataType::UnsignedShortNorm,
            17 => DataType::UnsignedInt,
            _ => return None,
        };
        Some(data_type)
    }

    /// Size in bytes of a single component.
    pub fn component_size(&self) -> usize {
        match self {
            DataType::Float
            | DataType::Int
            | DataType::UnsignedInt
            | DataType::Fixed16_16 => 4,
            DataType::UnsignedShort
            | DataType::Short
            | DataType::ShortNorm
            | DataType::UnsignedShortNorm => 2,
            DataType::Rgba
            | DataType::Argb
            | DataType::D3dColor
            | DataType::UByte4
            | DataType::UnsignedByte
            | DataType::Byte
            | DataType::ByteNorm
            | DataType::UnsignedByteNorm => 1,
        }
    }

    /// Packed four-byte types always carry four components.
    pub fn is_packed(&self) -> bool {
        matches!(
            self,
            DataType::Rgba | DataType::Argb | DataType::D3dColor | DataType::UByte4
        )
    }
}

/// Where the bytes of a data block live.
#[derive(Clone, Debug, PartialEq)]
pub enum DataSource {
    /// The block carries its own bytes.
    Owned(Vec<u8>),
    /// The block is a view into the mesh's interleaved buffer.
    Interleaved { offset: u32 },
}

/// A vertex attribute (or index) data block.
#[derive(Clone, Debug, PartialEq)]
pub struct DataBlock {
    pub data_type: DataType,

    /// Number of components per element as declared in the file
    pub components: u32,

    /// Byte distance between consecutive elements
    pub stride: u32,

    pub source: DataSource,
}

impl DataBlock {
    /// Number of components actually stored per element.
    pub fn element_components(&self) -> usize {
        if self.data_type.is_packed() {
            4
        } else {
            self.components as usize
        }
    }

    /// Bytes occupied by one element, or `None` if the declared component
    /// count overflows.
    pub fn element_size(&self) -> Option<usize> {
        self.element_components()
            .checked_mul(self.data_type.component_size())
    }

    /// Effective stride; a zero stride means tightly packed.
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.element_size().unwrap_or(usize::MAX)
        } else {
            self.stride as usize
        }
    }
}

/// Per-node animation channels.
///
/// A channel holds one entry per frame when its flag bit is set, otherwise a
/// single static entry (or none).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAnimation {
    pub flags: u32,
    pub positions: Vec<Vec3>,
    pub rotations: Vec<Quat>,
    pub scales: Vec<Vec3>,
    pub matrices: Vec<Mat4>,
}

impl NodeAnimation {
    /// Whether any channel varies per frame.
    pub fn is_animated(&self) -> bool {
        self.flags & (ANIM_HAS_POSITION | ANIM_HAS_ROTATION | ANIM_HAS_SCALE | ANIM_HAS_MATRIX)
            != 0
    }

    /// Number of distinct frames stored across channels.
    pub fn frame_count(&self) -> usize {
        self.positions
            .len()
            .max(self.rotations.len())
            .max(self.scales.len())
            .max(self.matrices.len())
            .max(1)
    }

    fn sample<T: Copy>(channel: &[T], animated: bool, frame: usize) -> Option<T> {
        if animated {
            channel.get(frame.min(channel.len().saturating_sub(1))).copied()
        } else {
            channel.first().copied()
        }
    }

    /// Local transform at `frame` (clamped to the last stored frame).
    pub fn local_transform(&self, frame: usize) -> LocalTransform {
        if let Some(matrix) = Self::sample(&self.matrices, self.flags & ANIM_HAS_MATRIX != 0, frame)
        {
            return LocalTransform::Matrix(matrix);
        }

        let translation =
            Self::sample(&self.positions, self.flags & ANIM_HAS_POSITION != 0, frame)
                .unwrap_or(Vec3::ZERO);
        let rotation = Self::sample(&self.rotations, self.flags & ANIM_HAS_ROTATION != 0, frame)
            .unwrap_or(Quat::IDENTITY);
        let scale = Self::sample(&self.scales, self.flags & ANIM_HAS_SCALE != 0, frame)
            .unwrap_or(Vec3::ONE);

        LocalTransform::Trs(Transform {
            translation,
            rotation,
            scale,
        })
    }
}

/// A node record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawNode {
    /// Position in the node array
    pub index: usize,

    pub name: String,

    /// Index of the mesh, light or camera this node carries; which array it
    /// indexes depends on the node's position (see `PodDocument::node_category`)
    pub object_index: i32,

    /// Material index (-1 = none)
    pub material_index: i32,

    /// Parent node index (-1 = root)
    pub parent_index: i32,

    pub animation: NodeAnimation,
}

/// Bone batch table of a skinned mesh.
///
/// Vertex bone indices are slots into the bone list of the batch that owns
/// the vertex's triangle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneBatchTable {
    /// Concatenated bone node indices of all batches
    pub bones: Vec<i32>,

    /// Number of bones in each batch
    pub bone_counts: Vec<i32>,

    /// First triangle of each batch
    pub triangle_offsets: Vec<i32>,

    /// Maximum bones per batch
    pub max_bones: u32,

    pub batch_count: u32,
}

impl BoneBatchTable {
    pub fn is_empty(&self) -> bool {
        self.bone_counts.is_empty()
    }

    /// Iterate `(bone node indices, first triangle)` for each batch.
    ///
    /// The table must have passed `PodParser` validation.
    pub fn batches(&self) -> impl Iterator<Item = (&[i32], i32)> + '_ {
        let mut start = 0usize;
        self.bone_counts
            .iter()
            .zip(self.triangle_offsets.iter())
            .map(move |(&count, &offset)| {
                let end = start + count.max(0) as usize;
                let len = self.bones.len();
                let bones = &self.bones[start.min(len)..end.min(len)];
                start = end;
                (bones, offset)
            })
    }
}

/// A mesh record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMesh {
    pub vertex_count: u32,
    pub face_count: u32,
    pub uv_channel_count: u32,

    /// Triangle (or strip) indices
    pub faces: Option<DataBlock>,

    /// Strip lengths in triangles; empty for triangle lists
    pub strip_lengths: Vec<u32>,

    pub positions: Option<DataBlock>,
    pub normals: Option<DataBlock>,
    pub tangents: Option<DataBlock>,
    pub binormals: Option<DataBlock>,

    /// One block per UV channel
    pub uvs: Vec<DataBlock>,

    pub colours: Option<DataBlock>,
    pub bone_indices: Option<DataBlock>,
    pub bone_weights: Option<DataBlock>,

    /// Interleaved vertex bytes referenced by `DataSource::Interleaved`
    pub interleaved: Option<Vec<u8>>,

    pub bone_batches: BoneBatchTable,

    pub unpack_matrix: Option<Mat4>,
}

impl RawMesh {
    /// Whether the mesh carries per-vertex skinning attributes.
    pub fn is_skinned(&self) -> bool {
        self.bone_indices.is_some() && self.bone_weights.is_some()
    }

    /// Whether the faces are stored as triangle strips.
    pub fn is_stripped(&self) -> bool {
        !self.strip_lengths.is_empty()
    }

    /// Number of indices in the face block.
    pub fn index_count(&self) -> usize {
        if self.is_stripped() {
            self.strip_lengths
                .iter()
                .fold(0usize, |total, &l| total.saturating_add(l as usize + 2))
        } else {
            (self.face_count as usize).saturating_mul(3)
        }
    }
}

/// Blend factors and operations of a material.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlendState {
    pub src_rgb: u32,
    pub src_alpha: u32,
    pub dst_rgb: u32,
    pub dst_alpha: u32,
    pub op_rgb: u32,
    pub op_alpha: u32,
}

/// A material record.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMaterial {
    pub name: String,

    /// Texture index of the diffuse map (-1 = none)
    pub diffuse_texture: i32,

    pub opacity: f32,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
    pub blend: BlendState,
    pub flags: u32,
}

impl Default for RawMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_texture: -1,
            opacity: 1.0,
            ambient_color: Vec3::ZERO,
            diffuse_color: Vec3::ONE,
            specular_color: Vec3::ZERO,
            shininess: 0.0,
            blend: BlendState::default(),
            flags: 0,
        }
    }
}

/// A texture record (the file name only, no pixels).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTexture {
    pub file_name: String,
}

/// A camera record.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCamera {
    /// Look-at target node (-1 = none)
    pub target_index: i32,

    /// Vertical field of view in radians
    pub fov: f32,

    pub far: f32,
    pub near: f32,

    /// Per-frame field of view; empty when not animated
    pub fov_animation: Vec<f32>,
}

impl Default for RawCamera {
    fn default() -> Self {
        Self {
            target_index: -1,
            fov: 0.7,
            far: 1000.0,
            near: 1.0,
            fov_animation: Vec::new(),
        }
    }
}

/// Illumination model of a light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightType {
    #[default]
    Point,
    Directional,
    Spot,
}

impl LightType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(LightType::Point),
            1 => Some(LightType::Directional),
            2 => Some(LightType::Spot),
            _ => None,
        }
    }
}

/// A light record.
#[derive(Clone, Debug, PartialEq)]
pub struct RawLight {
    /// Look-at target node (-1 = none)
    pub target_index: i32,

    pub color: Vec3,
    pub light_type: LightType,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
    pub falloff_angle: f32,
    pub falloff_exponent: f32,
}

impl Default for RawLight {
    fn default() -> Self {
        Self {
            target_index: -1,
            color: Vec3::ONE,
            light_type: LightType::Point,
            constant_attenuation: 1.0,
            linear_attenuation: 0.0,
            quadratic_attenuation: 0.0,
            falloff_angle: std::f32::consts::PI,
            falloff_exponent: 0.0,
        }
    }
}

/// Scene-wide header values.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneHeader {
    pub background_color: Vec3,
    pub ambient_color: Vec3,
    pub num_cameras: u32,
    pub num_lights: u32,
    pub num_meshes: u32,
    pub num_nodes: u32,
    pub num_mesh_nodes: u32,
    pub num_textures: u32,
    pub num_materials: u32,
    pub num_frames: u32,
    pub flags: u32,
    pub fps: u32,
}

impl Default for SceneHeader {
    fn default() -> Self {
        Self {
            background_color: Vec3::ZERO,
            ambient_color: Vec3::ZERO,
            num_cameras: 0,
            num_lights: 0,
            num_meshes: 0,
            num_nodes: 0,
            num_mesh_nodes: 0,
            num_textures: 0,
            num_materials: 0,
            num_frames: 1,
            flags: 0,
            fps: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::from_u32(1), Some(DataType::Float));
        assert_eq!(DataType::from_u32(8), None);
        assert_eq!(DataType::Float.component_size(), 4);
        assert_eq!(DataType::UnsignedShort.component_size(), 2);
        assert_eq!(DataType::UByte4.component_size(), 1);
    }

    #[test]
    fn test_packed_block_stride() {
        let block = DataBlock {
            data_type: DataType::UByte4,
            components: 1,
            stride: 0,
            source: DataSource::Owned(Vec::new()),
        };
        assert_eq!(block.element_components(), 4);
        assert_eq!(block.effective_stride(), 4);
    }

    #[test]
    fn test_static_animation_uses_first_entry() {
        let animation = NodeAnimation {
            flags: 0,
            positions: vec![Vec3::new(1.0, 2.0, 3.0)],
            ..Default::default()
        };

        for frame in [0, 5] {
            match animation.local_transform(frame) {
                LocalTransform::Trs(t) => assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0)),
                other => panic!("Expected TRS transform, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_animated_position_clamps_frame() {
        let animation = NodeAnimation {
            flags: ANIM_HAS_POSITION,
            positions: vec![Vec3::ZERO, Vec3::X],
            ..Default::default()
        };

        assert!(animation.is_animated());
        assert_eq!(animation.frame_count(), 2);
        match animation.local_transform(9) {
            LocalTransform::Trs(t) => assert_eq!(t.translation, Vec3::X),
            other => panic!("Expected TRS transform, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_channel_wins() {
        let matrix = Mat4::from_translation(Vec3::Y);
        let animation = NodeAnimation {
            flags: 0,
            positions: vec![Vec3::X],
            matrices: vec![matrix],
            ..Default::default()
        };
        assert_eq!(animation.local_transform(0), LocalTransform::Matrix(matrix));
    }

    #[test]
    fn test_bone_batches_iteration() {
        let table = BoneBatchTable {
            bones: vec![3, 4, 5],
            bone_counts: vec![2, 1],
            triangle_offsets: vec![0, 10],
            max_bones: 2,
            batch_count: 2,
        };

        let batches: Vec<_> = table.batches().collect();
        assert_eq!(batches, vec![(&[3, 4][..], 0), (&[5][..], 10)]);
    }

    #[test]
    fn test_strip_index_count() {
        let mesh = RawMesh {
            face_count: 4,
            strip_lengths: vec![2, 2],
            ..Default::default()
        };
        assert!(mesh.is_stripped());
        assert_eq!(mesh.index_count(), 8);
    }
}
