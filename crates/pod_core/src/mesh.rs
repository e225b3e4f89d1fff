//! Built mesh geometry.
//!
//! Vertex attributes keep the exact bytes and layout of the file: each
//! `VertexStream` is a strided view into a shared buffer, so interleaved
//! meshes hand a renderer a single upload-ready buffer. Decoding helpers
//! convert components to floats on demand.

use std::collections::BTreeSet;
use std::sync::Arc;

use pod_math::{Mat4, Vec2, Vec3, Vec4};

use crate::pod::types::{DataBlock, DataSource, DataType, RawMesh};

/// A strided view of one vertex attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexStream {
    buffer: Arc<[u8]>,
    offset: usize,
    stride: usize,

    pub data_type: DataType,

    /// Components per element (4 for packed colour types)
    pub components: usize,

    /// Number of elements
    pub count: usize,
}

fn read_le<T: bytemuck::Pod>(bytes: &[u8]) -> Option<T> {
    let size = std::mem::size_of::<T>();
    bytes.get(..size).map(bytemuck::pod_read_unaligned)
}

impl VertexStream {
    /// View a data block as `count` elements.
    ///
    /// `interleaved` is the mesh's shared buffer, used for blocks that
    /// reference it.
    pub fn from_block(block: &DataBlock, count: usize, interleaved: Option<&Arc<[u8]>>) -> Option<Self> {
        let (buffer, offset) = match &block.source {
            DataSource::Owned(bytes) => (Arc::from(bytes.as_slice()), 0),
            DataSource::Interleaved { offset } => (Arc::clone(interleaved?), *offset as usize),
        };

        Some(Self {
            buffer,
            offset,
            stride: block.effective_stride(),
            data_type: block.data_type,
            components: block.element_components(),
            count,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Byte offset of the first element in `buffer()`.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte distance between consecutive elements.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The underlying vertex bytes (shared by all streams of an interleaved mesh).
    pub fn buffer(&self) -> &Arc<[u8]> {
        &self.buffer
    }

    /// Whether two streams read from the same buffer.
    pub fn shares_buffer(&self, other: &VertexStream) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    fn element_bytes(&self, index: usize) -> Option<&[u8]> {
        if index >= self.count {
            return None;
        }
        let start = self.offset + index * self.stride;
        let size = self.components * self.data_type.component_size();
        self.buffer.get(start..start + size)
    }

    /// Component `c` of element `index`, normalised types mapped to [0, 1]
    /// or [-1, 1].
    pub fn component(&self, index: usize, c: usize) -> Option<f32> {
        if c >= self.components {
            return None;
        }
        let size = self.data_type.component_size();
        let bytes = self.element_bytes(index)?.get(c * size..)?;

        let value = match self.data_type {
            DataType::Float => f32::from_bits(u32::from_le(read_le(bytes)?)),
            DataType::Int => i32::from_le(read_le(bytes)?) as f32,
            DataType::UnsignedInt => u32::from_le(read_le(bytes)?) as f32,
            DataType::Fixed16_16 => i32::from_le(read_le(bytes)?) as f32 / 65536.0,
            DataType::UnsignedShort => u16::from_le(read_le(bytes)?) as f32,
            DataType::Short => i16::from_le(read_le(bytes)?) as f32,
            DataType::ShortNorm => (i16::from_le(read_le(bytes)?) as f32 / 32767.0).max(-1.0),
            DataType::UnsignedShortNorm => u16::from_le(read_le(bytes)?) as f32 / 65535.0,
            DataType::UnsignedByte | DataType::UByte4 => read_le::<u8>(bytes)? as f32,
            DataType::Byte => read_le::<i8>(bytes)? as f32,
            DataType::ByteNorm => (read_le::<i8>(bytes)? as f32 / 127.0).max(-1.0),
            DataType::UnsignedByteNorm
            | DataType::Rgba
            | DataType::Argb
            | DataType::D3dColor => read_le::<u8>(bytes)? as f32 / 255.0,
        };
        Some(value)
    }

    /// Component `c` of element `index` as an integer (bone slots).
    pub fn component_index(&self, index: usize, c: usize) -> Option<u32> {
        let value = match self.data_type {
            DataType::UnsignedInt | DataType::Int => {
                let size = self.data_type.component_size();
                let bytes = self.element_bytes(index)?.get(c * size..)?;
                u32::from_le(read_le(bytes)?)
            }
            _ => self.component(index, c)?.max(0.0) as u32,
        };
        Some(value)
    }

    /// Up to four components of element `index`; missing ones are zero.
    pub fn element(&self, index: usize) -> Option<[f32; 4]> {
        let mut out = [0.0; 4];
        for (c, slot) in out.iter_mut().enumerate().take(self.components.min(4)) {
            *slot = self.component(index, c)?;
        }
        Some(out)
    }

    pub fn vec2(&self, index: usize) -> Option<Vec2> {
        self.element(index).map(|e| Vec2::new(e[0], e[1]))
    }

    pub fn vec3(&self, index: usize) -> Option<Vec3> {
        self.element(index).map(|e| Vec3::new(e[0], e[1], e[2]))
    }

    /// Element `index` as an RGBA colour, reordering ARGB/D3DCOLOR bytes.
    pub fn color(&self, index: usize) -> Option<Vec4> {
        let e = self.element(index)?;
        let rgba = match self.data_type {
            // Stored as a little-endian 0xAARRGGBB word: bytes are B, G, R, A
            DataType::Argb | DataType::D3dColor => Vec4::new(e[2], e[1], e[0], e[3]),
            _ => Vec4::from_array(e),
        };
        Some(rgba)
    }

    /// Decode every element as a `Vec3`.
    pub fn to_vec3s(&self) -> Vec<Vec3> {
        (0..self.count).filter_map(|i| self.vec3(i)).collect()
    }

    /// Decode every element as a `Vec2`.
    pub fn to_vec2s(&self) -> Vec<Vec2> {
        (0..self.count).filter_map(|i| self.vec2(i)).collect()
    }
}

/// One bone batch of a skinned mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct BoneBatch {
    /// Bone node index for each slot referenced by vertex bone indices
    pub bones: Vec<usize>,

    /// Inverse bind matrix for each slot
    pub inverse_bind: Vec<Mat4>,

    /// First triangle drawn with this batch
    pub first_triangle: usize,
}

/// Skinning data of a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skin {
    pub batches: Vec<BoneBatch>,

    /// Maximum bones per batch
    pub max_bones: usize,
}

impl Skin {
    /// Distinct bone node indices over all batches.
    pub fn bone_nodes(&self) -> BTreeSet<usize> {
        self.batches
            .iter()
            .flat_map(|batch| batch.bones.iter().copied())
            .collect()
    }

    /// Batch that draws `triangle`.
    pub fn batch_for_triangle(&self, triangle: usize) -> Option<&BoneBatch> {
        self.batches
            .iter()
            .rev()
            .find(|batch| batch.first_triangle <= triangle)
    }
}

/// A mesh built from a mesh record.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    /// Index of the mesh record in the file
    pub index: usize,

    pub vertex_count: usize,

    pub positions: Option<VertexStream>,
    pub normals: Option<VertexStream>,
    pub tangents: Option<VertexStream>,
    pub binormals: Option<VertexStream>,
    pub uvs: Vec<VertexStream>,
    pub colours: Option<VertexStream>,
    pub bone_indices: Option<VertexStream>,
    pub bone_weights: Option<VertexStream>,

    /// Triangle indices (every 3 indices form a triangle; strips are expanded)
    pub indices: Vec<u32>,

    pub skin: Option<Skin>,

    /// Dequantisation matrix for packed positions
    pub unpack_matrix: Option<Mat4>,
}

impl Mesh {
    /// Build the geometry of a mesh record. Skinning is attached by the
    /// scene builder once bone nodes are resolved.
    pub fn from_raw(index: usize, raw: &RawMesh) -> Self {
        let vertex_count = raw.vertex_count as usize;
        let interleaved: Option<Arc<[u8]>> = raw.interleaved.as_deref().map(Arc::from);
        let stream = |block: &Option<DataBlock>| {
            block
                .as_ref()
                .and_then(|b| VertexStream::from_block(b, vertex_count, interleaved.as_ref()))
        };

        Self {
            index,
            vertex_count,
            positions: stream(&raw.positions),
            normals: stream(&raw.normals),
            tangents: stream(&raw.tangents),
            binormals: stream(&raw.binormals),
            uvs: raw
                .uvs
                .iter()
                .filter_map(|b| VertexStream::from_block(b, vertex_count, interleaved.as_ref()))
                .collect(),
            colours: stream(&raw.colours),
            bone_indices: stream(&raw.bone_indices),
            bone_weights: stream(&raw.bone_weights),
            indices: decode_indices(raw),
            skin: None,
            unpack_matrix: raw.unpack_matrix,
        }
    }

    /// Get triangle count.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }

    /// Decoded vertex positions (empty when the mesh has none).
    pub fn position_values(&self) -> Vec<Vec3> {
        self.positions.as_ref().map(VertexStream::to_vec3s).unwrap_or_default()
    }

    /// Bone node and weight of each influence on `vertex`, resolved through
    /// `batch`. Zero weights are dropped.
    pub fn vertex_influences(&self, vertex: usize, batch: &BoneBatch) -> Vec<(usize, f32)> {
        let (Some(indices), Some(weights)) = (&self.bone_indices, &self.bone_weights) else {
            return Vec::new();
        };

        (0..weights.components.min(indices.components))
            .filter_map(|c| {
                let weight = weights.component(vertex, c)?;
                if weight == 0.0 {
                    return None;
                }
                let slot = indices.component_index(vertex, c)? as usize;
                batch.bones.get(slot).map(|&bone| (bone, weight))
            })
            .collect()
    }
}

/// Decode the face block into a triangle list.
fn decode_indices(raw: &RawMesh) -> Vec<u32> {
    let Some(faces) = &raw.faces else {
        return Vec::new();
    };
    let count = raw.index_count();
    let Some(stream) = VertexStream::from_block(faces, count, None) else {
        return Vec::new();
    };
    let values: Vec<u32> = (0..count)
        .filter_map(|i| stream.component_index(i, 0))
        .collect();

    if !raw.is_stripped() {
        return values;
    }

    let mut triangles = Vec::with_capacity(raw.strip_lengths.iter().sum::<u32>() as usize * 3);
    let mut start = 0usize;
    for &length in &raw.strip_lengths {
        let strip = &values[start.min(values.len())..(start + length as usize + 2).min(values.len())];
        for (k, window) in strip.windows(3).enumerate() {
            // Every other strip triangle flips winding
            if k % 2 == 0 {
                triangles.extend_from_slice(&[window[0], window[1], window[2]]);
            } else {
                triangles.extend_from_slice(&[window[1], window[0], window[2]]);
            }
        }
        start += length as usize + 2;
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_block(values: &[f32], components: u32) -> DataBlock {
        DataBlock {
            data_type: DataType::Float,
            components,
            stride: 0,
            source: DataSource::Owned(values.iter().flat_map(|v| v.to_le_bytes()).collect()),
        }
    }

    fn u16_block(values: &[u16]) -> DataBlock {
        DataBlock {
            data_type: DataType::UnsignedShort,
            components: 1,
            stride: 2,
            source: DataSource::Owned(values.iter().flat_map(|v| v.to_le_bytes()).collect()),
        }
    }

    #[test]
    fn test_float_stream_decodes_vec3() {
        let block = float_block(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 3);
        let stream = VertexStream::from_block(&block, 2, None).unwrap();
        assert_eq!(stream.stride(), 12);
        assert_eq!(stream.to_vec3s(), vec![Vec3::new(0.0, 1.0, 2.0), Vec3::new(3.0, 4.0, 5.0)]);
        assert_eq!(stream.vec3(2), None);
    }

    #[test]
    fn test_interleaved_stream_reads_shared_buffer() {
        // Two vertices: position (3 floats) + uv (2 floats), stride 20
        let floats = [1.0f32, 2.0, 3.0, 0.25, 0.5, 4.0, 5.0, 6.0, 0.75, 1.0];
        let buffer: Arc<[u8]> = floats.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<_>>().into();

        let uv = DataBlock {
            data_type: DataType::Float,
            components: 2,
            stride: 20,
            source: DataSource::Interleaved { offset: 12 },
        };
        let position = DataBlock {
            source: DataSource::Interleaved { offset: 0 },
            components: 3,
            ..uv.clone()
        };

        let uvs = VertexStream::from_block(&uv, 2, Some(&buffer)).unwrap();
        let positions = VertexStream::from_block(&position, 2, Some(&buffer)).unwrap();
        assert!(uvs.shares_buffer(&positions));
        assert_eq!(uvs.vec2(1), Some(Vec2::new(0.75, 1.0)));
        assert_eq!(positions.vec3(1), Some(Vec3::new(4.0, 5.0, 6.0)));

        // No shared buffer to point into
        assert!(VertexStream::from_block(&uv, 2, None).is_none());
    }

    #[test]
    fn test_normalised_and_packed_types() {
        let block = DataBlock {
            data_type: DataType::D3dColor,
            components: 1,
            stride: 0,
            source: DataSource::Owned(vec![0, 0, 255, 255]),
        };
        let stream = VertexStream::from_block(&block, 1, None).unwrap();
        assert_eq!(stream.components, 4);
        assert_eq!(stream.color(0), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));

        let shorts = DataBlock {
            data_type: DataType::ShortNorm,
            components: 2,
            stride: 0,
            source: DataSource::Owned([i16::MIN, i16::MAX].iter().flat_map(|v| v.to_le_bytes()).collect()),
        };
        let stream = VertexStream::from_block(&shorts, 1, None).unwrap();
        assert_eq!(stream.element(0), Some([-1.0, 1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_triangle_list_indices() {
        let raw = RawMesh {
            vertex_count: 4,
            face_count: 2,
            faces: Some(u16_block(&[0, 1, 2, 2, 1, 3])),
            ..Default::default()
        };
        let mesh = Mesh::from_raw(0, &raw);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(mesh.triangle_count(), 2);
    }

    #[test]
    fn test_strips_expand_with_alternating_winding() {
        let raw = RawMesh {
            vertex_count: 4,
            face_count: 2,
            strip_lengths: vec![2],
            faces: Some(u16_block(&[0, 1, 2, 3])),
            ..Default::default()
        };
        let mesh = Mesh::from_raw(0, &raw);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 1, 3]);
    }

    #[test]
    fn test_vertex_influences_resolve_batch_slots() {
        let raw = RawMesh {
            vertex_count: 1,
            bone_indices: Some(DataBlock {
                data_type: DataType::UByte4,
                components: 4,
                stride: 0,
                source: DataSource::Owned(vec![1, 0, 0, 0]),
            }),
            bone_weights: Some(float_block(&[0.75, 0.25, 0.0, 0.0], 4)),
            ..Default::default()
        };
        let mesh = Mesh::from_raw(0, &raw);
        let batch = BoneBatch {
            bones: vec![7, 9],
            inverse_bind: vec![Mat4::IDENTITY; 2],
            first_triangle: 0,
        };
        assert_eq!(mesh.vertex_influences(0, &batch), vec![(9, 0.75), (7, 0.25)]);
    }

    #[test]
    fn test_batch_for_triangle() {
        let batch = |first_triangle| BoneBatch {
            bones: vec![first_triangle],
            inverse_bind: vec![Mat4::IDENTITY],
            first_triangle,
        };
        let skin = Skin {
            batches: vec![batch(0), batch(10)],
            max_bones: 1,
        };
        assert_eq!(skin.batch_for_triangle(3).map(|b| b.first_triangle), Some(0));
        assert_eq!(skin.batch_for_triangle(12).map(|b| b.first_triangle), Some(10));
        assert_eq!(skin.bone_nodes().into_iter().collect::<Vec<_>>(), vec![0, 10]);
    }
}
