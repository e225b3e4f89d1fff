//! POD binary decoder.
//!
//! Single sequential pass over the marker stream. Known chunks are decoded
//! into the raw record types; unknown chunks are skipped by their declared
//! length so that files written by newer exporters still load.
//!
//! # Layout
//!
//! - `1000` version string, must be `AB.POD.2.0`
//! - `1001` scene container holding header values and the repeated
//!   camera / light / mesh / node / texture / material containers
//!
//! Decoding stops at the end marker of the scene. Cross-references are
//! left unresolved.

use pod_math::{matrix_from_pod, Quat, Vec3, POD_MATRIX_FLOATS};
use thiserror::Error;

use super::document::PodDocument;
use super::reader::{ChunkReader, Marker, ReadError};
use super::tags::{self, POD_VERSION, SCALE_FLOATS};
use super::types::*;

/// Errors that can occur during POD decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("Malformed POD at offset {offset}: {message}")]
    Malformed { offset: usize, message: String },

    #[error("Unsupported POD version {found:?} (expected {expected:?})")]
    VersionMismatch {
        found: String,
        expected: &'static str,
    },
}

impl ParseError {
    /// Whether the input ended before a requested field.
    pub fn is_truncated(&self) -> bool {
        matches!(self, ParseError::Read(ReadError::Truncated { .. }))
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Decode a complete POD byte buffer.
pub fn parse_pod(data: &[u8]) -> ParseResult<PodDocument> {
    PodParser::new(data).parse()
}

/// POD decoder over a borrowed buffer.
pub struct PodParser<'a> {
    reader: ChunkReader<'a>,
}

impl<'a> PodParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: ChunkReader::new(data),
        }
    }

    /// Decode the file and return the document.
    pub fn parse(mut self) -> ParseResult<PodDocument> {
        let mut version: Option<String> = None;

        loop {
            let marker = self.reader.read_marker()?;
            match marker.tag {
                tags::FILE_VERSION => {
                    let found = self.read_string_field(marker)?;
                    if found != POD_VERSION {
                        return Err(ParseError::VersionMismatch {
                            found,
                            expected: POD_VERSION,
                        });
                    }
                    version = Some(found);
                }
                tags::FILE_SCENE => {
                    let Some(version) = version.take() else {
                        return Err(self.malformed("scene chunk before version chunk"));
                    };
                    let mut document = self.parse_scene()?;
                    document.version = version;

                    if self.reader.remaining() > 0 {
                        log::debug!(
                            "Ignoring {} trailing bytes after scene",
                            self.reader.remaining()
                        );
                    }
                    return Ok(document);
                }
                _ => self.skip_unknown(marker)?,
            }
        }
    }

    fn malformed(&self, message: impl Into<String>) -> ParseError {
        ParseError::Malformed {
            offset: self.reader.position(),
            message: message.into(),
        }
    }

    fn skip_unknown(&mut self, marker: Marker) -> ParseResult<()> {
        log::debug!(
            "Skipping unknown chunk {:#x} ({} bytes) at offset {}",
            marker.tag,
            marker.length,
            self.reader.position()
        );
        self.reader.skip(marker.len())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Field helpers. Each consumes the payload and the closing end marker.
    // ------------------------------------------------------------------

    fn expect_end(&mut self, tag: u32) -> ParseResult<()> {
        let marker = self.reader.read_marker()?;
        if !marker.is_end_of(tag) {
            return Err(self.malformed(format!(
                "expected end of chunk {}, found tag {:#x}",
                tag, marker.tag
            )));
        }
        Ok(())
    }

    fn expect_length(&self, marker: Marker, length: usize) -> ParseResult<()> {
        if marker.len() != length {
            return Err(self.malformed(format!(
                "chunk {} has length {}, expected {}",
                marker.tag, marker.length, length
            )));
        }
        Ok(())
    }

    fn expect_multiple(&self, marker: Marker, unit: usize) -> ParseResult<usize> {
        if marker.len() % unit != 0 {
            return Err(self.malformed(format!(
                "chunk {} has length {}, not a multiple of {}",
                marker.tag, marker.length, unit
            )));
        }
        Ok(marker.len() / unit)
    }

    fn read_u32_field(&mut self, marker: Marker) -> ParseResult<u32> {
        self.expect_length(marker, 4)?;
        let value = self.reader.read_u32()?;
        self.expect_end(marker.tag)?;
        Ok(value)
    }

    fn read_i32_field(&mut self, marker: Marker) -> ParseResult<i32> {
        self.expect_length(marker, 4)?;
        let value = self.reader.read_i32()?;
        self.expect_end(marker.tag)?;
        Ok(value)
    }

    fn read_f32_field(&mut self, marker: Marker) -> ParseResult<f32> {
        self.expect_length(marker, 4)?;
        let value = self.reader.read_f32()?;
        self.expect_end(marker.tag)?;
        Ok(value)
    }

    fn read_vec3_field(&mut self, marker: Marker) -> ParseResult<Vec3> {
        self.expect_length(marker, 12)?;
        let v = self.reader.read_f32_vec(3)?;
        self.expect_end(marker.tag)?;
        Ok(Vec3::new(v[0], v[1], v[2]))
    }

    fn read_string_field(&mut self, marker: Marker) -> ParseResult<String> {
        let value = self.reader.read_fixed_string(marker.len())?;
        self.expect_end(marker.tag)?;
        Ok(value)
    }

    fn read_bytes_field(&mut self, marker: Marker) -> ParseResult<Vec<u8>> {
        let value = self.reader.read_bytes(marker.len())?.to_vec();
        self.expect_end(marker.tag)?;
        Ok(value)
    }

    fn read_f32_array_field(&mut self, marker: Marker, group: usize) -> ParseResult<Vec<f32>> {
        let count = self.expect_multiple(marker, 4 * group)? * group;
        let values = self.reader.read_f32_vec(count)?;
        self.expect_end(marker.tag)?;
        Ok(values)
    }

    fn read_i32_array_field(&mut self, marker: Marker) -> ParseResult<Vec<i32>> {
        let count = self.expect_multiple(marker, 4)?;
        let values = self.reader.read_i32_vec(count)?;
        self.expect_end(marker.tag)?;
        Ok(values)
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    fn parse_scene(&mut self) -> ParseResult<PodDocument> {
        let mut document = PodDocument::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::FILE_SCENE) {
                break;
            }

            let header = &mut document.header;
            match marker.tag {
                tags::SCENE_CLEAR_COLOUR => header.background_color = self.read_vec3_field(marker)?,
                tags::SCENE_AMBIENT_COLOUR => header.ambient_color = self.read_vec3_field(marker)?,
                tags::SCENE_NUM_CAMERA => header.num_cameras = self.read_u32_field(marker)?,
                tags::SCENE_NUM_LIGHT => header.num_lights = self.read_u32_field(marker)?,
                tags::SCENE_NUM_MESH => header.num_meshes = self.read_u32_field(marker)?,
                tags::SCENE_NUM_NODE => header.num_nodes = self.read_u32_field(marker)?,
                tags::SCENE_NUM_MESH_NODE => header.num_mesh_nodes = self.read_u32_field(marker)?,
                tags::SCENE_NUM_TEXTURE => header.num_textures = self.read_u32_field(marker)?,
                tags::SCENE_NUM_MATERIAL => header.num_materials = self.read_u32_field(marker)?,
                tags::SCENE_NUM_FRAME => header.num_frames = self.read_u32_field(marker)?,
                tags::SCENE_FLAGS => header.flags = self.read_u32_field(marker)?,
                tags::SCENE_FPS => header.fps = self.read_u32_field(marker)?,
                tags::SCENE_CAMERA => {
                    let camera = self.parse_camera()?;
                    document.cameras.push(camera);
                }
                tags::SCENE_LIGHT => {
                    let light = self.parse_light()?;
                    document.lights.push(light);
                }
                tags::SCENE_MESH => {
                    let mesh = self.parse_mesh()?;
                    document.meshes.push(mesh);
                }
                tags::SCENE_NODE => {
                    let node = self.parse_node(document.nodes.len())?;
                    document.nodes.push(node);
                }
                tags::SCENE_TEXTURE => {
                    let texture = self.parse_texture()?;
                    document.textures.push(texture);
                }
                tags::SCENE_MATERIAL => {
                    let material = self.parse_material()?;
                    document.materials.push(material);
                }
                _ => self.skip_unknown(marker)?,
            }
        }

        // Static scenes are exported with a frame count of zero
        if document.header.num_frames == 0 {
            document.header.num_frames = 1;
        }

        self.validate_counts(&document)?;

        log::debug!(
            "Decoded POD scene: {} nodes, {} meshes, {} materials, {} cameras, {} lights",
            document.nodes.len(),
            document.meshes.len(),
            document.materials.len(),
            document.cameras.len(),
            document.lights.len()
        );

        Ok(document)
    }

    fn validate_counts(&self, document: &PodDocument) -> ParseResult<()> {
        let h = &document.header;
        let checks = [
            ("nodes", h.num_nodes, document.nodes.len()),
            ("meshes", h.num_meshes, document.meshes.len()),
            ("materials", h.num_materials, document.materials.len()),
            ("textures", h.num_textures, document.textures.len()),
            ("cameras", h.num_cameras, document.cameras.len()),
            ("lights", h.num_lights, document.lights.len()),
        ];
        for (what, declared, decoded) in checks {
            if declared as usize != decoded {
                return Err(self.malformed(format!(
                    "header declares {} {}, file contains {}",
                    declared, what, decoded
                )));
            }
        }

        let typed_nodes = h.num_mesh_nodes as u64 + h.num_lights as u64 + h.num_cameras as u64;
        if typed_nodes > h.num_nodes as u64 {
            return Err(self.malformed(format!(
                "{} mesh/light/camera nodes declared but only {} nodes",
                typed_nodes, h.num_nodes
            )));
        }

        Ok(())
    }

    fn parse_node(&mut self, index: usize) -> ParseResult<RawNode> {
        let mut node = RawNode {
            index,
            object_index: -1,
            material_index: -1,
            parent_index: -1,
            ..Default::default()
        };

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_NODE) {
                break;
            }

            match marker.tag {
                tags::NODE_IDX => node.object_index = self.read_i32_field(marker)?,
                tags::NODE_NAME => node.name = self.read_string_field(marker)?,
                tags::NODE_IDX_MAT => node.material_index = self.read_i32_field(marker)?,
                tags::NODE_IDX_PARENT => node.parent_index = self.read_i32_field(marker)?,
                tags::NODE_ANIM_FLAGS => node.animation.flags = self.read_u32_field(marker)?,
                tags::NODE_ANIM_POS => {
                    let values = self.read_f32_array_field(marker, 3)?;
                    node.animation.positions = values
                        .chunks_exact(3)
                        .map(|c| Vec3::new(c[0], c[1], c[2]))
                        .collect();
                }
                tags::NODE_ANIM_ROT => {
                    let values = self.read_f32_array_field(marker, 4)?;
                    node.animation.rotations = values
                        .chunks_exact(4)
                        .map(|c| Quat::from_xyzw(c[0], c[1], c[2], c[3]))
                        .collect();
                }
                tags::NODE_ANIM_SCALE => {
                    let values = self.read_f32_array_field(marker, SCALE_FLOATS)?;
                    node.animation.scales = values
                        .chunks_exact(SCALE_FLOATS)
                        .map(|c| Vec3::new(c[0], c[1], c[2]))
                        .collect();
                }
                tags::NODE_ANIM_MATRIX => {
                    let values = self.read_f32_array_field(marker, POD_MATRIX_FLOATS)?;
                    node.animation.matrices = values
                        .chunks_exact(POD_MATRIX_FLOATS)
                        .filter_map(matrix_from_pod)
                        .collect();
                }
                _ => self.skip_unknown(marker)?,
            }
        }

        Ok(node)
    }

    fn parse_mesh(&mut self) -> ParseResult<RawMesh> {
        let mut mesh = RawMesh::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_MESH) {
                break;
            }

            let interleaved = mesh.interleaved.is_some();
            match marker.tag {
                tags::MESH_NUM_VTX => mesh.vertex_count = self.read_u32_field(marker)?,
                tags::MESH_NUM_FACES => mesh.face_count = self.read_u32_field(marker)?,
                tags::MESH_NUM_UVW => mesh.uv_channel_count = self.read_u32_field(marker)?,
                tags::MESH_NUM_STRIPS => {
                    // Implied by the strip length array
                    self.read_u32_field(marker)?;
                }
                tags::MESH_STRIP_LENGTH => {
                    mesh.strip_lengths = self
                        .read_i32_array_field(marker)?
                        .into_iter()
                        .map(|l| l.max(0) as u32)
                        .collect();
                }
                tags::MESH_INTERLEAVED => mesh.interleaved = Some(self.read_bytes_field(marker)?),
                // Index data is never interleaved
                tags::MESH_FACES => mesh.faces = self.parse_data_block(marker.tag, false)?,
                tags::MESH_VTX => mesh.positions = self.parse_data_block(marker.tag, interleaved)?,
                tags::MESH_NOR => mesh.normals = self.parse_data_block(marker.tag, interleaved)?,
                tags::MESH_TAN => mesh.tangents = self.parse_data_block(marker.tag, interleaved)?,
                tags::MESH_BIN => mesh.binormals = self.parse_data_block(marker.tag, interleaved)?,
                tags::MESH_UVW => {
                    if let Some(block) = self.parse_data_block(marker.tag, interleaved)? {
                        mesh.uvs.push(block);
                    }
                }
                tags::MESH_VTX_COLOURS => {
                    mesh.colours = self.parse_data_block(marker.tag, interleaved)?
                }
                tags::MESH_BONE_IDX => {
                    mesh.bone_indices = self.parse_data_block(marker.tag, interleaved)?
                }
                tags::MESH_BONE_WEIGHT => {
                    mesh.bone_weights = self.parse_data_block(marker.tag, interleaved)?
                }
                tags::MESH_BONE_BATCHES => {
                    mesh.bone_batches.bones = self.read_i32_array_field(marker)?
                }
                tags::MESH_BONE_BATCH_BONE_CNTS => {
                    mesh.bone_batches.bone_counts = self.read_i32_array_field(marker)?
                }
                tags::MESH_BONE_BATCH_OFFSETS => {
                    mesh.bone_batches.triangle_offsets = self.read_i32_array_field(marker)?
                }
                tags::MESH_BONE_BATCH_BONE_MAX => {
                    mesh.bone_batches.max_bones = self.read_u32_field(marker)?
                }
                tags::MESH_BONE_BATCH_CNT => {
                    mesh.bone_batches.batch_count = self.read_u32_field(marker)?
                }
                tags::MESH_UNPACK_MATRIX => {
                    let values = self.read_f32_array_field(marker, POD_MATRIX_FLOATS)?;
                    mesh.unpack_matrix = matrix_from_pod(&values);
                }
                _ => self.skip_unknown(marker)?,
            }
        }

        self.validate_mesh(&mesh)?;
        Ok(mesh)
    }

    /// Check that every data block covers the elements the mesh declares,
    /// so later decoding never reads out of bounds.
    fn validate_mesh(&self, mesh: &RawMesh) -> ParseResult<()> {
        let vertex_count = mesh.vertex_count as usize;
        let interleaved_len = mesh.interleaved.as_ref().map(|b| b.len());

        let attributes = [
            ("positions", mesh.positions.as_ref()),
            ("normals", mesh.normals.as_ref()),
            ("tangents", mesh.tangents.as_ref()),
            ("binormals", mesh.binormals.as_ref()),
            ("colours", mesh.colours.as_ref()),
            ("bone indices", mesh.bone_indices.as_ref()),
            ("bone weights", mesh.bone_weights.as_ref()),
        ];
        for (what, block) in attributes {
            if let Some(block) = block {
                self.validate_block(what, block, vertex_count, interleaved_len)?;
            }
        }
        for block in &mesh.uvs {
            self.validate_block("uvs", block, vertex_count, interleaved_len)?;
        }

        if let Some(faces) = &mesh.faces {
            if !matches!(faces.data_type, DataType::UnsignedShort | DataType::UnsignedInt) {
                return Err(self.malformed(format!(
                    "unsupported index type {:?}",
                    faces.data_type
                )));
            }
            self.validate_block("faces", faces, mesh.index_count(), None)?;
        }

        let batches = &mesh.bone_batches;
        if mesh.is_skinned() && batches.is_empty() {
            return Err(self.malformed("skinned mesh without bone batches"));
        }
        if batches.bone_counts.len() != batches.triangle_offsets.len() {
            return Err(self.malformed(format!(
                "{} bone batch counts but {} batch offsets",
                batches.bone_counts.len(),
                batches.triangle_offsets.len()
            )));
        }
        if batches.batch_count != 0 && batches.batch_count as usize != batches.bone_counts.len() {
            return Err(self.malformed(format!(
                "bone batch count {} does not match {} batches",
                batches.batch_count,
                batches.bone_counts.len()
            )));
        }
        if batches.bone_counts.iter().any(|&c| c < 0) {
            return Err(self.malformed("negative bone count in batch table"));
        }
        let listed: i64 = batches.bone_counts.iter().map(|&c| c as i64).sum();
        if listed != batches.bones.len() as i64 {
            return Err(self.malformed(format!(
                "bone batches list {} bones, table holds {}",
                listed,
                batches.bones.len()
            )));
        }

        Ok(())
    }

    fn validate_block(
        &self,
        what: &str,
        block: &DataBlock,
        elements: usize,
        interleaved_len: Option<usize>,
    ) -> ParseResult<()> {
        if elements == 0 {
            return Ok(());
        }

        let needed = block.element_size().and_then(|size| {
            (elements - 1)
                .checked_mul(block.effective_stride())?
                .checked_add(size)
        });
        let needed = match needed {
            Some(needed) => needed,
            None => {
                return Err(self.malformed(format!(
                    "{} size overflows for {} elements",
                    what, elements
                )))
            }
        };
        let (available, start) = match &block.source {
            DataSource::Owned(bytes) => (bytes.len(), 0),
            DataSource::Interleaved { offset } => match interleaved_len {
                Some(len) => (len, *offset as usize),
                None => {
                    return Err(self.malformed(format!(
                        "{} reference interleaved data the mesh does not have",
                        what
                    )))
                }
            },
        };

        if start.checked_add(needed).map_or(true, |end| end > available) {
            return Err(self.malformed(format!(
                "{} need {} bytes for {} elements, block holds {}",
                what,
                needed,
                elements,
                available.saturating_sub(start)
            )));
        }
        Ok(())
    }

    /// Parse a nested data block. Returns `None` for blocks with no
    /// components, which is how absent attributes are written.
    fn parse_data_block(&mut self, tag: u32, interleaved: bool) -> ParseResult<Option<DataBlock>> {
        let mut data_type = 0u32;
        let mut components = 0u32;
        let mut stride = 0u32;
        let mut source = None;

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tag) {
                break;
            }

            match marker.tag {
                tags::BLOCK_DATA_TYPE => data_type = self.read_u32_field(marker)?,
                tags::BLOCK_N => components = self.read_u32_field(marker)?,
                tags::BLOCK_STRIDE => stride = self.read_u32_field(marker)?,
                tags::BLOCK_DATA if interleaved => {
                    let offset = self.read_u32_field(marker)?;
                    source = Some(DataSource::Interleaved { offset });
                }
                tags::BLOCK_DATA => {
                    source = Some(DataSource::Owned(self.read_bytes_field(marker)?));
                }
                _ => self.skip_unknown(marker)?,
            }
        }

        if components == 0 {
            return Ok(None);
        }

        let data_type = DataType::from_u32(data_type)
            .ok_or_else(|| self.malformed(format!("unknown data type {} in chunk {}", data_type, tag)))?;
        let source =
            source.ok_or_else(|| self.malformed(format!("data block {} has no data", tag)))?;

        Ok(Some(DataBlock {
            data_type,
            components,
            stride,
            source,
        }))
    }

    fn parse_material(&mut self) -> ParseResult<RawMaterial> {
        let mut material = RawMaterial::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_MATERIAL) {
                break;
            }

            let blend = &mut material.blend;
            match marker.tag {
                tags::MATERIAL_NAME => material.name = self.read_string_field(marker)?,
                tags::MATERIAL_IDX_TEX_DIFFUSE => {
                    material.diffuse_texture = self.read_i32_field(marker)?
                }
                tags::MATERIAL_OPACITY => material.opacity = self.read_f32_field(marker)?,
                tags::MATERIAL_AMBIENT_COLOUR => {
                    material.ambient_color = self.read_vec3_field(marker)?
                }
                tags::MATERIAL_DIFFUSE_COLOUR => {
                    material.diffuse_color = self.read_vec3_field(marker)?
                }
                tags::MATERIAL_SPECULAR_COLOUR => {
                    material.specular_color = self.read_vec3_field(marker)?
                }
                tags::MATERIAL_SHININESS => material.shininess = self.read_f32_field(marker)?,
                tags::MATERIAL_BLEND_SRC_RGB => blend.src_rgb = self.read_u32_field(marker)?,
                tags::MATERIAL_BLEND_SRC_A => blend.src_alpha = self.read_u32_field(marker)?,
                tags::MATERIAL_BLEND_DST_RGB => blend.dst_rgb = self.read_u32_field(marker)?,
                tags::MATERIAL_BLEND_DST_A => blend.dst_alpha = self.read_u32_field(marker)?,
                tags::MATERIAL_BLEND_OP_RGB => blend.op_rgb = self.read_u32_field(marker)?,
                tags::MATERIAL_BLEND_OP_A => blend.op_alpha = self.read_u32_field(marker)?,
                tags::MATERIAL_FLAGS => material.flags = self.read_u32_field(marker)?,
                _ => self.skip_unknown(marker)?,
            }
        }

        Ok(material)
    }

    fn parse_texture(&mut self) -> ParseResult<RawTexture> {
        let mut texture = RawTexture::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_TEXTURE) {
                break;
            }

            match marker.tag {
                tags::TEXTURE_FILENAME => texture.file_name = self.read_string_field(marker)?,
                _ => self.skip_unknown(marker)?,
            }
        }

        Ok(texture)
    }

    fn parse_camera(&mut self) -> ParseResult<RawCamera> {
        let mut camera = RawCamera::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_CAMERA) {
                break;
            }

            match marker.tag {
                tags::CAMERA_IDX_TGT => camera.target_index = self.read_i32_field(marker)?,
                tags::CAMERA_FOV => camera.fov = self.read_f32_field(marker)?,
                tags::CAMERA_FAR => camera.far = self.read_f32_field(marker)?,
                tags::CAMERA_NEAR => camera.near = self.read_f32_field(marker)?,
                tags::CAMERA_ANIM_FOV => camera.fov_animation = self.read_f32_array_field(marker, 1)?,
                _ => self.skip_unknown(marker)?,
            }
        }

        Ok(camera)
    }

    fn parse_light(&mut self) -> ParseResult<RawLight> {
        let mut light = RawLight::default();

        loop {
            let marker = self.reader.read_marker()?;
            if marker.is_end_of(tags::SCENE_LIGHT) {
                break;
            }

            match marker.tag {
                tags::LIGHT_IDX_TGT => light.target_index = self.read_i32_field(marker)?,
                tags::LIGHT_COLOUR => light.color = self.read_vec3_field(marker)?,
                tags::LIGHT_TYPE => {
                    let raw = self.read_u32_field(marker)?;
                    light.light_type = LightType::from_u32(raw)
                        .ok_or_else(|| self.malformed(format!("unknown light type {}", raw)))?;
                }
                tags::LIGHT_CONSTANT_ATTENUATION => {
                    light.constant_attenuation = self.read_f32_field(marker)?
                }
                tags::LIGHT_LINEAR_ATTENUATION => {
                    light.linear_attenuation = self.read_f32_field(marker)?
                }
                tags::LIGHT_QUADRATIC_ATTENUATION => {
                    light.quadratic_attenuation = self.read_f32_field(marker)?
                }
                tags::LIGHT_FALLOFF_ANGLE => light.falloff_angle = self.read_f32_field(marker)?,
                tags::LIGHT_FALLOFF_EXPONENT => {
                    light.falloff_exponent = self.read_f32_field(marker)?
                }
                _ => self.skip_unknown(marker)?,
            }
        }

        Ok(light)
    }
}
