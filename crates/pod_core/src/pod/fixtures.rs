//! Test-only POD writer and canned scenes.

use pod_math::{Mat4, Quat, Vec2, Vec3};

use super::reader::TAG_END;
use super::tags::{self, POD_VERSION};

/// Appends POD markers and payloads to a byte buffer.
#[derive(Default)]
pub struct PodWriter {
    bytes: Vec<u8>,
}

impl PodWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(&mut self, tag: u32, length: u32) -> &mut Self {
        self.bytes.extend_from_slice(&tag.to_le_bytes());
        self.bytes.extend_from_slice(&length.to_le_bytes());
        self
    }

    /// Append bytes without framing.
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn begin(&mut self, tag: u32) -> &mut Self {
        self.marker(tag, 0)
    }

    pub fn end(&mut self, tag: u32) -> &mut Self {
        self.marker(tag | TAG_END, 0)
    }

    pub fn data(&mut self, tag: u32, payload: &[u8]) -> &mut Self {
        self.marker(tag, payload.len() as u32);
        self.bytes.extend_from_slice(payload);
        self.end(tag)
    }

    pub fn u32(&mut self, tag: u32, value: u32) -> &mut Self {
        self.data(tag, &value.to_le_bytes())
    }

    pub fn i32(&mut self, tag: u32, value: i32) -> &mut Self {
        self.data(tag, &value.to_le_bytes())
    }

    pub fn f32(&mut self, tag: u32, value: f32) -> &mut Self {
        self.data(tag, &value.to_le_bytes())
    }

    pub fn floats(&mut self, tag: u32, values: &[f32]) -> &mut Self {
        self.data(tag, &float_bytes(values))
    }

    pub fn vec3(&mut self, tag: u32, value: Vec3) -> &mut Self {
        self.floats(tag, &value.to_array())
    }

    pub fn i32s(&mut self, tag: u32, values: &[i32]) -> &mut Self {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.data(tag, &bytes)
    }

    /// NUL-terminated string payload.
    pub fn string(&mut self, tag: u32, value: &str) -> &mut Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.data(tag, &bytes)
    }

    /// A data block container. `payload` is either the attribute bytes or,
    /// for interleaved meshes, the 4-byte offset.
    pub fn block(&mut self, tag: u32, data_type: u32, components: u32, stride: u32, payload: &[u8]) -> &mut Self {
        self.begin(tag)
            .u32(tags::BLOCK_DATA_TYPE, data_type)
            .u32(tags::BLOCK_N, components)
            .u32(tags::BLOCK_STRIDE, stride)
            .data(tags::BLOCK_DATA, payload)
            .end(tag)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn float_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[derive(Clone, Debug)]
pub struct NodeSpec {
    pub name: String,
    pub object_index: i32,
    pub material_index: i32,
    pub parent_index: i32,
    pub positions: Vec<Vec3>,
    pub rotation: Quat,
    pub scale: Vec3,
    pub matrix: Option<Mat4>,
}

impl NodeSpec {
    pub fn new(name: &str, object_index: i32, parent_index: i32) -> Self {
        Self {
            name: name.to_string(),
            object_index,
            material_index: -1,
            parent_index,
            positions: vec![Vec3::ZERO],
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.positions = vec![position];
        self
    }

    /// One position per frame.
    pub fn animated(mut self, positions: Vec<Vec3>) -> Self {
        self.positions = positions;
        self
    }

    pub fn with_material(mut self, material_index: i32) -> Self {
        self.material_index = material_index;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.matrix = Some(matrix);
        self
    }
}

#[derive(Clone, Debug)]
pub struct SkinSpec {
    /// Batch slot per vertex influence
    pub indices: Vec<[u8; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub bones: Vec<i32>,
    pub bone_counts: Vec<i32>,
    pub offsets: Vec<i32>,
}

#[derive(Clone, Debug)]
pub struct MeshSpec {
    pub positions: Vec<Vec3>,
    pub uvs: Option<Vec<Vec2>>,
    pub indices: Vec<u16>,
    pub skin: Option<SkinSpec>,
    pub interleaved: bool,
}

impl MeshSpec {
    /// A single triangle in the XY plane.
    pub fn triangle() -> Self {
        Self {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            uvs: None,
            indices: vec![0, 1, 2],
            skin: None,
            interleaved: false,
        }
    }

    pub fn with_uvs(mut self) -> Self {
        self.uvs = Some(vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
        self
    }

    pub fn interleaved(mut self) -> Self {
        self.interleaved = true;
        self
    }

    /// Bind every vertex fully to the first bone of a single batch.
    pub fn skinned(mut self, bones: &[i32]) -> Self {
        let count = self.positions.len();
        self.skin = Some(SkinSpec {
            indices: vec![[0, 0, 0, 0]; count],
            weights: vec![[1.0, 0.0, 0.0, 0.0]; count],
            bones: bones.to_vec(),
            bone_counts: vec![bones.len() as i32],
            offsets: vec![0],
        });
        self
    }

    fn write(&self, w: &mut PodWriter) {
        let vertex_count = self.positions.len();
        w.begin(tags::SCENE_MESH)
            .u32(tags::MESH_NUM_VTX, vertex_count as u32)
            .u32(tags::MESH_NUM_FACES, (self.indices.len() / 3) as u32)
            .u32(tags::MESH_NUM_UVW, self.uvs.is_some() as u32);

        let index_bytes: Vec<u8> = self.indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        w.block(tags::MESH_FACES, 3, 1, 2, &index_bytes);

        // (tag, data type, components, element bytes per vertex)
        let mut attributes: Vec<(u32, u32, u32, Vec<Vec<u8>>)> = vec![(
            tags::MESH_VTX,
            1,
            3,
            self.positions.iter().map(|p| float_bytes(&p.to_array())).collect(),
        )];
        if let Some(uvs) = &self.uvs {
            attributes.push((
                tags::MESH_UVW,
                1,
                2,
                uvs.iter().map(|uv| float_bytes(&uv.to_array())).collect(),
            ));
        }
        if let Some(skin) = &self.skin {
            attributes.push((tags::MESH_BONE_IDX, 7, 4, skin.indices.iter().map(|i| i.to_vec()).collect()));
            attributes.push((
                tags::MESH_BONE_WEIGHT,
                1,
                4,
                skin.weights.iter().map(|wt| float_bytes(wt)).collect(),
            ));
        }

        if self.interleaved {
            let stride: usize = attributes.iter().map(|a| a.3[0].len()).sum();
            let mut buffer = Vec::with_capacity(stride * vertex_count);
            for v in 0..vertex_count {
                for attribute in &attributes {
                    buffer.extend_from_slice(&attribute.3[v]);
                }
            }
            w.data(tags::MESH_INTERLEAVED, &buffer);

            let mut offset = 0u32;
            for (tag, data_type, components, elements) in &attributes {
                w.block(*tag, *data_type, *components, stride as u32, &offset.to_le_bytes());
                offset += elements[0].len() as u32;
            }
        } else {
            for (tag, data_type, components, elements) in &attributes {
                let bytes: Vec<u8> = elements.concat();
                w.block(*tag, *data_type, *components, elements[0].len() as u32, &bytes);
            }
        }

        if let Some(skin) = &self.skin {
            w.i32s(tags::MESH_BONE_BATCHES, &skin.bones)
                .i32s(tags::MESH_BONE_BATCH_BONE_CNTS, &skin.bone_counts)
                .i32s(tags::MESH_BONE_BATCH_OFFSETS, &skin.offsets)
                .u32(
                    tags::MESH_BONE_BATCH_BONE_MAX,
                    skin.bone_counts.iter().copied().max().unwrap_or(0) as u32,
                )
                .u32(tags::MESH_BONE_BATCH_CNT, skin.bone_counts.len() as u32);
        }

        w.end(tags::SCENE_MESH);
    }
}

#[derive(Clone, Debug)]
pub struct MaterialSpec {
    pub name: String,
    pub texture: i32,
    pub diffuse: Vec3,
    pub flags: u32,
}

impl MaterialSpec {
    pub fn new(name: &str, texture: i32) -> Self {
        Self {
            name: name.to_string(),
            texture,
            diffuse: Vec3::new(0.8, 0.2, 0.2),
            flags: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LightSpec {
    pub color: Vec3,
    pub light_type: u32,
    pub target: i32,
}

#[derive(Clone, Debug)]
pub struct CameraSpec {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub target: i32,
}

/// A whole scene. Nodes must already be ordered mesh nodes, light nodes,
/// camera nodes, others.
#[derive(Clone, Debug, Default)]
pub struct SceneSpec {
    pub nodes: Vec<NodeSpec>,
    pub mesh_node_count: u32,
    pub meshes: Vec<MeshSpec>,
    pub materials: Vec<MaterialSpec>,
    pub textures: Vec<String>,
    pub cameras: Vec<CameraSpec>,
    pub lights: Vec<LightSpec>,
    pub frames: u32,
    pub ambient: Vec3,
    pub background: Vec3,

    /// Node count written to the header instead of `nodes.len()`
    pub declared_nodes: Option<u32>,
}

impl SceneSpec {
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with(|_| {})
    }

    /// Serialize, calling `extra` just before the scene end marker.
    pub fn to_bytes_with(&self, extra: impl FnOnce(&mut PodWriter)) -> Vec<u8> {
        let mut w = PodWriter::new();
        w.string(tags::FILE_VERSION, POD_VERSION);
        w.begin(tags::FILE_SCENE)
            .vec3(tags::SCENE_CLEAR_COLOUR, self.background)
            .vec3(tags::SCENE_AMBIENT_COLOUR, self.ambient)
            .u32(tags::SCENE_NUM_CAMERA, self.cameras.len() as u32)
            .u32(tags::SCENE_NUM_LIGHT, self.lights.len() as u32)
            .u32(tags::SCENE_NUM_MESH, self.meshes.len() as u32)
            .u32(
                tags::SCENE_NUM_NODE,
                self.declared_nodes.unwrap_or(self.nodes.len() as u32),
            )
            .u32(tags::SCENE_NUM_MESH_NODE, self.mesh_node_count)
            .u32(tags::SCENE_NUM_TEXTURE, self.textures.len() as u32)
            .u32(tags::SCENE_NUM_MATERIAL, self.materials.len() as u32)
            .u32(tags::SCENE_NUM_FRAME, self.frames)
            .u32(tags::SCENE_FLAGS, 0)
            .u32(tags::SCENE_FPS, 30);

        for camera in &self.cameras {
            w.begin(tags::SCENE_CAMERA)
                .i32(tags::CAMERA_IDX_TGT, camera.target)
                .f32(tags::CAMERA_FOV, camera.fov)
                .f32(tags::CAMERA_FAR, camera.far)
                .f32(tags::CAMERA_NEAR, camera.near)
                .end(tags::SCENE_CAMERA);
        }

        for light in &self.lights {
            w.begin(tags::SCENE_LIGHT)
                .i32(tags::LIGHT_IDX_TGT, light.target)
                .vec3(tags::LIGHT_COLOUR, light.color)
                .u32(tags::LIGHT_TYPE, light.light_type)
                .end(tags::SCENE_LIGHT);
        }

        for mesh in &self.meshes {
            mesh.write(&mut w);
        }

        for node in &self.nodes {
            let mut flags = 0;
            if node.positions.len() > 1 {
                flags |= tags::ANIM_HAS_POSITION;
            }
            w.begin(tags::SCENE_NODE)
                .i32(tags::NODE_IDX, node.object_index)
                .string(tags::NODE_NAME, &node.name)
                .i32(tags::NODE_IDX_MAT, node.material_index)
                .i32(tags::NODE_IDX_PARENT, node.parent_index)
                .u32(tags::NODE_ANIM_FLAGS, flags | node.matrix.map_or(0, |_| tags::ANIM_HAS_MATRIX))
                .floats(
                    tags::NODE_ANIM_POS,
                    &node.positions.iter().flat_map(|p| p.to_array()).collect::<Vec<_>>(),
                )
                .floats(tags::NODE_ANIM_ROT, &node.rotation.to_array());

            // Scale plus an identity stretch quaternion
            let s = node.scale;
            w.floats(tags::NODE_ANIM_SCALE, &[s.x, s.y, s.z, 0.0, 0.0, 0.0, 1.0]);
            if let Some(matrix) = node.matrix {
                w.floats(tags::NODE_ANIM_MATRIX, &matrix.to_cols_array());
            }
            w.end(tags::SCENE_NODE);
        }

        for texture in &self.textures {
            w.begin(tags::SCENE_TEXTURE)
                .string(tags::TEXTURE_FILENAME, texture)
                .end(tags::SCENE_TEXTURE);
        }

        for material in &self.materials {
            w.begin(tags::SCENE_MATERIAL)
                .string(tags::MATERIAL_NAME, &material.name)
                .i32(tags::MATERIAL_IDX_TEX_DIFFUSE, material.texture)
                .f32(tags::MATERIAL_OPACITY, 1.0)
                .vec3(tags::MATERIAL_DIFFUSE_COLOUR, material.diffuse)
                .u32(tags::MATERIAL_FLAGS, material.flags)
                .end(tags::SCENE_MATERIAL);
        }

        extra(&mut w);
        w.end(tags::FILE_SCENE);
        w.into_bytes()
    }
}

/// Mesh node "torso" (index 0) under structural "root" (index 1), with the
/// bone "spine" (index 2) under "torso". Mesh 0 is skinned to "spine".
pub fn torso_scene() -> SceneSpec {
    SceneSpec {
        nodes: vec![
            NodeSpec::new("torso", 0, 1).with_material(0).at(Vec3::new(0.0, 1.0, 0.0)),
            NodeSpec::new("root", -1, -1).at(Vec3::new(2.0, 0.0, 0.0)),
            NodeSpec::new("spine", -1, 0).at(Vec3::new(0.0, 0.5, 0.0)),
        ],
        mesh_node_count: 1,
        meshes: vec![MeshSpec::triangle().with_uvs().skinned(&[2])],
        materials: vec![MaterialSpec::new("skin", 0)],
        textures: vec!["torso.png".to_string()],
        frames: 1,
        ambient: Vec3::new(0.1, 0.1, 0.1),
        background: Vec3::new(0.2, 0.3, 0.4),
        ..Default::default()
    }
}

/// Two mesh nodes sharing mesh 0, one point light and one camera, plus a
/// structural group node parenting everything.
pub fn lit_scene() -> SceneSpec {
    SceneSpec {
        nodes: vec![
            NodeSpec::new("box_a", 0, 4).with_material(0),
            NodeSpec::new("box_b", 0, 0).with_material(0).at(Vec3::X),
            NodeSpec::new("lamp", 0, 4).at(Vec3::new(0.0, 5.0, 0.0)),
            NodeSpec::new("eye", 0, 4).at(Vec3::new(0.0, 0.0, 10.0)),
            NodeSpec::new("group", -1, -1).at(Vec3::new(1.0, 0.0, 0.0)),
        ],
        mesh_node_count: 2,
        meshes: vec![MeshSpec::triangle()],
        materials: vec![MaterialSpec::new("paint", -1)],
        cameras: vec![CameraSpec {
            fov: 0.8,
            near: 0.1,
            far: 50.0,
            target: 0,
        }],
        lights: vec![LightSpec {
            color: Vec3::new(1.0, 0.9, 0.8),
            light_type: 0,
            target: -1,
        }],
        frames: 0,
        ..Default::default()
    }
}
