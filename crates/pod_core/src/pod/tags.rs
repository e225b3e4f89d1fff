//! Chunk tag identifiers of the POD container.

/// Version string every supported file carries.
pub const POD_VERSION: &str = "AB.POD.2.0";

// File level
pub const FILE_VERSION: u32 = 1000;
pub const FILE_SCENE: u32 = 1001;

// Scene
pub const SCENE_CLEAR_COLOUR: u32 = 2000;
pub const SCENE_AMBIENT_COLOUR: u32 = 2001;
pub const SCENE_NUM_CAMERA: u32 = 2002;
pub const SCENE_NUM_LIGHT: u32 = 2003;
pub const SCENE_NUM_MESH: u32 = 2004;
pub const SCENE_NUM_NODE: u32 = 2005;
pub const SCENE_NUM_MESH_NODE: u32 = 2006;
pub const SCENE_NUM_TEXTURE: u32 = 2007;
pub const SCENE_NUM_MATERIAL: u32 = 2008;
pub const SCENE_NUM_FRAME: u32 = 2009;
pub const SCENE_CAMERA: u32 = 2010;
pub const SCENE_LIGHT: u32 = 2011;
pub const SCENE_MESH: u32 = 2012;
pub const SCENE_NODE: u32 = 2013;
pub const SCENE_TEXTURE: u32 = 2014;
pub const SCENE_MATERIAL: u32 = 2015;
pub const SCENE_FLAGS: u32 = 2016;
pub const SCENE_FPS: u32 = 2017;

// Material
pub const MATERIAL_NAME: u32 = 3000;
pub const MATERIAL_IDX_TEX_DIFFUSE: u32 = 3001;
pub const MATERIAL_OPACITY: u32 = 3002;
pub const MATERIAL_AMBIENT_COLOUR: u32 = 3003;
pub const MATERIAL_DIFFUSE_COLOUR: u32 = 3004;
pub const MATERIAL_SPECULAR_COLOUR: u32 = 3005;
pub const MATERIAL_SHININESS: u32 = 3006;
pub const MATERIAL_BLEND_SRC_RGB: u32 = 3018;
pub const MATERIAL_BLEND_SRC_A: u32 = 3019;
pub const MATERIAL_BLEND_DST_RGB: u32 = 3020;
pub const MATERIAL_BLEND_DST_A: u32 = 3021;
pub const MATERIAL_BLEND_OP_RGB: u32 = 3022;
pub const MATERIAL_BLEND_OP_A: u32 = 3023;
pub const MATERIAL_FLAGS: u32 = 3026;

// Texture
pub const TEXTURE_FILENAME: u32 = 4000;

// Node
pub const NODE_IDX: u32 = 5000;
pub const NODE_NAME: u32 = 5001;
pub const NODE_IDX_MAT: u32 = 5002;
pub const NODE_IDX_PARENT: u32 = 5003;
pub const NODE_ANIM_POS: u32 = 5007;
pub const NODE_ANIM_ROT: u32 = 5008;
pub const NODE_ANIM_SCALE: u32 = 5009;
pub const NODE_ANIM_MATRIX: u32 = 5011;
pub const NODE_ANIM_FLAGS: u32 = 5012;

// Mesh
pub const MESH_NUM_VTX: u32 = 6000;
pub const MESH_NUM_FACES: u32 = 6001;
pub const MESH_NUM_UVW: u32 = 6002;
pub const MESH_FACES: u32 = 6003;
pub const MESH_STRIP_LENGTH: u32 = 6004;
pub const MESH_NUM_STRIPS: u32 = 6005;
pub const MESH_VTX: u32 = 6006;
pub const MESH_NOR: u32 = 6007;
pub const MESH_TAN: u32 = 6008;
pub const MESH_BIN: u32 = 6009;
pub const MESH_UVW: u32 = 6010;
pub const MESH_VTX_COLOURS: u32 = 6011;
pub const MESH_BONE_IDX: u32 = 6012;
pub const MESH_BONE_WEIGHT: u32 = 6013;
pub const MESH_INTERLEAVED: u32 = 6014;
pub const MESH_BONE_BATCHES: u32 = 6015;
pub const MESH_BONE_BATCH_BONE_CNTS: u32 = 6016;
pub const MESH_BONE_BATCH_OFFSETS: u32 = 6017;
pub const MESH_BONE_BATCH_BONE_MAX: u32 = 6018;
pub const MESH_BONE_BATCH_CNT: u32 = 6019;
pub const MESH_UNPACK_MATRIX: u32 = 6020;

// Light
pub const LIGHT_IDX_TGT: u32 = 7000;
pub const LIGHT_COLOUR: u32 = 7001;
pub const LIGHT_TYPE: u32 = 7002;
pub const LIGHT_CONSTANT_ATTENUATION: u32 = 7003;
pub const LIGHT_LINEAR_ATTENUATION: u32 = 7004;
pub const LIGHT_QUADRATIC_ATTENUATION: u32 = 7005;
pub const LIGHT_FALLOFF_ANGLE: u32 = 7006;
pub const LIGHT_FALLOFF_EXPONENT: u32 = 7007;

// Camera
pub const CAMERA_IDX_TGT: u32 = 8000;
pub const CAMERA_FOV: u32 = 8001;
pub const CAMERA_FAR: u32 = 8002;
pub const CAMERA_NEAR: u32 = 8003;
pub const CAMERA_ANIM_FOV: u32 = 8004;

// Data block
pub const BLOCK_DATA_TYPE: u32 = 9000;
pub const BLOCK_N: u32 = 9001;
pub const BLOCK_STRIDE: u32 = 9002;
pub const BLOCK_DATA: u32 = 9003;

// Node animation flags
pub const ANIM_HAS_POSITION: u32 = 0x01;
pub const ANIM_HAS_ROTATION: u32 = 0x02;
pub const ANIM_HAS_SCALE: u32 = 0x04;
pub const ANIM_HAS_MATRIX: u32 = 0x08;

/// Material flag: alpha blending enabled.
pub const MATERIAL_BLENDING_ENABLED: u32 = 0x01;

/// Floats per serialized scale entry (xyz scale plus a stretch quaternion).
pub const SCALE_FLOATS: usize = 7;
