//! Builders for synthetic Pure3D containers

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use glam::{Mat4, Quat, Vec2, Vec3};

pub const ROOT: u32 = 0xFF44_3350;
pub const MESH: u32 = 0x0001_0000;
pub const SKIN: u32 = 0x0001_0001;
pub const PRIMITIVE_GROUP: u32 = 0x0001_0002;
pub const POSITION_LIST: u32 = 0x0001_0005;
pub const NORMAL_LIST: u32 = 0x0001_0006;
pub const UV_LIST: u32 = 0x0001_0007;
pub const COLOUR_LIST: u32 = 0x0001_0008;
pub const INDEX_LIST: u32 = 0x0001_000A;
pub const MATRIX_LIST: u32 = 0x0001_000B;
pub const WEIGHT_LIST: u32 = 0x0001_000C;
pub const MATRIX_PALETTE: u32 = 0x0001_000D;
pub const VERTEX_SHADER: u32 = 0x0001_0011;
pub const SHADER: u32 = 0x0001_1000;
pub const SHADER_TEXTURE_PARAM: u32 = 0x0001_1002;
pub const SKELETON: u32 = 0x0000_4500;
pub const SKELETON_JOINT: u32 = 0x0000_4501;
pub const ANIMATION: u32 = 0x0012_1000;
pub const ANIMATION_GROUP: u32 = 0x0012_1001;
pub const ANIMATION_GROUP_LIST: u32 = 0x0012_1002;
pub const VECTOR2_CHANNEL: u32 = 0x0012_1103;
pub const VECTOR3_CHANNEL: u32 = 0x0012_1104;
pub const QUATERNION_CHANNEL: u32 = 0x0012_1105;
pub const COMPRESSED_QUATERNION_CHANNEL: u32 = 0x0012_1111;
pub const BASE_EMITTER: u32 = 0x0001_5805;
pub const BILLBOARD_QUAD_GROUP: u32 = 0x0001_7002;
pub const CAR_CAMERA_DATA: u32 = 0x0300_0100;
pub const PHYSICS_OBJECT: u32 = 0x0701_1000;

pub const TRIANGLE_LIST: u32 = 0;
pub const TRIANGLE_STRIP: u32 = 1;
pub const LINE_LIST: u32 = 2;

/// A chunk under construction: type id, payload bytes and child chunks
#[derive(Debug, Clone)]
pub struct ChunkBuilder {
    type_id: u32,
    payload: Vec<u8>,
    children: Vec<ChunkBuilder>,
}

impl ChunkBuilder {
    pub fn new(type_id: u32) -> Self {
        Self {
            type_id,
            payload: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn root() -> Self {
        Self::new(ROOT)
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.payload.write_u8(value).unwrap();
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.payload.write_u16::<LittleEndian>(value).unwrap();
        self
    }

    pub fn i16(mut self, value: i16) -> Self {
        self.payload.write_i16::<LittleEndian>(value).unwrap();
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.payload.write_u32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.payload.write_i32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn f32(mut self, value: f32) -> Self {
        self.payload.write_f32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.payload.extend_from_slice(bytes);
        self
    }

    /// Length-prefixed string
    pub fn string(self, value: &str) -> Self {
        self.u8(value.len() as u8).bytes(value.as_bytes())
    }

    /// NUL-padded four character code
    pub fn fourcc(self, value: &str) -> Self {
        let mut code = [0u8; 4];
        code[..value.len()].copy_from_slice(value.as_bytes());
        self.bytes(&code)
    }

    pub fn vec2(self, v: Vec2) -> Self {
        self.f32(v.x).f32(v.y)
    }

    pub fn vec3(self, v: Vec3) -> Self {
        self.f32(v.x).f32(v.y).f32(v.z)
    }

    /// Matrix in on-disk order
    pub fn matrix(self, m: Mat4) -> Self {
        m.to_cols_array().into_iter().fold(self, Self::f32)
    }

    pub fn child(mut self, child: ChunkBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ChunkBuilder>) -> Self {
        self.children.extend(children);
        self
    }

    /// Serialize with sizes computed from the payload and children
    pub fn build(&self) -> Vec<u8> {
        let children: Vec<u8> = self.children.iter().flat_map(|c| c.build()).collect();
        let header_size = 12 + self.payload.len() as u32;
        let chunk_size = header_size + children.len() as u32;

        let mut data = Vec::with_capacity(chunk_size as usize);
        data.write_u32::<LittleEndian>(self.type_id).unwrap();
        data.write_u32::<LittleEndian>(header_size).unwrap();
        data.write_u32::<LittleEndian>(chunk_size).unwrap();
        data.extend_from_slice(&self.payload);
        data.extend_from_slice(&children);
        data
    }
}

pub fn skeleton(name: &str, joints: &[(&str, u32, Mat4)]) -> ChunkBuilder {
    ChunkBuilder::new(SKELETON)
        .string(name)
        .u32(0)
        .u32(joints.len() as u32)
        .children(joints.iter().map(|&(joint, parent, rest)| {
            ChunkBuilder::new(SKELETON_JOINT)
                .string(joint)
                .u32(parent)
                .i32(0)
                .i32(0)
                .i32(0)
                .i32(0)
                .i32(0)
                .matrix(rest)
        }))
}

pub fn skin(name: &str, skeleton: &str, groups: Vec<ChunkBuilder>) -> ChunkBuilder {
    ChunkBuilder::new(SKIN)
        .string(name)
        .u32(0)
        .string(skeleton)
        .u32(groups.len() as u32)
        .children(groups)
}

pub fn mesh(name: &str, groups: Vec<ChunkBuilder>) -> ChunkBuilder {
    ChunkBuilder::new(MESH)
        .string(name)
        .u32(0)
        .u32(groups.len() as u32)
        .children(groups)
}

pub fn primitive_group(shader: &str, topology: u32, vertex_count: u32) -> ChunkBuilder {
    ChunkBuilder::new(PRIMITIVE_GROUP)
        .u32(0)
        .string(shader)
        .u32(topology)
        .u32(0)
        .u32(vertex_count)
        .u32(0)
        .u32(0)
}

pub fn positions(values: &[Vec3]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(POSITION_LIST).u32(values.len() as u32), |c, &v| c.vec3(v))
}

pub fn normals(values: &[Vec3]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(NORMAL_LIST).u32(values.len() as u32), |c, &v| c.vec3(v))
}

pub fn weights(values: &[Vec3]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(WEIGHT_LIST).u32(values.len() as u32), |c, &v| c.vec3(v))
}

pub fn uvs(values: &[Vec2]) -> ChunkBuilder {
    values.iter().fold(
        ChunkBuilder::new(UV_LIST).u32(values.len() as u32).u32(0),
        |c, &v| c.vec2(v),
    )
}

pub fn colours(values: &[u32]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(COLOUR_LIST).u32(values.len() as u32), |c, &v| c.u32(v))
}

pub fn indices(values: &[u32]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(INDEX_LIST).u32(values.len() as u32), |c, &v| c.u32(v))
}

pub fn matrix_list(values: &[[u8; 4]]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(MATRIX_LIST).u32(values.len() as u32), |c, v| c.bytes(v))
}

pub fn matrix_palette(values: &[u32]) -> ChunkBuilder {
    values
        .iter()
        .fold(ChunkBuilder::new(MATRIX_PALETTE).u32(values.len() as u32), |c, &v| c.u32(v))
}

pub fn shader(name: &str, texture: Option<&str>) -> ChunkBuilder {
    let shader = ChunkBuilder::new(SHADER)
        .string(name)
        .u32(0)
        .string("simple")
        .u32(0)
        .u32(0)
        .u32(0)
        .u32(u32::from(texture.is_some()));
    match texture {
        Some(texture) => shader.child(
            ChunkBuilder::new(SHADER_TEXTURE_PARAM)
                .fourcc("TEX")
                .string(texture),
        ),
        None => shader,
    }
}

pub fn animation(name: &str, frame_count: f32, frame_rate: f32, groups: Vec<ChunkBuilder>) -> ChunkBuilder {
    ChunkBuilder::new(ANIMATION)
        .u32(0)
        .string(name)
        .fourcc("PTRN")
        .f32(frame_count)
        .f32(frame_rate)
        .u32(1)
        .child(
            ChunkBuilder::new(ANIMATION_GROUP_LIST)
                .u32(0)
                .u32(groups.len() as u32)
                .children(groups),
        )
}

pub fn animation_group(bone: &str, channels: Vec<ChunkBuilder>) -> ChunkBuilder {
    ChunkBuilder::new(ANIMATION_GROUP)
        .u32(0)
        .string(bone)
        .u32(0)
        .u32(channels.len() as u32)
        .children(channels)
}

pub fn vector3_channel(keys: &[(u16, Vec3)]) -> ChunkBuilder {
    let channel = keys.iter().fold(
        ChunkBuilder::new(VECTOR3_CHANNEL)
            .u32(0)
            .fourcc("TRAN")
            .u32(keys.len() as u32),
        |c, &(frame, _)| c.u16(frame),
    );
    keys.iter().fold(channel, |c, &(_, v)| c.vec3(v))
}

pub fn vector2_channel(constants: Vec3, keys: &[(u16, Vec2)]) -> ChunkBuilder {
    let channel = keys.iter().fold(
        ChunkBuilder::new(VECTOR2_CHANNEL)
            .u32(0)
            .fourcc("TRAN")
            .u16(0)
            .vec3(constants)
            .u32(keys.len() as u32),
        |c, &(frame, _)| c.u16(frame),
    );
    keys.iter().fold(channel, |c, &(_, v)| c.vec2(v))
}

pub fn quaternion_channel(keys: &[(u16, Quat)]) -> ChunkBuilder {
    let channel = keys.iter().fold(
        ChunkBuilder::new(QUATERNION_CHANNEL)
            .u32(0)
            .fourcc("ROT")
            .u32(keys.len() as u32),
        |c, &(frame, _)| c.u16(frame),
    );
    keys.iter()
        .fold(channel, |c, &(_, q)| c.f32(q.w).f32(q.x).f32(q.y).f32(q.z))
}

pub fn compressed_quaternion_channel(keys: &[(u16, Quat)]) -> ChunkBuilder {
    let channel = keys.iter().fold(
        ChunkBuilder::new(COMPRESSED_QUATERNION_CHANNEL)
            .u32(0)
            .fourcc("ROT")
            .u32(keys.len() as u32),
        |c, &(frame, _)| c.u16(frame),
    );
    let pack = |v: f32| (v * f32::from(i16::MAX)).round() as i16;
    keys.iter().fold(channel, |c, &(_, q)| {
        c.i16(pack(q.w)).i16(pack(q.x)).i16(pack(q.y)).i16(pack(q.z))
    })
}
