//! Scene payloads: billboards, car cameras, physics objects and emitters

use std::fmt;

use glam::Vec3;

use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

/// Type id of particle emitter chunks. Their payload is kept as
/// [`super::RawData`].
pub const BASE_EMITTER_TYPE_ID: u32 = 0x0001_5805;

/// A group of camera-facing quads sharing one shader.
///
/// Unlike most named chunks the version comes before the name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BillboardQuadGroup {
    pub version: u32,
    pub name: String,
    pub shader_name: String,
    pub z_test: u32,
    pub z_write: u32,
    pub fog: u32,
    pub quad_count: u32,
}

impl ChunkPayload for BillboardQuadGroup {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            name: reader.read_string()?,
            shader_name: reader.read_string()?,
            z_test: reader.read_u32()?,
            z_write: reader.read_u32()?,
            fog: reader.read_u32()?,
            quad_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for BillboardQuadGroup {
    const TYPE_ID: u32 = 0x0001_7002;
    const NAME: &'static str = "BillboardQuadGroup";
}

impl fmt::Display for BillboardQuadGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Billboard Quad Group: {} ({} quads)",
            self.name, self.quad_count
        )
    }
}

/// Chase camera placement for one vehicle
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarCameraData {
    pub index: u32,
    /// Stored between the index and the angle, meaning unknown
    pub unknown: f32,
    pub angle: f32,
    pub distance: f32,
    pub look: Vec3,
}

impl ChunkPayload for CarCameraData {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            index: reader.read_u32()?,
            unknown: reader.read_f32()?,
            angle: reader.read_f32()?,
            distance: reader.read_f32()?,
            look: reader.read_vec3()?,
        })
    }
}

impl IdentifiedChunk for CarCameraData {
    const TYPE_ID: u32 = 0x0300_0100;
    const NAME: &'static str = "CarCameraData";
}

impl fmt::Display for CarCameraData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Car Camera Data ({})", self.index)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicsObject {
    pub name: String,
    pub version: u32,
    pub material_name: String,
    pub joint_count: u32,
    pub volume: f32,
    pub resting_sensitivity: f32,
}

impl ChunkPayload for PhysicsObject {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            material_name: reader.read_string()?,
            joint_count: reader.read_u32()?,
            volume: reader.read_f32()?,
            resting_sensitivity: reader.read_f32()?,
        })
    }
}

impl IdentifiedChunk for PhysicsObject {
    const TYPE_ID: u32 = 0x0701_1000;
    const NAME: &'static str = "PhysicsObject";
}

impl fmt::Display for PhysicsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Physics Object: {} (Material: {})",
            self.name, self.material_name
        )
    }
}
