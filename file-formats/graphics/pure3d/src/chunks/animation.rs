//! Animation, animation group and keyframe channel payloads
//!
//! Channel key times are frame numbers stored as u16. All channels list every
//! frame number first, then every value.

use std::fmt;

use custom_debug::Debug;
use glam::{Quat, Vec2, Vec3};

use crate::debug;
use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

/// An animation clip, with its groups below an `AnimationGroupList` child
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub version: u32,
    pub name: String,
    /// Four character animation kind, `PTRN` for skeletal clips
    pub animation_type: String,
    pub frame_count: f32,
    pub frame_rate: f32,
    pub cyclic: u32,
}

impl ChunkPayload for Animation {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            name: reader.read_string()?,
            animation_type: reader.read_fourcc()?,
            frame_count: reader.read_f32()?,
            frame_rate: reader.read_f32()?,
            cyclic: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Animation {
    const TYPE_ID: u32 = 0x0012_1000;
    const NAME: &'static str = "Animation";
}

impl fmt::Display for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Animation: {} ({}, {} frames at {} fps)",
            self.name, self.animation_type, self.frame_count, self.frame_rate
        )
    }
}

/// Channels animating one bone, matched by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationGroup {
    pub version: u32,
    pub name: String,
    pub group_id: u32,
    pub channel_count: u32,
}

impl ChunkPayload for AnimationGroup {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            name: reader.read_string()?,
            group_id: reader.read_u32()?,
            channel_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for AnimationGroup {
    const TYPE_ID: u32 = 0x0012_1001;
    const NAME: &'static str = "AnimationGroup";
}

impl fmt::Display for AnimationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Animation Group: {} ({} Channels)",
            self.name, self.channel_count
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationGroupList {
    pub version: u32,
    pub group_count: u32,
}

impl ChunkPayload for AnimationGroupList {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            group_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for AnimationGroupList {
    const TYPE_ID: u32 = 0x0012_1002;
    const NAME: &'static str = "AnimationGroupList";
}

impl fmt::Display for AnimationGroupList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Animation Group List: {}", self.group_count)
    }
}

/// Memory footprint of the clip per target platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationSize {
    pub version: u32,
    pub pc: u32,
    pub ps2: u32,
    pub xbox: u32,
    pub gamecube: u32,
}

impl ChunkPayload for AnimationSize {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            pc: reader.read_u32()?,
            ps2: reader.read_u32()?,
            xbox: reader.read_u32()?,
            gamecube: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for AnimationSize {
    const TYPE_ID: u32 = 0x0012_1004;
    const NAME: &'static str = "AnimationSize";
}

impl fmt::Display for AnimationSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Animation Size: Version {}, PC {}, PS2 {}, Xbox {}, GameCube {}",
            self.version, self.pc, self.ps2, self.xbox, self.gamecube
        )
    }
}

/// Read `count` u16 frame numbers
fn read_frames(reader: &mut ChunkReader<'_>, count: u32) -> ReadResult<Vec<u16>> {
    reader.read_array(count, 2, ChunkReader::read_u16)
}

/// Read a quaternion stored as w, x, y, z floats
fn read_quat(reader: &mut ChunkReader<'_>) -> ReadResult<Quat> {
    let w = reader.read_f32()?;
    let v = reader.read_vec3()?;
    Ok(Quat::from_xyzw(v.x, v.y, v.z, w))
}

/// Read a quaternion stored as w, x, y, z signed 16-bit fixed point values
fn read_compressed_quat(reader: &mut ChunkReader<'_>) -> ReadResult<Quat> {
    let scale = f32::from(i16::MAX);
    let w = f32::from(reader.read_i16()?) / scale;
    let x = f32::from(reader.read_i16()?) / scale;
    let y = f32::from(reader.read_i16()?) / scale;
    let z = f32::from(reader.read_i16()?) / scale;
    Ok(Quat::from_xyzw(x, y, z, w))
}

/// Scalar channel. Values are offsets along one axis picked by `mapping`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector1Channel {
    pub version: u32,
    pub param: String,
    pub mapping: u16,
    pub constants: Vec3,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub frames: Vec<u16>,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub values: Vec<f32>,
}

impl ChunkPayload for Vector1Channel {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        let version = reader.read_u32()?;
        let param = reader.read_fourcc()?;
        let mapping = reader.read_u16()?;
        let constants = reader.read_vec3()?;
        let count = reader.read_u32()?;
        let frames = read_frames(reader, count)?;
        let values = reader.read_array(count, 4, ChunkReader::read_f32)?;

        Ok(Self {
            version,
            param,
            mapping,
            constants,
            frames,
            values,
        })
    }
}

impl IdentifiedChunk for Vector1Channel {
    const TYPE_ID: u32 = 0x0012_1102;
    const NAME: &'static str = "Vector1Channel";
}

impl fmt::Display for Vector1Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vector1 Channel: {}, {} Frames, Mapping {}, Constants {}",
            self.param,
            self.frames.len(),
            self.mapping,
            self.constants
        )
    }
}

/// Planar channel. A value `(a, b)` expands to `constants + (a, 0, b)`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector2Channel {
    pub version: u32,
    pub param: String,
    pub mapping: u16,
    pub constants: Vec3,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub frames: Vec<u16>,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub values: Vec<Vec2>,
}

impl Vector2Channel {
    /// Key values lifted into 3D
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.values
            .iter()
            .map(|value| self.constants + Vec3::new(value.x, 0.0, value.y))
    }
}

impl ChunkPayload for Vector2Channel {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        let version = reader.read_u32()?;
        let param = reader.read_fourcc()?;
        let mapping = reader.read_u16()?;
        let constants = reader.read_vec3()?;
        let count = reader.read_u32()?;
        let frames = read_frames(reader, count)?;
        let values = reader.read_array(count, 8, ChunkReader::read_vec2)?;

        Ok(Self {
            version,
            param,
            mapping,
            constants,
            frames,
            values,
        })
    }
}

impl IdentifiedChunk for Vector2Channel {
    const TYPE_ID: u32 = 0x0012_1103;
    const NAME: &'static str = "Vector2Channel";
}

impl fmt::Display for Vector2Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vector2 Channel: {}, {} Frames, Mapping {}, Constants {}",
            self.param,
            self.frames.len(),
            self.mapping,
            self.constants
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3Channel {
    pub version: u32,
    pub param: String,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub frames: Vec<u16>,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub values: Vec<Vec3>,
}

impl ChunkPayload for Vector3Channel {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        let version = reader.read_u32()?;
        let param = reader.read_fourcc()?;
        let count = reader.read_u32()?;
        let frames = read_frames(reader, count)?;
        let values = reader.read_array(count, 12, ChunkReader::read_vec3)?;

        Ok(Self {
            version,
            param,
            frames,
            values,
        })
    }
}

impl IdentifiedChunk for Vector3Channel {
    const TYPE_ID: u32 = 0x0012_1104;
    const NAME: &'static str = "Vector3Channel";
}

impl fmt::Display for Vector3Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Vector3 Channel: {}, {} Frames",
            self.param,
            self.frames.len()
        )
    }
}

/// Declares a rotation channel; the two variants differ only in how one
/// quaternion is stored.
macro_rules! quaternion_channel {
    ($(#[$meta:meta])* $name:ident, $id:expr, $label:literal, $size:expr, $read:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub version: u32,
            pub param: String,
            #[debug(with = debug::trimmed_collection_fmt)]
            pub frames: Vec<u16>,
            #[debug(with = debug::trimmed_collection_fmt)]
            pub values: Vec<Quat>,
        }

        impl ChunkPayload for $name {
            fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
                let version = reader.read_u32()?;
                let param = reader.read_fourcc()?;
                let count = reader.read_u32()?;
                let frames = read_frames(reader, count)?;
                let values = reader.read_array(count, $size, $read)?;

                Ok(Self {
                    version,
                    param,
                    frames,
                    values,
                })
            }
        }

        impl IdentifiedChunk for $name {
            const TYPE_ID: u32 = $id;
            const NAME: &'static str = stringify!($name);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!($label, ": {}, {} Frames"),
                    self.param,
                    self.frames.len()
                )
            }
        }
    };
}

quaternion_channel!(
    QuaternionChannel, 0x0012_1105, "Quaternion Channel", 16, read_quat
);

quaternion_channel!(
    /// Rotation keys with each component scaled to `i16::MAX`
    CompressedQuaternionChannel, 0x0012_1111, "Compressed Quaternion Channel", 8,
    read_compressed_quat
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelInterpolationMode {
    pub version: u32,
    pub mode: u32,
}

impl ChunkPayload for ChannelInterpolationMode {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            mode: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for ChannelInterpolationMode {
    const TYPE_ID: u32 = 0x0012_1110;
    const NAME: &'static str = "ChannelInterpolationMode";
}

impl fmt::Display for ChannelInterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel Interpolation Mode: {}", self.mode)
    }
}
