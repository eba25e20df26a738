//! Skeleton hierarchy and composite drawable payloads

use std::fmt;

use glam::Mat4;

use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skeleton {
    pub name: String,
    pub version: u32,
    pub joint_count: u32,
}

impl ChunkPayload for Skeleton {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            joint_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Skeleton {
    const TYPE_ID: u32 = 0x0000_4500;
    const NAME: &'static str = "Skeleton";
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skeleton: {} ({} Joints)", self.name, self.joint_count)
    }
}

/// One joint of a skeleton.
///
/// `parent` indexes the sibling joints of the same skeleton. The root joint
/// names itself as its parent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkeletonJoint {
    pub name: String,
    pub parent: u32,
    pub dof: i32,
    pub free_axis: i32,
    pub primary_axis: i32,
    pub secondary_axis: i32,
    pub twist_axis: i32,
    /// Local transform relative to the parent joint at bind time
    pub rest_pose: Mat4,
}

impl ChunkPayload for SkeletonJoint {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            parent: reader.read_u32()?,
            dof: reader.read_i32()?,
            free_axis: reader.read_i32()?,
            primary_axis: reader.read_i32()?,
            secondary_axis: reader.read_i32()?,
            twist_axis: reader.read_i32()?,
            rest_pose: reader.read_matrix()?,
        })
    }
}

impl IdentifiedChunk for SkeletonJoint {
    const TYPE_ID: u32 = 0x0000_4501;
    const NAME: &'static str = "SkeletonJoint";
}

impl fmt::Display for SkeletonJoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skeleton Joint: {} (Parent: {})", self.name, self.parent)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeDrawable {
    pub name: String,
    pub skeleton_name: String,
}

impl ChunkPayload for CompositeDrawable {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            skeleton_name: reader.read_string()?,
        })
    }
}

impl IdentifiedChunk for CompositeDrawable {
    const TYPE_ID: u32 = 0x0000_4512;
    const NAME: &'static str = "CompositeDrawable";
}

impl fmt::Display for CompositeDrawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Composite Drawable: {} (Skeleton: {})",
            self.name, self.skeleton_name
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeDrawablePropList {
    pub element_count: u32,
}

impl ChunkPayload for CompositeDrawablePropList {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            element_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for CompositeDrawablePropList {
    const TYPE_ID: u32 = 0x0000_4514;
    const NAME: &'static str = "CompositeDrawablePropList";
}

impl fmt::Display for CompositeDrawablePropList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Composite Drawable Prop List (Elements: {})",
            self.element_count
        )
    }
}

/// A drawable attached to one joint of the composite's skeleton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeDrawableProp {
    pub name: String,
    pub is_translucent: u32,
    pub joint: u32,
}

impl ChunkPayload for CompositeDrawableProp {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            is_translucent: reader.read_u32()?,
            joint: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for CompositeDrawableProp {
    const TYPE_ID: u32 = 0x0000_4516;
    const NAME: &'static str = "CompositeDrawableProp";
}

impl fmt::Display for CompositeDrawableProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Composite Drawable Prop: {} (Joint: {})", self.name, self.joint)
    }
}
