//! Pure3D chunk tree and typed chunk payloads
//!
//! Every chunk starts with a 12 byte header:
//!
//! ```text
//! u32 type_id
//! u32 header_size   type id + sizes + payload, the offset of the first child
//! u32 chunk_size    header plus every descendant
//! ```
//!
//! The payload layout is chosen by `type_id` through a [`ChunkRegistry`].
//! Unregistered ids keep their payload as [`Opaque`] bytes.

use std::fmt;

pub mod animation;
pub mod common;
mod decoder;
pub mod geometry;
pub mod registry;
pub mod scene;
pub mod shader;
pub mod skeleton;
pub mod texture;
mod tree;

pub use animation::{
    Animation, AnimationGroup, AnimationGroupList, AnimationSize, ChannelInterpolationMode,
    CompressedQuaternionChannel, QuaternionChannel, Vector1Channel, Vector2Channel,
    Vector3Channel,
};
pub use common::{Named, Opaque, RawData, Root, VersionNamed};
pub use decoder::{ChunkDecoder, DecodeOptions};
pub use geometry::{
    BoundingBox, BoundingSphere, ColourList, IndexList, MatrixList, MatrixPalette, Mesh,
    NormalList, PositionList, PrimitiveGroup, PrimitiveType, Skin, UvList, VertexFormat,
    VertexShader, WeightList,
};
pub use registry::{ChunkRegistry, ChunkType, DecodeFn};
pub use scene::{BASE_EMITTER_TYPE_ID, BillboardQuadGroup, CarCameraData, PhysicsObject};
pub use shader::{Shader, ShaderColourParam, ShaderFloatParam, ShaderIntParam, ShaderTextureParam};
pub use skeleton::{
    CompositeDrawable, CompositeDrawableProp, CompositeDrawablePropList, Skeleton, SkeletonJoint,
};
pub use texture::{ImageData, Texture};
pub use tree::{ChunkId, ChunkNode, ChunkRef, ChunkTree, Hierarchy, TypedChunk};

use crate::reader::{ChunkReader, ReadResult};

/// A payload layout that can be decoded from a chunk's payload region
pub trait ChunkPayload: Sized {
    /// Decode the payload. `length` is `header_size - 12`; the reader will
    /// not yield bytes past it.
    fn read(reader: &mut ChunkReader<'_>, length: u64) -> ReadResult<Self>;
}

/// A payload type with a fixed chunk type id
pub trait IdentifiedChunk: ChunkPayload + Into<ChunkData> {
    const TYPE_ID: u32;
    const NAME: &'static str;
}

/// Typed view of a [`ChunkData`] variant
pub trait FromChunkData: 'static {
    fn from_data(data: &ChunkData) -> Option<&Self>;
}

macro_rules! chunk_data {
    ($($variant:ident),+ $(,)?) => {
        /// Decoded payload of one chunk
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum ChunkData {
            $($variant($variant),)+
        }

        impl ChunkData {
            /// Variant name, used in logs and error context
            pub fn kind(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => stringify!($variant),)+
                }
            }
        }

        impl fmt::Display for ChunkData {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant(payload) => fmt::Display::fmt(payload, f),)+
                }
            }
        }

        $(
            impl From<$variant> for ChunkData {
                fn from(payload: $variant) -> Self {
                    Self::$variant(payload)
                }
            }

            impl FromChunkData for $variant {
                fn from_data(data: &ChunkData) -> Option<&Self> {
                    match data {
                        ChunkData::$variant(payload) => Some(payload),
                        _ => None,
                    }
                }
            }
        )+
    };
}

chunk_data! {
    Root,
    Named,
    VersionNamed,
    Mesh,
    Skin,
    PrimitiveGroup,
    BoundingBox,
    BoundingSphere,
    PositionList,
    NormalList,
    UvList,
    ColourList,
    IndexList,
    MatrixList,
    WeightList,
    MatrixPalette,
    VertexShader,
    Shader,
    ShaderTextureParam,
    ShaderIntParam,
    ShaderFloatParam,
    ShaderColourParam,
    Texture,
    ImageData,
    Skeleton,
    SkeletonJoint,
    CompositeDrawable,
    CompositeDrawablePropList,
    CompositeDrawableProp,
    Animation,
    AnimationGroup,
    AnimationGroupList,
    AnimationSize,
    Vector1Channel,
    Vector2Channel,
    Vector3Channel,
    QuaternionChannel,
    ChannelInterpolationMode,
    CompressedQuaternionChannel,
    BillboardQuadGroup,
    CarCameraData,
    PhysicsObject,
    RawData,
    Opaque,
}

impl ChunkData {
    /// The name string of payloads that carry one
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(Named { name })
            | Self::VersionNamed(VersionNamed { name, .. })
            | Self::Mesh(Mesh { name, .. })
            | Self::Skin(Skin { name, .. })
            | Self::VertexShader(VertexShader { name })
            | Self::Shader(Shader { name, .. })
            | Self::Texture(Texture { name, .. })
            | Self::Skeleton(Skeleton { name, .. })
            | Self::SkeletonJoint(SkeletonJoint { name, .. })
            | Self::CompositeDrawable(CompositeDrawable { name, .. })
            | Self::CompositeDrawableProp(CompositeDrawableProp { name, .. })
            | Self::Animation(Animation { name, .. })
            | Self::AnimationGroup(AnimationGroup { name, .. })
            | Self::BillboardQuadGroup(BillboardQuadGroup { name, .. })
            | Self::PhysicsObject(PhysicsObject { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access_matches_variant() {
        let data = ChunkData::from(Named {
            name: "hips".into(),
        });

        assert_eq!(Named::from_data(&data).map(|n| n.name.as_str()), Some("hips"));
        assert!(Mesh::from_data(&data).is_none());
        assert_eq!(data.kind(), "Named");
        assert_eq!(data.name(), Some("hips"));
    }

    #[test]
    fn test_unnamed_payload_has_no_name() {
        let data = ChunkData::from(IndexList {
            indices: vec![0, 1, 2],
        });
        assert_eq!(data.name(), None);
        assert_eq!(data.to_string(), "Index List (3)");
    }
}
