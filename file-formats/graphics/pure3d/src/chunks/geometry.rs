//! Mesh, skin and primitive group payloads

use std::fmt;

use bitflags::bitflags;
use custom_debug::Debug;
use glam::{Vec2, Vec3};

use crate::debug;
use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

/// Static mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    pub name: String,
    pub version: u32,
    /// Number of primitive group children
    pub primitive_group_count: u32,
}

impl ChunkPayload for Mesh {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            primitive_group_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Mesh {
    const TYPE_ID: u32 = 0x0001_0000;
    const NAME: &'static str = "Mesh";
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Mesh: {} ({} Prim Groups)",
            self.name, self.primitive_group_count
        )
    }
}

/// Skinned mesh bound to a named skeleton
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skin {
    pub name: String,
    pub version: u32,
    pub skeleton_name: String,
    pub primitive_group_count: u32,
}

impl ChunkPayload for Skin {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            skeleton_name: reader.read_string()?,
            primitive_group_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Skin {
    const TYPE_ID: u32 = 0x0001_0001;
    const NAME: &'static str = "Skin";
}

impl fmt::Display for Skin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Skin: {} (Skeleton: {}) ({} Prim Groups)",
            self.name, self.skeleton_name, self.primitive_group_count
        )
    }
}

/// How the index list of a primitive group forms primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
    /// Value outside the known range, kept as read
    Other(u32),
}

impl From<u32> for PrimitiveType {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::TriangleList,
            1 => Self::TriangleStrip,
            2 => Self::LineList,
            3 => Self::LineStrip,
            other => Self::Other(other),
        }
    }
}

impl From<PrimitiveType> for u32 {
    fn from(value: PrimitiveType) -> Self {
        match value {
            PrimitiveType::TriangleList => 0,
            PrimitiveType::TriangleStrip => 1,
            PrimitiveType::LineList => 2,
            PrimitiveType::LineStrip => 3,
            PrimitiveType::Other(other) => other,
        }
    }
}

bitflags! {
    /// Vertex attributes present in a primitive group
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct VertexFormat: u32 {
        const UVS = 0x0001;
        const UVS2 = 0x0002;
        const UVS3 = 0x0004;
        const UVS4 = 0x0008;
        const NORMALS = 0x0010;
        const COLOURS = 0x0020;
        const MATRICES = 0x0080;
        const WEIGHTS = 0x0100;
        const UNKNOWN = 0x2000;
    }
}

/// One draw batch of a mesh. Its vertex data lives in the list children.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimitiveGroup {
    pub version: u32,
    pub shader_name: String,
    pub primitive_type: PrimitiveType,
    pub vertex_format: VertexFormat,
    pub vertex_count: u32,
    pub index_count: u32,
    pub matrix_count: u32,
}

impl ChunkPayload for PrimitiveGroup {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            shader_name: reader.read_string()?,
            primitive_type: reader.read_u32()?.into(),
            vertex_format: VertexFormat::from_bits_retain(reader.read_u32()?),
            vertex_count: reader.read_u32()?,
            index_count: reader.read_u32()?,
            matrix_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for PrimitiveGroup {
    const TYPE_ID: u32 = 0x0001_0002;
    const NAME: &'static str = "PrimitiveGroup";
}

impl fmt::Display for PrimitiveGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Primitive Group {} ({:?}, {} vertices, {} indices)",
            self.shader_name, self.primitive_type, self.vertex_count, self.index_count
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub low: Vec3,
    pub high: Vec3,
}

impl ChunkPayload for BoundingBox {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            low: reader.read_vec3()?,
            high: reader.read_vec3()?,
        })
    }
}

impl IdentifiedChunk for BoundingBox {
    const TYPE_ID: u32 = 0x0001_0003;
    const NAME: &'static str = "BoundingBox";
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounding Box ({} - {})", self.low, self.high)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingSphere {
    pub centre: Vec3,
    pub radius: f32,
}

impl ChunkPayload for BoundingSphere {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            centre: reader.read_vec3()?,
            radius: reader.read_f32()?,
        })
    }
}

impl IdentifiedChunk for BoundingSphere {
    const TYPE_ID: u32 = 0x0001_0004;
    const NAME: &'static str = "BoundingSphere";
}

impl fmt::Display for BoundingSphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounding Sphere ({}, r = {})", self.centre, self.radius)
    }
}

/// Declares a chunk holding a u32 count followed by that many elements.
macro_rules! list_chunk {
    (
        $(#[$meta:meta])*
        $name:ident, $field:ident: $ty:ty, $id:expr, $label:literal,
        $size:expr, $read:expr $(, $derive:ident)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq $(, $derive)?)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            #[debug(with = debug::trimmed_collection_fmt)]
            pub $field: Vec<$ty>,
        }

        impl ChunkPayload for $name {
            fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
                Ok(Self {
                    $field: reader.read_counted($size, $read)?,
                })
            }
        }

        impl IdentifiedChunk for $name {
            const TYPE_ID: u32 = $id;
            const NAME: &'static str = stringify!($name);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " ({})"), self.$field.len())
            }
        }
    };
}

list_chunk!(
    /// Vertex positions
    PositionList, positions: Vec3, 0x0001_0005, "Position List", 12, ChunkReader::read_vec3
);

list_chunk!(
    /// Vertex normals
    NormalList, normals: Vec3, 0x0001_0006, "Normal List", 12, ChunkReader::read_vec3
);

list_chunk!(
    /// Packed vertex colours, red in the low byte
    ColourList, colours: u32, 0x0001_0008, "Colour List", 4, ChunkReader::read_u32, Eq
);

list_chunk!(
    /// Raw primitive indices, interpreted by the group's primitive type
    IndexList, indices: u32, 0x0001_000A, "Index List", 4, ChunkReader::read_u32, Eq
);

list_chunk!(
    /// Four palette slots per vertex
    MatrixList, matrices: [u8; 4], 0x0001_000B, "Matrix List", 4,
    |r: &mut ChunkReader<'_>| {
        Ok([r.read_u8()?, r.read_u8()?, r.read_u8()?, r.read_u8()?])
    },
    Eq
);

list_chunk!(
    /// Three blend weights per vertex
    WeightList, weights: Vec3, 0x0001_000C, "Weight List", 12, ChunkReader::read_vec3
);

list_chunk!(
    /// Maps matrix list slots to skeleton joint indices
    MatrixPalette, joints: u32, 0x0001_000D, "Matrix Palette", 4, ChunkReader::read_u32, Eq
);

/// Texture coordinates for one UV channel
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UvList {
    pub channel: u32,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub uvs: Vec<Vec2>,
}

impl ChunkPayload for UvList {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        let count = reader.read_u32()?;
        let channel = reader.read_u32()?;
        Ok(Self {
            channel,
            uvs: reader.read_array(count, 8, ChunkReader::read_vec2)?,
        })
    }
}

impl IdentifiedChunk for UvList {
    const TYPE_ID: u32 = 0x0001_0007;
    const NAME: &'static str = "UVList";
}

impl fmt::Display for UvList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UV List (Channel: {} - {})", self.channel, self.uvs.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexShader {
    pub name: String,
}

impl ChunkPayload for VertexShader {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
        })
    }
}

impl IdentifiedChunk for VertexShader {
    const TYPE_ID: u32 = 0x0001_0011;
    const NAME: &'static str = "VertexShader";
}

impl fmt::Display for VertexShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vertex Shader: {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, PrimitiveType::TriangleList)]
    #[test_case(1, PrimitiveType::TriangleStrip)]
    #[test_case(2, PrimitiveType::LineList)]
    #[test_case(3, PrimitiveType::LineStrip)]
    #[test_case(9, PrimitiveType::Other(9))]
    fn test_primitive_type_from_u32(raw: u32, expected: PrimitiveType) {
        assert_eq!(PrimitiveType::from(raw), expected);
        assert_eq!(u32::from(expected), raw);
    }

    #[test]
    fn test_primitive_group_fields() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(4);
        data.extend_from_slice(b"skin");
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&(0x0001u32 | 0x0010 | 0x0080 | 0x2000).to_le_bytes());
        for count in [3u32, 5, 2] {
            data.extend_from_slice(&count.to_le_bytes());
        }

        let mut reader = ChunkReader::new(&data);
        let group = PrimitiveGroup::read(&mut reader, data.len() as u64).unwrap();

        assert_eq!(group.shader_name, "skin");
        assert_eq!(group.primitive_type, PrimitiveType::TriangleStrip);
        assert!(group.vertex_format.contains(VertexFormat::NORMALS | VertexFormat::MATRICES));
        assert!(!group.vertex_format.contains(VertexFormat::COLOURS));
        assert_eq!(group.vertex_count, 3);
        assert_eq!(group.index_count, 5);
        assert_eq!(group.matrix_count, 2);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_uv_list_reads_channel_before_values() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&0.25f32.to_le_bytes());
        data.extend_from_slice(&0.75f32.to_le_bytes());

        let mut reader = ChunkReader::new(&data);
        let list = UvList::read(&mut reader, data.len() as u64).unwrap();

        assert_eq!(list.channel, 2);
        assert_eq!(list.uvs, vec![Vec2::new(0.25, 0.75)]);
    }

    #[test]
    fn test_matrix_list_keeps_byte_order() {
        let data = [1, 0, 0, 0, 4, 3, 2, 1];
        let mut reader = ChunkReader::new(&data);
        let list = MatrixList::read(&mut reader, data.len() as u64).unwrap();

        assert_eq!(list.matrices, vec![[4, 3, 2, 1]]);
    }
}
