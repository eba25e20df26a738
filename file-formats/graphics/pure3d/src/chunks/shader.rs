//! Shader and shader parameter payloads

use std::fmt;

use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shader {
    pub name: String,
    pub version: u32,
    /// Name of the runtime shader implementation
    pub pddi_shader_name: String,
    pub has_translucency: u32,
    pub vertex_needs: u32,
    pub vertex_mask: u32,
    pub param_count: u32,
}

impl ChunkPayload for Shader {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            pddi_shader_name: reader.read_string()?,
            has_translucency: reader.read_u32()?,
            vertex_needs: reader.read_u32()?,
            vertex_mask: reader.read_u32()?,
            param_count: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Shader {
    const TYPE_ID: u32 = 0x0001_1000;
    const NAME: &'static str = "Shader";
}

impl fmt::Display for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shader: {} ({})", self.name, self.pddi_shader_name)
    }
}

/// Declares a shader parameter chunk: a four character parameter code
/// followed by one typed value.
macro_rules! shader_param {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $id:expr, $read:expr $(, $derive:ident)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq $(, $derive)?)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            pub param: String,
            pub value: $ty,
        }

        impl ChunkPayload for $name {
            fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
                Ok(Self {
                    param: reader.read_fourcc()?,
                    value: $read(reader)?,
                })
            }
        }

        impl IdentifiedChunk for $name {
            const TYPE_ID: u32 = $id;
            const NAME: &'static str = stringify!($name);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "Shader Parameter: {} = {:?}", self.param, self.value)
            }
        }
    };
}

shader_param!(
    /// Texture bound to a shader slot, by texture chunk name
    ShaderTextureParam, String, 0x0001_1002, ChunkReader::read_string, Eq
);
shader_param!(ShaderIntParam, u32, 0x0001_1003, ChunkReader::read_u32, Eq);
shader_param!(ShaderFloatParam, f32, 0x0001_1004, ChunkReader::read_f32);
shader_param!(
    /// Packed colour, red in the low byte
    ShaderColourParam, u32, 0x0001_1005, ChunkReader::read_u32, Eq
);
