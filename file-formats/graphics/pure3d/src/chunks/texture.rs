//! Texture metadata and image payloads

use std::fmt;

use custom_debug::Debug;

use crate::debug;
use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Texture {
    pub name: String,
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub alpha_depth: u32,
    pub mip_count: u32,
    pub texture_type: u32,
    pub usage: u32,
    pub priority: u32,
}

impl ChunkPayload for Texture {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
            version: reader.read_u32()?,
            width: reader.read_u32()?,
            height: reader.read_u32()?,
            bpp: reader.read_u32()?,
            alpha_depth: reader.read_u32()?,
            mip_count: reader.read_u32()?,
            texture_type: reader.read_u32()?,
            usage: reader.read_u32()?,
            priority: reader.read_u32()?,
        })
    }
}

impl IdentifiedChunk for Texture {
    const TYPE_ID: u32 = 0x0001_9000;
    const NAME: &'static str = "Texture";
}

impl fmt::Display for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Texture: {} ({}x{})", self.name, self.width, self.height)
    }
}

/// Encoded image file bytes, usually PNG or BMP
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageData {
    #[debug(with = debug::trimmed_collection_fmt)]
    pub data: Vec<u8>,
}

impl ChunkPayload for ImageData {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        let length = reader.read_u32()?;
        Ok(Self {
            data: reader.read_bytes(length as usize)?,
        })
    }
}

impl IdentifiedChunk for ImageData {
    const TYPE_ID: u32 = 0x0001_9002;
    const NAME: &'static str = "ImageData";
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image Data (Header: ")?;
        for byte in self.data.iter().take(4) {
            write!(f, "{byte:02X} ")?;
        }
        write!(f, "Len: {})", self.data.len())
    }
}
