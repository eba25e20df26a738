//! Base payload layouts shared by many chunk types

use std::fmt;

use custom_debug::Debug;

use crate::debug;
use crate::reader::{ChunkReader, ReadResult};

use super::{ChunkPayload, IdentifiedChunk};

/// Implicit top-level container. Its type id is the plain format tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Root;

impl ChunkPayload for Root {
    fn read(_reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self)
    }
}

impl IdentifiedChunk for Root {
    const TYPE_ID: u32 = 0xFF44_3350;
    const NAME: &'static str = "Root";
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root")
    }
}

/// A chunk whose payload is a single name string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Named {
    pub name: String,
}

impl ChunkPayload for Named {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            name: reader.read_string()?,
        })
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Named: {}", self.name)
    }
}

/// A version number followed by a name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionNamed {
    pub version: u32,
    pub name: String,
}

impl ChunkPayload for VersionNamed {
    fn read(reader: &mut ChunkReader<'_>, _length: u64) -> ReadResult<Self> {
        Ok(Self {
            version: reader.read_u32()?,
            name: reader.read_string()?,
        })
    }
}

impl fmt::Display for VersionNamed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version Named: {} (version {})", self.name, self.version)
    }
}

/// A registered chunk whose payload is kept as raw bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawData {
    #[debug(with = debug::trimmed_collection_fmt)]
    pub data: Vec<u8>,
}

impl ChunkPayload for RawData {
    fn read(reader: &mut ChunkReader<'_>, length: u64) -> ReadResult<Self> {
        Ok(Self {
            data: reader.read_bytes(length as usize)?,
        })
    }
}

impl fmt::Display for RawData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Raw Data ({} bytes)", self.data.len())
    }
}

/// Undecoded payload of a chunk type the registry does not know.
///
/// `data` holds exactly the `headerSize - 12` payload bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opaque {
    pub type_id: u32,
    #[debug(with = debug::trimmed_collection_fmt)]
    pub data: Vec<u8>,
}

impl Opaque {
    pub(crate) fn read(
        reader: &mut ChunkReader<'_>,
        type_id: u32,
        length: u64,
    ) -> ReadResult<Self> {
        Ok(Self {
            type_id,
            data: reader.read_bytes(length as usize)?,
        })
    }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown chunk {:#010x} ({} bytes)",
            self.type_id,
            self.data.len()
        )
    }
}
