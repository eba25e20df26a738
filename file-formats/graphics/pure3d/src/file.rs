//! Pure3D container loading

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::chunks::{ChunkDecoder, ChunkRef, ChunkRegistry, ChunkTree, DecodeOptions};
use crate::error::{FormatError, Pure3dError, Result};

/// Leading tag of an uncompressed container, also the root chunk's type id
pub const PLAIN_TAG: u32 = 0xFF44_3350;
/// Leading tag of an LZR compressed container
pub const COMPRESSED_TAG: u32 = 0x5A44_3350;
/// Leading tag of a deflate compressed container
pub const DEFLATE_TAG: u32 = 0x5A52;

/// Container encodings recognised by their leading tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileVariant {
    /// `P3D\xFF`
    Plain,
    /// `P3DZ`
    Compressed,
    /// `RZ`
    Deflate,
}

impl FileVariant {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            PLAIN_TAG => Some(Self::Plain),
            COMPRESSED_TAG => Some(Self::Compressed),
            DEFLATE_TAG => Some(Self::Deflate),
            _ => None,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            Self::Plain => PLAIN_TAG,
            Self::Compressed => COMPRESSED_TAG,
            Self::Deflate => DEFLATE_TAG,
        }
    }
}

impl fmt::Display for FileVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plain => "plain",
            Self::Compressed => "compressed (P3DZ)",
            Self::Deflate => "deflate (RZ)",
        };
        write!(f, "{} container, tag {:#010x}", name, self.tag())
    }
}

/// A decoded Pure3D container
#[derive(Debug, Clone)]
pub struct Pure3dFile {
    tree: ChunkTree,
}

impl Pure3dFile {
    /// Decode a container held in memory with the standard chunk registry
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, ChunkRegistry::global(), &DecodeOptions::default())
    }

    /// Decode a container with a custom registry and options
    pub fn from_bytes_with(
        data: &[u8],
        registry: &ChunkRegistry,
        options: &DecodeOptions,
    ) -> Result<Self> {
        let Some(tag_bytes) = data.first_chunk::<4>() else {
            return Err(FormatError::UnexpectedEof {
                offset: 0,
                needed: 4 - data.len(),
            }
            .into());
        };

        let tag = u32::from_le_bytes(*tag_bytes);
        match FileVariant::from_tag(tag) {
            Some(FileVariant::Plain) => {}
            Some(variant) => return Err(Pure3dError::UnsupportedVariant(variant)),
            None => return Err(FormatError::InvalidMagic { found: tag }.into()),
        }

        let tree = ChunkDecoder::new(registry, options.clone()).decode(data)?;
        log::debug!("Decoded {} chunks from {} bytes", tree.len(), data.len());
        Ok(Self { tree })
    }

    /// Read a whole container from a reader and decode it
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Load a container from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// The root chunk
    pub fn root(&self) -> ChunkRef<'_> {
        self.tree.root()
    }

    pub fn tree(&self) -> &ChunkTree {
        &self.tree
    }

    pub fn into_tree(self) -> ChunkTree {
        self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(COMPRESSED_TAG, FileVariant::Compressed)]
    #[test_case(DEFLATE_TAG, FileVariant::Deflate)]
    fn test_compressed_variants_rejected(tag: u32, variant: FileVariant) {
        let mut data = tag.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 16]);

        let err = Pure3dFile::from_bytes(&data).unwrap_err();
        assert!(matches!(err, Pure3dError::UnsupportedVariant(v) if v == variant));
    }

    #[test]
    fn test_unknown_tag() {
        let data = 0x1234_5678u32.to_le_bytes();
        let err = Pure3dFile::from_bytes(&data).unwrap_err();
        assert!(matches!(
            err,
            Pure3dError::Format(FormatError::InvalidMagic { found: 0x1234_5678 })
        ));
    }

    #[test]
    fn test_short_input() {
        let err = Pure3dFile::from_bytes(&[0x50, 0x33]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_empty_root() {
        let mut data = PLAIN_TAG.to_le_bytes().to_vec();
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());

        let file = Pure3dFile::from_bytes(&data).unwrap();
        assert!(file.root().is_root());
        assert_eq!(file.tree().len(), 1);
    }

    #[test]
    fn test_parse_from_reader() {
        let mut data = PLAIN_TAG.to_le_bytes().to_vec();
        data.extend_from_slice(&12u32.to_le_bytes());
        data.extend_from_slice(&12u32.to_le_bytes());

        let file = Pure3dFile::parse(&mut std::io::Cursor::new(data)).unwrap();
        assert_eq!(file.root().children().count(), 0);
    }
}
