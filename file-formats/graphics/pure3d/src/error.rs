use std::io;
use thiserror::Error;

use crate::file::FileVariant;

/// Framing and layout violations found while decoding a chunk stream.
///
/// Every variant is fatal for the whole decode: no partially decoded tree is
/// ever returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The stream ended before a field could be read
    #[error("Unexpected end of data at offset {offset:#x}: needed {needed} more bytes")]
    UnexpectedEof { offset: u64, needed: usize },

    /// Header size is below the 12 byte minimum or larger than the chunk size
    #[error(
        "Malformed header for chunk {type_id:#010x} at offset {offset:#x}: header size {header_size}, chunk size {chunk_size}"
    )]
    MalformedHeader {
        offset: u64,
        type_id: u32,
        header_size: u32,
        chunk_size: u32,
    },

    /// Chunk extends past the end declared by its parent
    #[error(
        "Chunk {type_id:#010x} at offset {offset:#x} ends at {chunk_end:#x}, past its parent end {parent_end:#x}"
    )]
    ChunkOverrun {
        offset: u64,
        type_id: u32,
        chunk_end: u64,
        parent_end: u64,
    },

    /// Children did not end exactly where the chunk size says
    #[error("Chunk {type_id:#010x} should end at {expected_end:#x} but decoding stopped at {actual:#x}")]
    SizeMismatch {
        type_id: u32,
        expected_end: u64,
        actual: u64,
    },

    /// A typed payload needed more bytes than the header declares
    #[error("Payload of chunk {type_id:#010x} is {length} bytes but its fields need {consumed}")]
    PayloadOverrun {
        type_id: u32,
        length: u64,
        consumed: u64,
    },

    /// A typed payload left declared bytes unread (strict mode only)
    #[error("Payload of chunk {type_id:#010x} is {length} bytes but only {consumed} were decoded")]
    PayloadUnderrun {
        type_id: u32,
        length: u64,
        consumed: u64,
    },

    /// The leading format tag is not a Pure3D tag
    #[error("Invalid format tag: {found:#010x}")]
    InvalidMagic { found: u32 },

    /// Chunks are nested deeper than the configured limit
    #[error("Chunk nesting exceeds {depth} levels")]
    NestingTooDeep { depth: usize },
}

/// Error types for Pure3D decoding and model assembly
#[derive(Error, Debug)]
pub enum Pure3dError {
    /// I/O error while reading the container into memory
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The chunk stream violates the container framing
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// The container uses a recognised but unsupported encoding
    #[error("Unsupported container variant: {0}")]
    UnsupportedVariant(FileVariant),

    /// A chunk required for assembly is absent
    #[error("Chunk '{parent}' has no '{missing}' child")]
    MissingChunk {
        parent: String,
        missing: &'static str,
    },

    /// An index stored in the file points outside the array it refers to
    #[error("Invalid reference in {context}: index {index} but only {len} entries")]
    InvalidReference {
        context: String,
        index: usize,
        len: usize,
    },

    /// A skeleton joint refers to a parent that comes after it
    #[error("Joint '{joint}' at index {index} has forward parent reference {parent}")]
    InvalidSkeleton {
        joint: String,
        index: usize,
        parent: usize,
    },
}

impl Pure3dError {
    /// Whether this error is a framing violation of the chunk stream
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Format(_))
    }
}

/// Result type using Pure3dError
pub type Result<T> = std::result::Result<T, Pure3dError>;
