//! Recursive chunk stream decoder

use log::{debug, trace};

use crate::error::FormatError;
use crate::reader::{ChunkReader, ReadResult};

use super::common::Opaque;
use super::registry::ChunkRegistry;
use super::tree::{ChunkId, ChunkNode, ChunkTree};
use super::ChunkData;

/// Size of the type id and the two size fields
const CHUNK_HEADER_SIZE: u32 = 12;

/// Options controlling how strictly a chunk stream is decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest allowed chunk nesting, the root being depth 0
    pub max_depth: usize,
    /// Reject typed payloads that leave declared bytes unread instead of
    /// skipping them
    pub strict_payload_length: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            strict_payload_length: false,
        }
    }
}

/// Decodes a chunk stream into a [`ChunkTree`]
#[derive(Debug, Clone)]
pub struct ChunkDecoder<'r> {
    registry: &'r ChunkRegistry,
    options: DecodeOptions,
}

impl<'r> ChunkDecoder<'r> {
    pub fn new(registry: &'r ChunkRegistry, options: DecodeOptions) -> Self {
        Self { registry, options }
    }

    /// Decode a whole stream. The first chunk is the root and may span up to
    /// the end of `data`.
    pub fn decode(&self, data: &[u8]) -> ReadResult<ChunkTree> {
        let mut reader = ChunkReader::new(data);
        let mut tree = ChunkTree::new();
        let end = reader.len();

        let type_id = reader.read_u32()?;
        self.decode_chunk(&mut reader, &mut tree, None, type_id, end, 0)?;
        Ok(tree)
    }

    /// Decode one chunk whose type id has just been read, then its children
    fn decode_chunk(
        &self,
        reader: &mut ChunkReader<'_>,
        tree: &mut ChunkTree,
        parent: Option<ChunkId>,
        type_id: u32,
        parent_end: u64,
        depth: usize,
    ) -> ReadResult<()> {
        if depth > self.options.max_depth {
            return Err(FormatError::NestingTooDeep {
                depth: self.options.max_depth,
            });
        }

        let offset = reader.position() - 4;
        let header_size = reader.read_u32()?;
        let chunk_size = reader.read_u32()?;

        trace!(
            "Chunk {:#010x} at {:#x}: header {} bytes, total {} bytes",
            type_id, offset, header_size, chunk_size
        );

        if header_size > chunk_size || header_size < CHUNK_HEADER_SIZE {
            return Err(FormatError::MalformedHeader {
                offset,
                type_id,
                header_size,
                chunk_size,
            });
        }

        let chunk_end = offset + u64::from(chunk_size);
        if reader.position() + u64::from(chunk_size - CHUNK_HEADER_SIZE) > parent_end {
            return Err(FormatError::ChunkOverrun {
                offset,
                type_id,
                chunk_end,
                parent_end,
            });
        }

        let length = u64::from(header_size - CHUNK_HEADER_SIZE);
        let data = self.decode_payload(reader, type_id, length)?;
        let id = tree.push(
            parent,
            ChunkNode::new(type_id, offset, header_size, chunk_size, data),
        );

        while reader.position() < chunk_end {
            let child_type = reader.read_u32()?;
            self.decode_chunk(reader, tree, Some(id), child_type, chunk_end, depth + 1)?;
        }

        if reader.position() != chunk_end {
            return Err(FormatError::SizeMismatch {
                type_id,
                expected_end: chunk_end,
                actual: reader.position(),
            });
        }

        Ok(())
    }

    /// Decode exactly `length` payload bytes and leave the reader after them
    fn decode_payload(
        &self,
        reader: &mut ChunkReader<'_>,
        type_id: u32,
        length: u64,
    ) -> ReadResult<ChunkData> {
        let start = reader.position();
        let mut payload = reader.bounded(length)?;

        let data = match self.registry.resolve(type_id) {
            Some(entry) => (entry.decode)(&mut payload, length).map_err(|err| match err {
                FormatError::UnexpectedEof { offset, needed } => FormatError::PayloadOverrun {
                    type_id,
                    length,
                    consumed: offset - start + needed as u64,
                },
                other => other,
            })?,
            None => {
                debug!(
                    "Unknown chunk type {:#010x}, keeping {} payload bytes",
                    type_id, length
                );
                ChunkData::Opaque(Opaque::read(&mut payload, type_id, length)?)
            }
        };

        let consumed = payload.position() - start;
        if consumed < length {
            if self.options.strict_payload_length {
                return Err(FormatError::PayloadUnderrun {
                    type_id,
                    length,
                    consumed,
                });
            }
            debug!(
                "Chunk {:#010x} ({}): skipping {} unread payload bytes",
                type_id,
                data.kind(),
                length - consumed
            );
        }

        reader.skip(length)?;
        Ok(data)
    }
}
