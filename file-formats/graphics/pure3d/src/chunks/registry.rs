//! Mapping from chunk type ids to payload decoders

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::reader::{ChunkReader, ReadResult};

use super::animation::{
    Animation, AnimationGroup, AnimationGroupList, AnimationSize, ChannelInterpolationMode,
    CompressedQuaternionChannel, QuaternionChannel, Vector1Channel, Vector2Channel,
    Vector3Channel,
};
use super::common::{RawData, Root};
use super::geometry::{
    BoundingBox, BoundingSphere, ColourList, IndexList, MatrixList, MatrixPalette, Mesh,
    NormalList, PositionList, PrimitiveGroup, Skin, UvList, VertexShader, WeightList,
};
use super::scene::{BASE_EMITTER_TYPE_ID, BillboardQuadGroup, CarCameraData, PhysicsObject};
use super::shader::{
    Shader, ShaderColourParam, ShaderFloatParam, ShaderIntParam, ShaderTextureParam,
};
use super::skeleton::{
    CompositeDrawable, CompositeDrawableProp, CompositeDrawablePropList, Skeleton, SkeletonJoint,
};
use super::texture::{ImageData, Texture};
use super::{ChunkData, ChunkPayload, IdentifiedChunk};

/// Decodes the payload region of one chunk.
///
/// The reader is bounded to the payload, the second argument is its length.
pub type DecodeFn = fn(&mut ChunkReader<'_>, u64) -> ReadResult<ChunkData>;

/// A registered chunk type
#[derive(Debug, Clone, Copy)]
pub struct ChunkType {
    pub type_id: u32,
    pub name: &'static str,
    pub decode: DecodeFn,
}

/// Chunk type lookup table.
///
/// Ids missing from the table decode as [`super::Opaque`].
#[derive(Debug, Clone, Default)]
pub struct ChunkRegistry {
    types: HashMap<u32, ChunkType>,
}

impl ChunkRegistry {
    /// An empty registry. Every chunk decodes as opaque.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every chunk type this crate knows
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .add::<Root>()
            // Geometry
            .add::<Mesh>()
            .add::<Skin>()
            .add::<PrimitiveGroup>()
            .add::<BoundingBox>()
            .add::<BoundingSphere>()
            .add::<PositionList>()
            .add::<NormalList>()
            .add::<UvList>()
            .add::<ColourList>()
            .add::<IndexList>()
            .add::<MatrixList>()
            .add::<WeightList>()
            .add::<MatrixPalette>()
            .add::<VertexShader>()
            // Materials
            .add::<Shader>()
            .add::<ShaderTextureParam>()
            .add::<ShaderIntParam>()
            .add::<ShaderFloatParam>()
            .add::<ShaderColourParam>()
            .add::<Texture>()
            .add::<ImageData>()
            // Skeletons
            .add::<Skeleton>()
            .add::<SkeletonJoint>()
            .add::<CompositeDrawable>()
            .add::<CompositeDrawablePropList>()
            .add::<CompositeDrawableProp>()
            // Animation
            .add::<Animation>()
            .add::<AnimationGroup>()
            .add::<AnimationGroupList>()
            .add::<AnimationSize>()
            .add::<Vector1Channel>()
            .add::<Vector2Channel>()
            .add::<Vector3Channel>()
            .add::<QuaternionChannel>()
            .add::<ChannelInterpolationMode>()
            .add::<CompressedQuaternionChannel>()
            // Scene
            .add::<BillboardQuadGroup>()
            .add::<CarCameraData>()
            .add::<PhysicsObject>()
            .register_layout::<RawData>(BASE_EMITTER_TYPE_ID, "BaseEmitter");
        registry
    }

    /// The shared standard registry, built on first use
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ChunkRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::standard)
    }

    /// Register a payload type under its own id
    pub fn add<T: IdentifiedChunk>(&mut self) -> &mut Self {
        self.register(T::TYPE_ID, T::NAME, decode_as::<T>)
    }

    /// Decode chunks of `type_id` with one of the shared layouts such as
    /// [`super::Named`]
    pub fn register_layout<T>(&mut self, type_id: u32, name: &'static str) -> &mut Self
    where
        T: ChunkPayload + Into<ChunkData>,
    {
        self.register(type_id, name, decode_as::<T>)
    }

    /// Bind `type_id` to a decoder, replacing any earlier binding
    pub fn register(&mut self, type_id: u32, name: &'static str, decode: DecodeFn) -> &mut Self {
        let entry = ChunkType {
            type_id,
            name,
            decode,
        };
        if let Some(previous) = self.types.insert(type_id, entry) {
            log::debug!(
                "Chunk type {:#010x} rebound from {} to {}",
                type_id,
                previous.name,
                name
            );
        }
        self
    }

    pub fn resolve(&self, type_id: u32) -> Option<&ChunkType> {
        self.types.get(&type_id)
    }

    pub fn contains(&self, type_id: u32) -> bool {
        self.types.contains_key(&type_id)
    }

    /// Registered name of a type id
    pub fn name_of(&self, type_id: u32) -> Option<&'static str> {
        self.resolve(type_id).map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn decode_as<T>(reader: &mut ChunkReader<'_>, length: u64) -> ReadResult<ChunkData>
where
    T: ChunkPayload + Into<ChunkData>,
{
    T::read(reader, length).map(Into::into)
}

#[cfg(test)]
mod tests {
    use super::super::common::Named;
    use super::*;

    #[test]
    fn test_standard_registry_resolves_known_ids() {
        let registry = ChunkRegistry::standard();

        assert_eq!(registry.name_of(0x0001_0002), Some("PrimitiveGroup"));
        assert_eq!(registry.name_of(0x0012_1111), Some("CompressedQuaternionChannel"));
        assert_eq!(registry.name_of(0xFF44_3350), Some("Root"));
        assert_eq!(registry.name_of(0x0701_1000), Some("PhysicsObject"));
        assert_eq!(registry.name_of(0x0001_5805), Some("BaseEmitter"));
        assert!(!registry.contains(0xDEAD_BEEF));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let first = ChunkRegistry::global() as *const ChunkRegistry;
        let second = ChunkRegistry::global() as *const ChunkRegistry;
        assert_eq!(first, second);
        assert_eq!(ChunkRegistry::global().len(), ChunkRegistry::standard().len());
    }

    #[test]
    fn test_register_layout_for_custom_id() {
        let mut registry = ChunkRegistry::new();
        registry.register_layout::<Named>(0x0300_0F00, "LocatorName");

        let data = [3, b'c', b'a', b'm'];
        let mut reader = ChunkReader::new(&data);
        let entry = registry.resolve(0x0300_0F00).unwrap();
        let decoded = (entry.decode)(&mut reader, data.len() as u64).unwrap();

        assert_eq!(decoded.name(), Some("cam"));
        assert_eq!(registry.name_of(0x0300_0F00), Some("LocatorName"));
    }
}
