//! Decoder for Pure3D chunk containers.
//!
//! Decodes the chunk tree of a `.p3d` container, assembles skinned models from
//! it and samples skeletal animations into skinning matrices.
//!
//! ```rust,ignore
//! use pure3d::{AssemblyOptions, Model, Pure3dFile};
//!
//! let file = Pure3dFile::load("character.p3d")?;
//! print!("{}", file.tree().hierarchy());
//!
//! let model = Model::assemble(&file, &AssemblyOptions::default())?;
//! let mut pose = model.pose_builder()?;
//! if let Some(walk) = model.animation("walk") {
//!     pose.update(walk, walk.frame_at(0.25));
//! }
//! let matrices = pose.gpu_data();
//! ```

// Re-export main components
pub mod animation;
pub mod chunks;
mod debug;
pub mod error;
pub mod file;
pub mod model;
pub mod pose;
pub mod primitive;
pub mod reader;

// Re-export common types
pub use animation::{Animation, KeyframeCurve, Track};
pub use chunks::{ChunkData, ChunkRef, ChunkRegistry, ChunkTree, DecodeOptions};
pub use error::{FormatError, Pure3dError, Result};
pub use file::{FileVariant, Pure3dFile};
pub use model::{AssemblyOptions, Bone, Model, Submesh, Vertex};
pub use pose::{PoseBuilder, compute_bind_world_transforms, compute_pose};
pub use primitive::expand_indices;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
