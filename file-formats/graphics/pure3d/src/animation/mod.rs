//! Skeletal animation playback
//!
//! This module provides:
//! - Keyframe curves that loop on their last key time
//! - Linear interpolation for vectors and normalized slerp for rotations
//! - Per-bone tracks grouped into named animations
//!
//! # Example
//!
//! ```rust,ignore
//! use pure3d::animation::{KeyframeCurve, Track};
//! use glam::Vec3;
//!
//! let mut track = Track::new("hip");
//! track.position.add(0.0, Vec3::ZERO);
//! track.position.add(10.0, Vec3::Y);
//!
//! let local = track.local_transform(5.0);
//! ```

mod curve;
mod track;
mod types;

pub use curve::{Keyframe, KeyframeCurve, find_key_index};
pub use track::{Animation, Track, TrackSample};
pub use types::{Lerp, normalize_or_identity, slerp};
