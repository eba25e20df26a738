//! Per-bone animation tracks and whole animations

use glam::{Mat4, Quat, Vec3};

use super::curve::KeyframeCurve;
use super::types::normalize_or_identity;

/// Position, rotation and scale curves driving one bone.
///
/// Key times are frame numbers.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// Name of the bone this track drives
    pub name: String,
    pub position: KeyframeCurve<Vec3>,
    pub rotation: KeyframeCurve<Quat>,
    pub scale: KeyframeCurve<Vec3>,
}

/// Values of a track at one point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A track that holds a fixed local transform
    pub fn constant(name: impl Into<String>, position: Vec3, rotation: Quat) -> Self {
        Self {
            name: name.into(),
            position: KeyframeCurve::constant(position),
            rotation: KeyframeCurve::constant(rotation),
            scale: KeyframeCurve::constant(Vec3::ONE),
        }
    }

    /// Sample every curve at `frame`
    pub fn sample(&self, frame: f32) -> TrackSample {
        TrackSample {
            position: self.position.evaluate(frame, Vec3::ZERO),
            rotation: self.rotation.evaluate(frame, Quat::IDENTITY),
            scale: self.scale.evaluate(frame, Vec3::ONE),
        }
    }

    /// Local bone transform at `frame`: rotate, then translate.
    ///
    /// The scale curve is sampled by [`Track::sample`] but not applied here.
    pub fn local_transform(&self, frame: f32) -> Mat4 {
        let sample = self.sample(frame);
        Mat4::from_rotation_translation(normalize_or_identity(sample.rotation), sample.position)
    }
}

/// A named skeletal animation with one track per bone
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub name: String,
    pub frame_count: f32,
    /// Frames per second
    pub frame_rate: f32,
    pub cyclic: bool,
    /// Parallel to the skeleton's bones
    pub tracks: Vec<Track>,
}

impl Animation {
    /// Playback length in seconds
    pub fn length(&self) -> f32 {
        if self.frame_rate > 0.0 {
            self.frame_count / self.frame_rate
        } else {
            0.0
        }
    }

    /// Convert wall time in seconds to a frame position
    pub fn frame_at(&self, seconds: f32) -> f32 {
        seconds * self.frame_rate
    }

    /// Track driving the bone named `name`
    pub fn track(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| track.name == name)
    }
}
