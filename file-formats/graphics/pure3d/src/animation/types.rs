//! Value types that keyframe curves can interpolate

use glam::{Quat, Vec2, Vec3};

/// Trait for types that can be interpolated between two keys
pub trait Lerp: Copy {
    /// Blend from `self` towards `other` by `t` in `[0, 1]`
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        slerp(*self, *other, t)
    }
}

/// Spherical linear interpolation along the shorter arc.
///
/// The inputs do not have to be unit length; the result always is.
pub fn slerp(from: Quat, to: Quat, t: f32) -> Quat {
    let dot = from.dot(to);

    // Negate one end to take the shorter arc
    let (to, dot) = if dot < 0.0 { (-to, -dot) } else { (to, dot) };

    let blended = if dot > 0.9995 {
        // Nearly parallel, sin(theta) would divide by ~0
        from * (1.0 - t) + to * t
    } else {
        let theta = dot.acos();
        let sin_theta = theta.sin();
        let s0 = ((1.0 - t) * theta).sin() / sin_theta;
        let s1 = (t * theta).sin() / sin_theta;
        from * s0 + to * s1
    };

    normalize_or_identity(blended)
}

/// Normalize a quaternion, falling back to identity for zero or non-finite
/// input
pub fn normalize_or_identity(q: Quat) -> Quat {
    let length = q.length();
    if length > 0.0 && length.is_finite() {
        q / length
    } else {
        Quat::IDENTITY
    }
}
