//! Bone hierarchy transform computation
//!
//! This module computes the bind pose of a skeleton and the per-bone skinning
//! matrices of an animation sampled at a given frame. Bones are stored so that
//! every parent precedes its children, which lets both passes walk the bone
//! list once in index order.

use glam::Mat4;

use crate::animation::Animation;
use crate::error::{Pure3dError, Result};
use crate::model::Bone;

/// Compute the model space bind transform of every bone.
///
/// A bone whose parent index equals its own index is a root and keeps its rest
/// pose. Any other parent must come earlier in the list.
pub fn compute_bind_world_transforms(bones: &[Bone]) -> Result<Vec<Mat4>> {
    let mut world: Vec<Mat4> = Vec::with_capacity(bones.len());

    for (index, bone) in bones.iter().enumerate() {
        let transform = if bone.parent == index {
            bone.rest_pose
        } else if bone.parent < index {
            world[bone.parent] * bone.rest_pose
        } else {
            return Err(Pure3dError::InvalidSkeleton {
                joint: bone.name.clone(),
                index,
                parent: bone.parent,
            });
        };
        world.push(transform);
    }

    Ok(world)
}

/// Compute the skinning matrix of every bone for `animation` at `frame`.
///
/// `bind_world` comes from [`compute_bind_world_transforms`]. Bones without a
/// track hold their rest pose.
pub fn compute_pose(
    animation: &Animation,
    frame: f32,
    bones: &[Bone],
    bind_world: &[Mat4],
) -> Vec<Mat4> {
    let inverse_bind: Vec<Mat4> = bind_world.iter().map(Mat4::inverse).collect();
    let mut world = vec![Mat4::IDENTITY; bones.len()];
    let mut skin = vec![Mat4::IDENTITY; bones.len()];
    pose_into(animation, frame, bones, &inverse_bind, &mut world, &mut skin);
    skin
}

/// Shared pose pass writing into preallocated buffers
fn pose_into(
    animation: &Animation,
    frame: f32,
    bones: &[Bone],
    inverse_bind: &[Mat4],
    world: &mut [Mat4],
    skin: &mut [Mat4],
) {
    for (index, bone) in bones.iter().enumerate() {
        let local = animation
            .tracks
            .get(index)
            .map_or(bone.rest_pose, |track| track.local_transform(frame));

        world[index] = if bone.parent < index {
            world[bone.parent] * local
        } else {
            local
        };

        let inverse = inverse_bind.get(index).copied().unwrap_or(Mat4::IDENTITY);
        skin[index] = world[index] * inverse;
    }
}

/// Reusable skinning matrix computer for one skeleton.
///
/// Bind and inverse bind matrices are computed once; [`PoseBuilder::update`]
/// reuses its buffers so sampling a new frame does not allocate.
#[derive(Debug, Clone)]
pub struct PoseBuilder {
    bones: Vec<Bone>,
    bind_world: Vec<Mat4>,
    inverse_bind: Vec<Mat4>,
    world: Vec<Mat4>,
    skin: Vec<Mat4>,
    /// Frame of the last update, `None` while in bind pose
    frame: Option<f32>,
}

impl PoseBuilder {
    /// Create a builder in bind pose
    pub fn new(bones: &[Bone]) -> Result<Self> {
        let bind_world = compute_bind_world_transforms(bones)?;
        let inverse_bind = bind_world.iter().map(Mat4::inverse).collect();

        Ok(Self {
            bones: bones.to_vec(),
            world: bind_world.clone(),
            bind_world,
            inverse_bind,
            skin: vec![Mat4::IDENTITY; bones.len()],
            frame: None,
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Frame sampled by the last update
    pub fn frame(&self) -> Option<f32> {
        self.frame
    }

    /// Sample `animation` at `frame` and recompute every skinning matrix
    pub fn update(&mut self, animation: &Animation, frame: f32) {
        pose_into(
            animation,
            frame,
            &self.bones,
            &self.inverse_bind,
            &mut self.world,
            &mut self.skin,
        );
        self.frame = Some(frame);
    }

    /// Return to bind pose, where every skinning matrix is identity
    pub fn reset(&mut self) {
        self.world.copy_from_slice(&self.bind_world);
        self.skin.fill(Mat4::IDENTITY);
        self.frame = None;
    }

    /// Model space transform of every bone in the current pose
    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world
    }

    /// Bind space to posed space matrices, one per bone
    pub fn skinning_matrices(&self) -> &[Mat4] {
        &self.skin
    }

    /// Skinning matrices flattened column-major for GPU upload
    pub fn gpu_data(&self) -> Vec<f32> {
        self.skin.iter().flat_map(Mat4::to_cols_array).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Track;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    fn bone(name: &str, parent: usize, rest_pose: Mat4) -> Bone {
        Bone {
            name: name.into(),
            parent,
            rest_pose,
            bind_world: Mat4::IDENTITY,
        }
    }

    fn chain() -> Vec<Bone> {
        vec![
            bone("root", 0, Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0))),
            bone(
                "spine",
                0,
                Mat4::from_rotation_translation(Quat::from_rotation_z(0.3), Vec3::Y),
            ),
            bone("head", 1, Mat4::from_translation(Vec3::new(0.5, 0.5, 0.0))),
        ]
    }

    /// An animation whose tracks reproduce each bone's rest pose
    fn rest_animation(bones: &[Bone]) -> Animation {
        let tracks = bones
            .iter()
            .map(|bone| {
                let (_, rotation, translation) = bone.rest_pose.to_scale_rotation_translation();
                Track::constant(bone.name.clone(), translation, rotation)
            })
            .collect();

        Animation {
            name: "rest".into(),
            frame_count: 1.0,
            frame_rate: 30.0,
            cyclic: true,
            tracks,
        }
    }

    fn assert_mat_near(a: Mat4, b: Mat4) {
        assert!(a.abs_diff_eq(b, 1e-4), "{a:?} != {b:?}");
    }

    #[test]
    fn test_bind_world_accumulates_parents() {
        let world = compute_bind_world_transforms(&chain()).unwrap();

        assert_eq!(world.len(), 3);
        assert_mat_near(world[0], Mat4::from_translation(Vec3::Y));

        let head_origin = world[2].transform_point3(Vec3::ZERO);
        let expected = world[1].transform_point3(Vec3::new(0.5, 0.5, 0.0));
        assert!((head_origin - expected).length() < 1e-5);
    }

    #[test]
    fn test_bind_world_composes_parent_before_child() {
        let rotated = Mat4::from_rotation_translation(
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::new(1.0, 0.0, 0.0),
        );
        let offset = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let bones = vec![
            bone("root", 0, Mat4::IDENTITY),
            bone("a", 0, rotated),
            bone("b", 1, offset),
        ];

        let world = compute_bind_world_transforms(&bones).unwrap();

        assert_mat_near(world[2], rotated * offset);
        // The child offset is turned by the parent rotation
        let origin = world[2].transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        assert!(!world[2].abs_diff_eq(offset * rotated, 1e-3));
    }

    #[test]
    fn test_root_uses_rest_pose() {
        let rest = Mat4::from_rotation_x(FRAC_PI_2);
        let world = compute_bind_world_transforms(&[bone("only", 0, rest)]).unwrap();
        assert_eq!(world, vec![rest]);
    }

    #[test]
    fn test_forward_parent_rejected() {
        let bones = vec![
            bone("root", 0, Mat4::IDENTITY),
            bone("child", 2, Mat4::IDENTITY),
            bone("late", 0, Mat4::IDENTITY),
        ];

        let err = compute_bind_world_transforms(&bones).unwrap_err();
        assert!(matches!(
            err,
            Pure3dError::InvalidSkeleton {
                index: 1,
                parent: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_rest_animation_gives_identity_skin() {
        let bones = chain();
        let bind = compute_bind_world_transforms(&bones).unwrap();
        let animation = rest_animation(&bones);

        for skin in compute_pose(&animation, 0.0, &bones, &bind) {
            assert_mat_near(skin, Mat4::IDENTITY);
        }
    }

    #[test]
    fn test_root_rotation_moves_children() {
        let bones = chain();
        let bind = compute_bind_world_transforms(&bones).unwrap();

        let mut animation = rest_animation(&bones);
        animation.tracks[0] = Track::constant("root", Vec3::Y, Quat::from_rotation_y(FRAC_PI_2));

        let skin = compute_pose(&animation, 0.0, &bones, &bind);
        let world = compute_bind_world_transforms(&bones).unwrap();

        // A vertex at the head's bind position follows the root rotation
        let bind_point = world[2].transform_point3(Vec3::ZERO);
        let posed = skin[2].transform_point3(bind_point);
        let expected = Mat4::from_rotation_translation(Quat::from_rotation_y(FRAC_PI_2), Vec3::Y)
            * world[0].inverse()
            * world[2];
        assert!((posed - expected.transform_point3(Vec3::ZERO)).length() < 1e-4);
    }

    #[test]
    fn test_builder_matches_free_function() {
        let bones = chain();
        let bind = compute_bind_world_transforms(&bones).unwrap();

        let mut animation = rest_animation(&bones);
        animation.tracks[1].rotation.add(10.0, Quat::from_rotation_x(1.0));

        let mut builder = PoseBuilder::new(&bones).unwrap();
        assert!(builder.frame().is_none());
        builder.update(&animation, 4.0);

        let expected = compute_pose(&animation, 4.0, &bones, &bind);
        for (a, b) in builder.skinning_matrices().iter().zip(&expected) {
            assert_mat_near(*a, *b);
        }
        assert_eq!(builder.frame(), Some(4.0));
    }

    #[test]
    fn test_builder_reset_and_gpu_layout() {
        let bones = chain();
        let mut builder = PoseBuilder::new(&bones).unwrap();

        let mut animation = rest_animation(&bones);
        animation.tracks[0] = Track::constant("root", Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY);
        builder.update(&animation, 0.0);

        let data = builder.gpu_data();
        assert_eq!(data.len(), 3 * 16);
        // Root moved from (0, 1, 0) to (5, 0, 0); translation sits in the last column
        assert!((data[12] - 5.0).abs() < 1e-5);
        assert!((data[13] + 1.0).abs() < 1e-5);

        builder.reset();
        assert!(builder.frame().is_none());
        for skin in builder.skinning_matrices() {
            assert_eq!(*skin, Mat4::IDENTITY);
        }
        let bind = compute_bind_world_transforms(&bones).unwrap();
        assert_eq!(builder.world_transforms(), bind.as_slice());
    }

    #[test]
    fn test_missing_tracks_hold_rest_pose() {
        let bones = chain();
        let bind = compute_bind_world_transforms(&bones).unwrap();
        let animation = Animation::default();

        for skin in compute_pose(&animation, 12.0, &bones, &bind) {
            assert_mat_near(skin, Mat4::IDENTITY);
        }
    }
}
