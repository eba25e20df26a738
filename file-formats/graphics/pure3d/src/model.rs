//! Renderer-ready models assembled from a decoded container
//!
//! Assembly walks the root's skeleton, skins, static meshes and animations
//! and produces flat vertex and index buffers, a bone list with bind
//! transforms, per-group submeshes and sampled animations. The result owns
//! all of its data and does not borrow from the chunk tree.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec2, Vec3};
use log::{debug, warn};

use crate::animation::{Animation, KeyframeCurve, Lerp, Track};
use crate::chunks::{
    self, AnimationGroup, AnimationGroupList, ChunkRef, ColourList, CompressedQuaternionChannel,
    IndexList, MatrixList, MatrixPalette, Mesh, NormalList, PositionList, PrimitiveGroup,
    PrimitiveType, QuaternionChannel, Shader, ShaderTextureParam, Skeleton, SkeletonJoint, Skin,
    TypedChunk, UvList, Vector2Channel, Vector3Channel, WeightList,
};
use crate::error::{Pure3dError, Result};
use crate::file::Pure3dFile;
use crate::pose::{PoseBuilder, compute_bind_world_transforms};
use crate::primitive::expand_indices;

/// Name of the bone synthesized for containers without a skeleton
pub const DEFAULT_BONE_NAME: &str = "root";

/// Opaque white, used when a group has no colour list
const WHITE: [f32; 4] = [1.0; 4];

/// Options for [`Model::assemble`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Also assemble `Mesh` chunks, rigidly attached to bone 0
    pub include_static_meshes: bool,
    /// Store texture coordinates as `1 - v`
    pub flip_v: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            include_static_meshes: true,
            flip_v: true,
        }
    }
}

/// One interleaved vertex, laid out for direct GPU upload
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub bone_weights: [f32; 4],
    pub bone_indices: [i32; 4],
}

/// A skeleton bone
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub name: String,
    /// Index of the parent bone; equal to the bone's own index for a root
    pub parent: usize,
    /// Transform relative to the parent
    pub rest_pose: Mat4,
    /// Model space bind transform
    pub bind_world: Mat4,
}

impl Bone {
    /// Whether this bone has no parent
    pub fn is_root(&self, index: usize) -> bool {
        self.parent == index
    }
}

/// A contiguous range of the index buffer drawn with one shader
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Submesh {
    pub index_start: usize,
    pub index_count: usize,
    pub shader_name: String,
    /// First texture parameter of the matching shader, if it resolves
    pub texture_name: Option<String>,
}

/// A skinned model ready for rendering
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub vertices: Vec<Vertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
    pub bones: Vec<Bone>,
    pub submeshes: Vec<Submesh>,
    pub animations: Vec<Animation>,
}

impl Model {
    /// Assemble the skeleton, geometry and animations found under the root of
    /// `file`
    pub fn assemble(file: &Pure3dFile, options: &AssemblyOptions) -> Result<Self> {
        let root = file.root();

        let skins: Vec<_> = root.children_of::<Skin>().collect();
        let preferred = skins.first().map(|skin| skin.skeleton_name.as_str());
        let bones = load_bones(root, preferred)?;

        let mut model = Self {
            bones,
            ..Default::default()
        };

        for skin in &skins {
            debug!(
                "Assembling skin '{}' ({} primitive groups)",
                skin.name, skin.primitive_group_count
            );
            model.append_groups(root, skin.chunk(), &skin.name, true, options)?;
        }

        if options.include_static_meshes {
            for mesh in root.children_of::<Mesh>() {
                debug!(
                    "Assembling mesh '{}' ({} primitive groups)",
                    mesh.name, mesh.primitive_group_count
                );
                model.append_groups(root, mesh.chunk(), &mesh.name, false, options)?;
            }
        }

        model.load_animations(file);
        Ok(model)
    }

    /// Load every animation of `file` against this model's skeleton.
    ///
    /// `file` may be a separate animation container.
    pub fn load_animations(&mut self, file: &Pure3dFile) -> usize {
        let before = self.animations.len();
        for chunk in file.root().children_of::<chunks::Animation>() {
            let animation = build_animation(chunk, &self.bones);
            debug!(
                "Loaded animation '{}': {} frames at {} fps",
                animation.name, animation.frame_count, animation.frame_rate
            );
            self.animations.push(animation);
        }
        self.animations.len() - before
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|animation| animation.name == name)
    }

    /// A pose builder for this model's skeleton, starting in bind pose
    pub fn pose_builder(&self) -> Result<PoseBuilder> {
        PoseBuilder::new(&self.bones)
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Assemble every primitive group below `owner`
    fn append_groups(
        &mut self,
        root: ChunkRef<'_>,
        owner: ChunkRef<'_>,
        owner_name: &str,
        skinned: bool,
        options: &AssemblyOptions,
    ) -> Result<()> {
        for group in owner.children_of::<PrimitiveGroup>() {
            match group.primitive_type {
                PrimitiveType::TriangleList | PrimitiveType::TriangleStrip => {}
                PrimitiveType::LineList | PrimitiveType::LineStrip => {
                    warn!(
                        "Skipping line primitive group '{}' in '{}'",
                        group.shader_name, owner_name
                    );
                    continue;
                }
                PrimitiveType::Other(value) => {
                    warn!(
                        "Skipping primitive group '{}' in '{}' with unknown topology {}",
                        group.shader_name, owner_name, value
                    );
                    continue;
                }
            }

            self.append_group(root, group, owner_name, skinned, options)?;
        }
        Ok(())
    }

    fn append_group(
        &mut self,
        root: ChunkRef<'_>,
        group: TypedChunk<'_, PrimitiveGroup>,
        owner_name: &str,
        skinned: bool,
        options: &AssemblyOptions,
    ) -> Result<()> {
        let chunk = group.chunk();
        let positions = chunk
            .first_child::<PositionList>()
            .ok_or_else(|| Pure3dError::MissingChunk {
                parent: format!("{}/{}", owner_name, group.shader_name),
                missing: "PositionList",
            })?
            .payload();
        let vertex_count = positions.positions.len();

        let normals = chunk.first_child::<NormalList>().map(|list| &list.payload().normals);
        let uvs = chunk.first_child::<UvList>().map(|list| &list.payload().uvs);
        let colours = chunk.first_child::<ColourList>().map(|list| &list.payload().colours);
        let weights = chunk.first_child::<WeightList>().map(|list| &list.payload().weights);

        let bone_indices = if skinned {
            self.resolve_bone_indices(chunk, vertex_count, owner_name)?
        } else {
            vec![[0; 4]; vertex_count]
        };

        index_u32(self.vertices.len() + vertex_count, owner_name)?;
        let vertex_offset = index_u32(self.vertices.len(), owner_name)?;

        for (index, position) in positions.positions.iter().enumerate() {
            let normal = normals
                .and_then(|normals| normals.get(index))
                .copied()
                .unwrap_or(Vec3::Y);
            let uv = uvs
                .and_then(|uvs| uvs.get(index))
                .map_or(Vec2::ZERO, |uv| {
                    if options.flip_v {
                        Vec2::new(uv.x, 1.0 - uv.y)
                    } else {
                        *uv
                    }
                });
            let color = colours
                .and_then(|colours| colours.get(index))
                .map_or(WHITE, |&packed| unpack_colour(packed));
            let bone_weights = weights
                .and_then(|weights| weights.get(index))
                .map_or([1.0, 0.0, 0.0, 0.0], |w| [w.x, w.y, w.z, 0.0]);

            self.vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv: uv.to_array(),
                color,
                bone_weights,
                bone_indices: bone_indices[index],
            });
        }

        let raw_indices: Vec<u32> = match chunk.first_child::<IndexList>() {
            Some(list) => {
                if let Some(&bad) = list.indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(Pure3dError::InvalidReference {
                        context: format!("{}/{} index list", owner_name, group.shader_name),
                        index: bad as usize,
                        len: vertex_count,
                    });
                }
                list.indices.clone()
            }
            None => (0..index_u32(vertex_count, owner_name)?).collect(),
        };

        let index_start = self.indices.len();
        let index_count = expand_indices(
            group.primitive_type,
            &raw_indices,
            vertex_offset,
            &mut self.indices,
        )?;

        let texture_name = resolve_texture(root, &group.shader_name);
        self.submeshes.push(Submesh {
            index_start,
            index_count,
            shader_name: group.shader_name.clone(),
            texture_name,
        });

        Ok(())
    }

    /// Per-vertex joint indices from the group's matrix list and palette
    fn resolve_bone_indices(
        &self,
        group: ChunkRef<'_>,
        vertex_count: usize,
        owner_name: &str,
    ) -> Result<Vec<[i32; 4]>> {
        let (Some(matrices), Some(palette)) = (
            group.first_child::<MatrixList>(),
            group.first_child::<MatrixPalette>(),
        ) else {
            return Ok(vec![[0; 4]; vertex_count]);
        };

        let lookup = |slot: u8| -> Result<i32> {
            let joint = *palette.joints.get(usize::from(slot)).ok_or_else(|| {
                Pure3dError::InvalidReference {
                    context: format!("{owner_name} matrix palette"),
                    index: usize::from(slot),
                    len: palette.joints.len(),
                }
            })?;
            if joint as usize >= self.bones.len() {
                return Err(Pure3dError::InvalidReference {
                    context: format!("{owner_name} skeleton"),
                    index: joint as usize,
                    len: self.bones.len(),
                });
            }
            i32::try_from(joint).map_err(|_| Pure3dError::InvalidReference {
                context: format!("{owner_name} skeleton"),
                index: joint as usize,
                len: self.bones.len(),
            })
        };

        (0..vertex_count)
            .map(|index| match matrices.matrices.get(index) {
                // Slot 0 comes from the last byte
                Some(slots) => Ok([
                    lookup(slots[3])?,
                    lookup(slots[2])?,
                    lookup(slots[1])?,
                    lookup(slots[0])?,
                ]),
                None => Ok([0; 4]),
            })
            .collect()
    }
}

/// Vertex buffers are addressed with 32-bit indices
fn index_u32(count: usize, owner_name: &str) -> Result<u32> {
    u32::try_from(count).map_err(|_| Pure3dError::InvalidReference {
        context: format!("{owner_name} vertex buffer"),
        index: count,
        len: u32::MAX as usize,
    })
}

/// Unpack a colour stored with red in the low byte
fn unpack_colour(packed: u32) -> [f32; 4] {
    packed.to_le_bytes().map(|channel| f32::from(channel) / 255.0)
}

/// Texture parameter of the root's shader named `shader_name`
fn resolve_texture(root: ChunkRef<'_>, shader_name: &str) -> Option<String> {
    let Some(shader) = root.children_named::<Shader>(shader_name).next() else {
        warn!("Shader '{}' not found", shader_name);
        return None;
    };

    match shader.chunk().first_child::<ShaderTextureParam>() {
        Some(param) => Some(param.value.clone()),
        None => {
            warn!("Shader '{}' has no texture parameter", shader_name);
            None
        }
    }
}

/// Read the skeleton, preferring the one named `preferred`.
///
/// Without any skeleton the model gets a single identity root bone.
fn load_bones(root: ChunkRef<'_>, preferred: Option<&str>) -> Result<Vec<Bone>> {
    let skeleton = preferred
        .and_then(|name| root.children_named::<Skeleton>(name).next())
        .or_else(|| root.first_child::<Skeleton>());

    let Some(skeleton) = skeleton else {
        debug!("No skeleton, using a single '{}' bone", DEFAULT_BONE_NAME);
        return Ok(vec![Bone {
            name: DEFAULT_BONE_NAME.to_string(),
            parent: 0,
            rest_pose: Mat4::IDENTITY,
            bind_world: Mat4::IDENTITY,
        }]);
    };

    let mut bones: Vec<Bone> = skeleton
        .chunk()
        .children_of::<SkeletonJoint>()
        .map(|joint| Bone {
            name: joint.name.clone(),
            parent: joint.parent as usize,
            rest_pose: joint.rest_pose,
            bind_world: Mat4::IDENTITY,
        })
        .collect();

    if bones.len() != skeleton.joint_count as usize {
        debug!(
            "Skeleton '{}' declares {} joints but has {}",
            skeleton.name,
            skeleton.joint_count,
            bones.len()
        );
    }

    let bind_world = compute_bind_world_transforms(&bones)?;
    for (bone, world) in bones.iter_mut().zip(bind_world) {
        bone.bind_world = world;
    }

    Ok(bones)
}

/// Build an animation with one track per bone, matching groups by bone name
fn build_animation(chunk: TypedChunk<'_, chunks::Animation>, bones: &[Bone]) -> Animation {
    let groups = chunk.chunk().first_child::<AnimationGroupList>();

    let tracks = bones
        .iter()
        .map(|bone| {
            let group = groups.and_then(|list| {
                list.chunk()
                    .children_named::<AnimationGroup>(&bone.name)
                    .next()
            });
            build_track(bone, group)
        })
        .collect();

    Animation {
        name: chunk.name.clone(),
        frame_count: chunk.frame_count,
        frame_rate: chunk.frame_rate,
        cyclic: chunk.cyclic != 0,
        tracks,
    }
}

/// Track for one bone. Animation files carry no scale channel, so every track
/// gets a single unit scale key; scale is stored but never applied to the pose.
fn build_track(bone: &Bone, group: Option<TypedChunk<'_, AnimationGroup>>) -> Track {
    let (_, rest_rotation, rest_translation) = bone.rest_pose.to_scale_rotation_translation();

    let Some(group) = group else {
        return Track::constant(bone.name.clone(), rest_translation, rest_rotation);
    };
    let channels = group.chunk();

    let position = if let Some(channel) = channels.first_child::<Vector3Channel>() {
        keyed(&channel.frames, channel.values.iter().copied())
    } else if let Some(channel) = channels.first_child::<Vector2Channel>() {
        keyed(&channel.frames, channel.positions())
    } else {
        KeyframeCurve::constant(rest_translation)
    };

    let rotation = if let Some(channel) = channels.first_child::<CompressedQuaternionChannel>() {
        keyed(&channel.frames, channel.values.iter().copied())
    } else if let Some(channel) = channels.first_child::<QuaternionChannel>() {
        keyed(&channel.frames, channel.values.iter().copied())
    } else {
        KeyframeCurve::<Quat>::constant(rest_rotation)
    };

    Track {
        name: bone.name.clone(),
        position,
        rotation,
        scale: KeyframeCurve::constant(Vec3::ONE),
    }
}

/// Pair frame numbers with values
fn keyed<T: Lerp>(
    frames: &[u16],
    values: impl Iterator<Item = T>,
) -> KeyframeCurve<T> {
    frames
        .iter()
        .map(|&frame| f32::from(frame))
        .zip(values)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride() {
        assert_eq!(std::mem::size_of::<Vertex>(), 80);
    }

    #[test]
    fn test_unpack_colour_order() {
        assert_eq!(unpack_colour(0xFF00_00FF), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(unpack_colour(0x0000_FF00), [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_keyed_pairs_frames_and_values() {
        let curve = keyed(&[0, 10], [1.0f32, 3.0].into_iter());
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.evaluate(5.0, 0.0), 2.0);
    }

    #[test]
    fn test_track_without_group_holds_rest_pose() {
        let rest = Mat4::from_rotation_translation(Quat::from_rotation_y(0.4), Vec3::new(1.0, 2.0, 3.0));
        let bone = Bone {
            name: "hip".into(),
            parent: 0,
            rest_pose: rest,
            bind_world: rest,
        };

        let track = build_track(&bone, None);
        assert!(track.local_transform(7.0).abs_diff_eq(rest, 1e-5));
        assert_eq!(track.sample(0.0).scale, Vec3::ONE);
    }

    #[test]
    fn test_track_drops_rest_scale() {
        let rotation = Quat::from_rotation_x(0.7);
        let translation = Vec3::new(0.0, 1.5, 0.0);
        let bone = Bone {
            name: "arm".into(),
            parent: 0,
            rest_pose: Mat4::from_scale_rotation_translation(Vec3::splat(2.0), rotation, translation),
            bind_world: Mat4::IDENTITY,
        };

        let track = build_track(&bone, None);
        let expected = Mat4::from_rotation_translation(rotation, translation);

        assert!(track.local_transform(0.0).abs_diff_eq(expected, 1e-5));
        assert_eq!(track.scale.len(), 1);
        assert_eq!(track.sample(3.0).scale, Vec3::ONE);
    }
}
