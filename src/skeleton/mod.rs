pub mod landmark;

use glam::{Quat, Vec3};
use log::debug;

use crate::error::VectorFault;
use landmark::{BoneCategory, BoneSpec, Landmark, BONES, LANDMARK_COUNT, POSE_DIMENSION};

/// Bones shorter than this have no usable direction
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// The axis a bone primitive points along before it is oriented
pub const REFERENCE_AXIS: Vec3 = Vec3::Y;

/// The rotation that carries `reference` onto `target`.
///
/// Either vector may have any length; when one of them has no length there is
/// no meaningful direction and the identity is returned.
pub fn rotation_aligning(reference: Vec3, target: Vec3) -> Quat {
    let (Some(from), Some(to)) = (reference.try_normalize(), target.try_normalize()) else {
        return Quat::IDENTITY;
    };
    Quat::from_rotation_arc(from, to).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    pub spec: BoneSpec,
    pub midpoint: Vec3,
    pub direction: Vec3,
    pub length: f32,
    pub orientation: Quat,
}

impl Bone {
    fn between(spec: BoneSpec, joints: &[Vec3; LANDMARK_COUNT]) -> Self {
        let start = joints[spec.start.index()];
        let end = joints[spec.end.index()];
        let span = end - start;
        let length = span.length();
        let direction = if length > DEGENERATE_EPSILON {
            span / length
        } else {
            Vec3::ZERO
        };
        Self {
            spec,
            midpoint: (start + end) * 0.5,
            direction,
            length,
            orientation: rotation_aligning(REFERENCE_AXIS, direction),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.length <= DEGENERATE_EPSILON
    }

    pub fn category(&self) -> BoneCategory {
        self.spec.category
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub joints: [Vec3; LANDMARK_COUNT],
    pub bones: Vec<Bone>,
    /// Indices into `bones` whose two joints coincided
    pub degenerate: Vec<usize>,
}

impl Skeleton {
    pub fn from_joints(joints: [Vec3; LANDMARK_COUNT]) -> Self {
        let bones: Vec<Bone> = BONES.iter().map(|spec| Bone::between(*spec, &joints)).collect();
        let degenerate: Vec<usize> = bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.is_degenerate())
            .map(|(index, _)| index)
            .collect();
        for &index in &degenerate {
            debug!("Degenerate bone {}, using identity orientation", bones[index].spec.name());
        }
        Self {
            joints,
            bones,
            degenerate,
        }
    }

    pub fn joint(&self, landmark: Landmark) -> Vec3 {
        self.joints[landmark.index()]
    }

    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bones.iter().find(|bone| bone.spec.name() == name)
    }

    pub fn midpoint(&self) -> Vec3 {
        self.joints.iter().copied().sum::<Vec3>() / LANDMARK_COUNT as f32
    }

    /// Lowest point along the vertical axis, used to rest the figure on the ground
    pub fn floor(&self) -> f32 {
        self.joints.iter().map(|joint| joint.y).fold(f32::INFINITY, f32::min)
    }
}

/// Interpret a flat pose vector as landmark triples and derive its bones.
pub fn reconstruct(values: &[f32]) -> Result<Skeleton, VectorFault> {
    if values.len() != POSE_DIMENSION {
        return Err(VectorFault::Length {
            expected: POSE_DIMENSION,
            actual: values.len(),
        });
    }
    if let Some(coordinate) = values.iter().position(|value| !value.is_finite()) {
        return Err(VectorFault::NonFinite { coordinate });
    }
    let mut joints = [Vec3::ZERO; LANDMARK_COUNT];
    for (joint, triple) in joints.iter_mut().zip(values.chunks_exact(3)) {
        *joint = Vec3::new(triple[0], triple[1], triple[2]);
    }
    Ok(Skeleton::from_joints(joints))
}
