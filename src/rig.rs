use std::str::FromStr;

use serde::Serialize;

use crate::skeleton::landmark::Landmark;
use crate::skeleton::Skeleton;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RigJoint {
    pub name: String,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RigBone {
    pub name: String,
    pub midpoint: [f32; 3],
    /// Unit quaternion (x, y, z, w) turning +Y onto the bone
    pub rotation: [f32; 4],
    pub length: f32,
}

/// What a host rig receives for one frame, in world space.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RigPose {
    pub frame: usize,
    pub joints: Vec<RigJoint>,
    pub bones: Vec<RigBone>,
    /// Requested names that are not landmarks
    pub missing: Vec<String>,
}

impl RigPose {
    pub fn from_skeleton(frame: usize, world: &Skeleton, joint_names: &[&str]) -> Self {
        let mut joints = Vec::with_capacity(joint_names.len());
        let mut missing = Vec::new();
        for &name in joint_names {
            match Landmark::from_str(name) {
                Ok(landmark) => joints.push(RigJoint {
                    name: name.to_string(),
                    position: world.joint(landmark).to_array(),
                }),
                Err(_) => missing.push(name.to_string()),
            }
        }
        let bones = world
            .bones
            .iter()
            .map(|bone| RigBone {
                name: bone.spec.name(),
                midpoint: bone.midpoint.to_array(),
                rotation: bone.orientation.to_array(),
                length: bone.length,
            })
            .collect();
        Self {
            frame,
            joints,
            bones,
            missing,
        }
    }

    pub fn joint(&self, name: &str) -> Option<[f32; 3]> {
        self.joints
            .iter()
            .find(|joint| joint.name == name)
            .map(|joint| joint.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::landmark::{BONES, LANDMARK_COUNT};
    use glam::Vec3;

    #[test]
    fn test_requested_joints_and_missing_names() {
        let mut joints = [Vec3::ZERO; LANDMARK_COUNT];
        joints[Landmark::LeftWrist.index()] = Vec3::new(0.5, 1.0, -0.25);
        let skeleton = Skeleton::from_joints(joints);
        let pose = RigPose::from_skeleton(3, &skeleton, &["left_wrist", "nose", "tail"]);
        assert_eq!(pose.frame, 3);
        assert_eq!(pose.joint("left_wrist"), Some([0.5, 1.0, -0.25]));
        assert_eq!(pose.joint("nose"), Some([0.0, 0.0, 0.0]));
        assert_eq!(pose.missing, vec!["tail".to_string()]);
        assert_eq!(pose.bones.len(), BONES.len());
        let forearm = pose
            .bones
            .iter()
            .find(|bone| bone.name == "left_elbow_to_left_wrist")
            .unwrap();
        assert!((forearm.length - Vec3::new(0.5, 1.0, -0.25).length()).abs() < 1e-6);
    }
}
