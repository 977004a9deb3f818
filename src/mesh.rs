use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::RenderConfig;
use crate::projection::WorldSpace;
use crate::sequence::PoseSequence;
use crate::skeleton::landmark::{ARTICULATIONS, HEAD};
use crate::skeleton::Skeleton;

// Instance data for bone cylinders, oriented on the GPU by quaternion
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BoneInstance {
    pub midpoint: [f32; 3],
    pub length: f32,
    pub rotation: [f32; 4],
    pub color: [f32; 4],
    pub radius: f32,
}

// Instance data for spheres: the head and the articulation markers
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct JointInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub color: [f32; 4],
}

/// The per-frame content of the spatial view, ready for upload.
#[derive(Debug, Clone, Default)]
pub struct SceneMesh {
    pub bones: Vec<BoneInstance>,
    pub joints: Vec<JointInstance>,
}

impl SceneMesh {
    /// Build from a skeleton that is already in world space.
    pub fn build(world: &Skeleton, config: &RenderConfig) -> Self {
        let colors = &config.colors;
        let bones = world
            .bones
            .iter()
            .filter(|bone| !bone.is_degenerate())
            .filter_map(|bone| {
                let radius = config.thickness.radius(bone.category())?;
                Some(BoneInstance {
                    midpoint: bone.midpoint.to_array(),
                    length: bone.length,
                    rotation: bone.orientation.to_array(),
                    color: colors.bone,
                    radius,
                })
            })
            .collect();
        let head = JointInstance {
            position: world.joint(HEAD).to_array(),
            scale: config.head_radius,
            color: colors.head,
        };
        let markers = ARTICULATIONS.iter().map(|landmark| JointInstance {
            position: world.joint(*landmark).to_array(),
            scale: config.marker_radius,
            color: colors.marker,
        });
        Self {
            bones,
            joints: std::iter::once(head).chain(markers).collect(),
        }
    }
}

/// Height of the ground plane: just under the lowest point the figure ever reaches.
pub fn ground_level(sequence: &PoseSequence) -> f32 {
    let lowest = sequence
        .frames()
        .iter()
        .flat_map(|frame| frame.values().chunks_exact(3))
        .map(|triple| WorldSpace::to_world(Vec3::from_slice(triple)).y)
        .fold(f32::INFINITY, f32::min);
    if lowest.is_finite() {
        lowest - 0.02
    } else {
        0.0
    }
}

/// Center of the box holding every world-space point of every frame.
pub fn sequence_focus(sequence: &PoseSequence) -> Vec3 {
    let (min, max) = sequence
        .frames()
        .iter()
        .flat_map(|frame| frame.values().chunks_exact(3))
        .map(|triple| WorldSpace::to_world(Vec3::from_slice(triple)))
        .fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |(min, max), point| {
            (min.min(point), max.max(point))
        });
    if min.is_finite() && max.is_finite() {
        (min + max) / 2.0
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaybackConfig;
    use crate::projection::Projection;
    use crate::session::PlaybackSession;
    use crate::skeleton::landmark::{BoneCategory, Landmark, BONES, LANDMARK_COUNT};
    use crate::camera::Camera;
    use glam::Quat;

    fn spread_skeleton() -> Skeleton {
        let mut joints = [Vec3::ZERO; LANDMARK_COUNT];
        for (index, joint) in joints.iter_mut().enumerate() {
            let angle = index as f32 * 0.7;
            *joint = Vec3::new(angle.cos(), index as f32 * 0.05, angle.sin());
        }
        Skeleton::from_joints(joints)
    }

    #[test]
    fn test_meshed_bones_skip_face_and_hands() {
        let config = RenderConfig::default();
        let mesh = SceneMesh::build(&spread_skeleton(), &config);
        let meshed = BONES
            .iter()
            .filter(|spec| !matches!(spec.category, BoneCategory::Face | BoneCategory::Hand))
            .count();
        assert_eq!(mesh.bones.len(), meshed);
        let torso = mesh.bones.iter().map(|bone| bone.radius).fold(f32::MIN, f32::max);
        assert_eq!(torso, config.thickness.torso);
    }

    #[test]
    fn test_bone_instances_carry_orientation() {
        let skeleton = spread_skeleton();
        let mesh = SceneMesh::build(&skeleton, &RenderConfig::default());
        let thigh = skeleton.bone("left_hip_to_left_knee").unwrap();
        let instance = mesh
            .bones
            .iter()
            .find(|instance| instance.midpoint == thigh.midpoint.to_array())
            .unwrap();
        assert_eq!(instance.length, thigh.length);
        let rotation = Quat::from_array(instance.rotation);
        assert!((rotation * Vec3::Y).abs_diff_eq(thigh.direction, 1e-4));
    }

    #[test]
    fn test_head_and_markers() {
        let skeleton = spread_skeleton();
        let config = RenderConfig::default();
        let mesh = SceneMesh::build(&skeleton, &config);
        assert_eq!(mesh.joints.len(), 1 + ARTICULATIONS.len());
        assert_eq!(mesh.joints[0].position, skeleton.joint(Landmark::Nose).to_array());
        assert_eq!(mesh.joints[0].scale, config.head_radius);
        assert!(mesh.joints[1..].iter().all(|marker| marker.scale == config.marker_radius));
    }

    #[test]
    fn test_degenerate_bones_left_out() {
        let mesh = SceneMesh::build(
            &Skeleton::from_joints([Vec3::ZERO; LANDMARK_COUNT]),
            &RenderConfig::default(),
        );
        assert!(mesh.bones.is_empty());
        assert_eq!(mesh.joints.len(), 1 + ARTICULATIONS.len());
    }

    #[test]
    fn test_ground_below_lowest_world_point() {
        let mut pose = vec![0.0; 99];
        pose[Landmark::LeftAnkle.index() * 3 + 1] = 0.8;
        let json = serde_json::json!({
            "seed_frames": 1, "generated_frames": 0, "total_frames": 1,
            "pose_dimension": 99, "poses": [pose],
        })
        .to_string();
        let session = PlaybackSession::from_json(&json, &PlaybackConfig::default()).unwrap();
        let level = ground_level(session.sequence());
        assert!((level - (-0.82)).abs() < 1e-5);
        let world = WorldSpace.project(&session.snapshot().unwrap().skeleton);
        assert!(world.floor() > level);
    }

    fn walking_session() -> PlaybackSession {
        let poses: Vec<Vec<f32>> = (0..6)
            .map(|frame| {
                let mut pose = vec![0.0; 99];
                for landmark in 0..LANDMARK_COUNT {
                    pose[landmark * 3] = frame as f32 * 0.2 + landmark as f32 * 0.01;
                    pose[landmark * 3 + 1] = -(landmark as f32) * 0.05;
                }
                pose
            })
            .collect();
        let json = serde_json::json!({
            "seed_frames": 2, "generated_frames": 4, "total_frames": 6,
            "pose_dimension": 99, "poses": poses,
        })
        .to_string();
        PlaybackSession::from_json(&json, &PlaybackConfig::default()).unwrap()
    }

    #[test]
    fn test_focus_spans_whole_sequence() {
        let session = walking_session();
        let focus = sequence_focus(session.sequence());
        // x runs from 0.0 in the first frame to 1.0 + 0.32 in the last
        assert!((focus.x - 0.66).abs() < 1e-5);
        assert!((focus.y - 0.8).abs() < 1e-5);
        assert_eq!(focus.z, 0.0);
    }

    #[test]
    fn test_showing_frames_leaves_camera_alone() {
        let mut session = walking_session();
        let config = RenderConfig::default();
        let camera = Camera::framing(sequence_focus(session.sequence()), 800.0, 600.0);
        let (position, look_at) = (camera.position, camera.look_at);
        let mut midpoints = Vec::new();
        for _ in 0..6 {
            let snapshot = session.tick(1000.0).unwrap();
            let world = WorldSpace.project(&snapshot.skeleton);
            let mesh = SceneMesh::build(&world, &config);
            assert!(!mesh.bones.is_empty());
            midpoints.push(world.midpoint());
            assert_eq!(sequence_focus(session.sequence()), look_at);
        }
        assert!(midpoints.windows(2).all(|pair| pair[0] != pair[1]));
        assert_eq!((camera.position, camera.look_at), (position, look_at));
    }
}
