use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Number of tracked body points in one pose vector
pub const LANDMARK_COUNT: usize = 33;

/// Length of a pose vector: one (x, y, z) triple per landmark
pub const POSE_DIMENSION: usize = LANDMARK_COUNT * 3;

/// The 33-point body landmark convention, in pose vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
#[repr(usize)]
pub enum Landmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl Landmark {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Landmark::iter().nth(index)
    }
}

/// Groups bones that share a thickness in the spatial mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BoneCategory {
    Face,
    Torso,
    UpperArm,
    Forearm,
    Hand,
    Thigh,
    Shin,
    Foot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSpec {
    pub start: Landmark,
    pub end: Landmark,
    pub category: BoneCategory,
}

impl BoneSpec {
    const fn new(start: Landmark, end: Landmark, category: BoneCategory) -> Self {
        Self {
            start,
            end,
            category,
        }
    }

    pub fn name(&self) -> String {
        format!("{}_to_{}", self.start, self.end)
    }

    pub fn touches(&self, landmark: Landmark) -> bool {
        self.start == landmark || self.end == landmark
    }
}

use BoneCategory::*;
use Landmark::*;

/// Anatomical adjacency, keyed to the landmark order above.
pub const BONES: [BoneSpec; 33] = [
    BoneSpec::new(Nose, LeftEyeInner, Face),
    BoneSpec::new(LeftEyeInner, LeftEye, Face),
    BoneSpec::new(LeftEye, LeftEyeOuter, Face),
    BoneSpec::new(LeftEyeOuter, LeftEar, Face),
    BoneSpec::new(Nose, RightEyeInner, Face),
    BoneSpec::new(RightEyeInner, RightEye, Face),
    BoneSpec::new(RightEye, RightEyeOuter, Face),
    BoneSpec::new(RightEyeOuter, RightEar, Face),
    BoneSpec::new(MouthLeft, MouthRight, Face),
    BoneSpec::new(LeftShoulder, RightShoulder, Torso),
    BoneSpec::new(LeftShoulder, LeftElbow, UpperArm),
    BoneSpec::new(LeftElbow, LeftWrist, Forearm),
    BoneSpec::new(RightShoulder, RightElbow, UpperArm),
    BoneSpec::new(RightElbow, RightWrist, Forearm),
    BoneSpec::new(LeftWrist, LeftPinky, Hand),
    BoneSpec::new(LeftWrist, LeftIndex, Hand),
    BoneSpec::new(LeftWrist, LeftThumb, Hand),
    BoneSpec::new(RightWrist, RightPinky, Hand),
    BoneSpec::new(RightWrist, RightIndex, Hand),
    BoneSpec::new(RightWrist, RightThumb, Hand),
    BoneSpec::new(LeftHip, RightHip, Torso),
    BoneSpec::new(LeftShoulder, LeftHip, Torso),
    BoneSpec::new(RightShoulder, RightHip, Torso),
    BoneSpec::new(LeftHip, LeftKnee, Thigh),
    BoneSpec::new(RightHip, RightKnee, Thigh),
    BoneSpec::new(LeftKnee, LeftAnkle, Shin),
    BoneSpec::new(RightKnee, RightAnkle, Shin),
    BoneSpec::new(LeftAnkle, LeftHeel, Foot),
    BoneSpec::new(LeftAnkle, LeftFootIndex, Foot),
    BoneSpec::new(LeftHeel, LeftFootIndex, Foot),
    BoneSpec::new(RightAnkle, RightHeel, Foot),
    BoneSpec::new(RightAnkle, RightFootIndex, Foot),
    BoneSpec::new(RightHeel, RightFootIndex, Foot),
];

/// Where the spatial mesh puts its head sphere
pub const HEAD: Landmark = Nose;

/// Major articulation points that get a marker sphere in the spatial mesh
pub const ARTICULATIONS: [Landmark; 12] = [
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_landmark_order_matches_indices() {
        assert_eq!(Landmark::iter().count(), LANDMARK_COUNT);
        for (index, landmark) in Landmark::iter().enumerate() {
            assert_eq!(landmark.index(), index);
            assert_eq!(Landmark::from_index(index), Some(landmark));
        }
        assert_eq!(Landmark::from_index(LANDMARK_COUNT), None);
        assert_eq!(LeftHip.index(), 23);
        assert_eq!(RightFootIndex.index(), 32);
    }

    #[test]
    fn test_landmark_names() {
        assert_eq!(LeftWrist.to_string(), "left_wrist");
        assert_eq!(Landmark::from_str("right_foot_index").unwrap(), RightFootIndex);
        assert!(Landmark::from_str("tail").is_err());
    }

    #[test]
    fn test_bones_are_distinct_pairs() {
        for (i, a) in BONES.iter().enumerate() {
            assert_ne!(a.start, a.end, "bone {i} connects a landmark to itself");
            for b in BONES.iter().skip(i + 1) {
                let same = (a.start == b.start && a.end == b.end)
                    || (a.start == b.end && a.end == b.start);
                assert!(!same, "duplicate bone {}", a.name());
            }
        }
    }

    #[test]
    fn test_bone_name() {
        assert_eq!(BONES[10].name(), "left_shoulder_to_left_elbow");
        assert!(BONES[10].touches(LeftElbow));
        assert!(!BONES[10].touches(RightElbow));
    }
}
