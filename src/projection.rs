use glam::{Vec2, Vec3};

use crate::skeleton::landmark::LANDMARK_COUNT;
use crate::skeleton::Skeleton;

/// A coordinate transform from reconstructed landmarks to what a renderer draws.
pub trait Projection {
    type Output;

    fn project(&self, skeleton: &Skeleton) -> Self::Output;
}

/// The skeleton laid out on a flat surface, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFigure {
    pub points: [Vec2; LANDMARK_COUNT],
    /// Landmark index pairs, skipping bones that have no extent
    pub segments: Vec<(usize, usize)>,
}

/// Fits the figure's x/y bounding box into a surface, keeping its aspect.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBoxFit {
    pub width: f32,
    pub height: f32,
    pub fit_margin: f32,
}

impl BoundingBoxFit {
    pub fn new(width: u32, height: u32, fit_margin: f32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
            fit_margin,
        }
    }

    fn surface_center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) / 2.0
    }
}

impl Projection for BoundingBoxFit {
    type Output = FlatFigure;

    fn project(&self, skeleton: &Skeleton) -> FlatFigure {
        let (min, max) = skeleton.joints.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), joint| (min.min(joint.truncate()), max.max(joint.truncate())),
        );
        let range = (max - min).map(|extent| if extent == 0.0 { 1.0 } else { extent });
        let scale = (self.width / range.x).min(self.height / range.y) * self.fit_margin;
        let box_center = (min + max) / 2.0;
        let surface_center = self.surface_center();
        let points = skeleton
            .joints
            .map(|joint| (joint.truncate() - box_center) * scale + surface_center);
        let segments = skeleton
            .bones
            .iter()
            .filter(|bone| !bone.is_degenerate())
            .map(|bone| (bone.spec.start.index(), bone.spec.end.index()))
            .collect();
        FlatFigure { points, segments }
    }
}

/// Landmarks used directly as scene coordinates, turned so that up is positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldSpace;

impl WorldSpace {
    pub fn to_world(point: Vec3) -> Vec3 {
        Vec3::new(point.x, -point.y, point.z)
    }
}

impl Projection for WorldSpace {
    type Output = Skeleton;

    fn project(&self, skeleton: &Skeleton) -> Skeleton {
        Skeleton::from_joints(skeleton.joints.map(WorldSpace::to_world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::landmark::{Landmark, POSE_DIMENSION};
    use crate::skeleton::{reconstruct, REFERENCE_AXIS};

    fn skeleton_with(points: &[(Landmark, Vec3)]) -> Skeleton {
        let mut joints = [Vec3::ZERO; LANDMARK_COUNT];
        for (landmark, point) in points {
            joints[landmark.index()] = *point;
        }
        Skeleton::from_joints(joints)
    }

    #[test]
    fn test_single_point_lands_at_center() {
        let skeleton = reconstruct(&[0.25; POSE_DIMENSION]).unwrap();
        let figure = BoundingBoxFit::new(800, 600, 0.7).project(&skeleton);
        for point in figure.points {
            assert!(point.is_finite());
            assert_eq!(point, Vec2::new(400.0, 300.0));
        }
        assert!(figure.segments.is_empty());
    }

    #[test]
    fn test_fit_uses_limiting_axis() {
        // 2 wide, 1 tall: width limits (800/2 = 400 < 600/1)
        let skeleton = skeleton_with(&[
            (Landmark::Nose, Vec3::new(-1.0, 0.0, 0.0)),
            (Landmark::LeftEyeInner, Vec3::new(1.0, 1.0, 0.0)),
        ]);
        let figure = BoundingBoxFit::new(800, 600, 0.5).project(&skeleton);
        let nose = figure.points[Landmark::Nose.index()];
        let eye = figure.points[Landmark::LeftEyeInner.index()];
        assert!((eye.x - nose.x - 400.0).abs() < 1e-3);
        assert!((eye.y - nose.y - 200.0).abs() < 1e-3);
        let center = (nose + eye) / 2.0;
        assert!(center.abs_diff_eq(Vec2::new(400.0, 300.0), 1e-3));
    }

    #[test]
    fn test_figure_stays_inside_margin() {
        let values: Vec<f32> = (0..POSE_DIMENSION).map(|i| (i as f32 * 0.37).sin()).collect();
        let skeleton = reconstruct(&values).unwrap();
        let figure = BoundingBoxFit::new(800, 600, 0.7).project(&skeleton);
        for point in figure.points {
            assert!(point.x >= 400.0 - 280.0 - 1e-3 && point.x <= 400.0 + 280.0 + 1e-3);
            assert!(point.y >= 300.0 - 210.0 - 1e-3 && point.y <= 300.0 + 210.0 + 1e-3);
        }
    }

    #[test]
    fn test_world_space_flips_vertical() {
        let skeleton = skeleton_with(&[
            (Landmark::LeftHip, Vec3::new(0.0, 0.0, 0.0)),
            (Landmark::LeftKnee, Vec3::new(0.1, 0.5, 0.2)),
        ]);
        let world = WorldSpace.project(&skeleton);
        assert_eq!(world.joint(Landmark::LeftKnee), Vec3::new(0.1, -0.5, 0.2));
        let thigh = world.bone("left_hip_to_left_knee").unwrap();
        let source = skeleton.bone("left_hip_to_left_knee").unwrap();
        assert!((thigh.length - source.length).abs() < 1e-6);
        assert!((thigh.orientation * REFERENCE_AXIS).abs_diff_eq(thigh.direction, 1e-4));
        assert!(thigh.direction.y < 0.0);
    }
}
