use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Malformation, PoseError, VectorFault};
use crate::skeleton::landmark::POSE_DIMENSION;

/// Whether a frame was observed or predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    Seed,
    Generated,
}

impl Provenance {
    pub fn label(self) -> &'static str {
        match self {
            Provenance::Seed => "SEED",
            Provenance::Generated => "GENERATED",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label())
    }
}

/// One frame: three finite coordinates for every landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseVector(Vec<f32>);

impl PoseVector {
    pub fn new(values: Vec<f32>) -> Result<Self, VectorFault> {
        if values.len() != POSE_DIMENSION {
            return Err(VectorFault::Length {
                expected: POSE_DIMENSION,
                actual: values.len(),
            });
        }
        if let Some(coordinate) = values.iter().position(|value| !value.is_finite()) {
            return Err(VectorFault::NonFinite { coordinate });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }
}

/// The document produced by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseDocument {
    #[serde(default)]
    pub video_path: String,
    pub seed_frames: usize,
    pub generated_frames: usize,
    pub total_frames: usize,
    pub pose_dimension: usize,
    pub poses: Vec<Vec<f64>>,
}

/// Frames of one playback, immutable once loaded
#[derive(Debug, Clone)]
pub struct PoseSequence {
    source: String,
    frames: Vec<PoseVector>,
    seed_count: usize,
}

impl PoseSequence {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PoseError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let sequence = Self::from_json(&json)?;
        info!(
            "Loaded {} frames ({} seed) from {:?}",
            sequence.total_count(),
            sequence.seed_count(),
            path
        );
        Ok(sequence)
    }

    pub fn from_json(json: &str) -> Result<Self, PoseError> {
        let document: PoseDocument = serde_json::from_str(json)?;
        Self::try_from(document)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn total_count(&self) -> usize {
        self.frames.len()
    }

    pub fn seed_count(&self) -> usize {
        self.seed_count
    }

    pub fn generated_count(&self) -> usize {
        self.frames.len() - self.seed_count
    }

    /// The frame at `index`, clamped to the last frame.
    pub fn frame(&self, index: usize) -> &PoseVector {
        &self.frames[index.min(self.frames.len() - 1)]
    }

    pub fn frames(&self) -> &[PoseVector] {
        &self.frames
    }

    pub fn provenance(&self, index: usize) -> Provenance {
        if index < self.seed_count {
            Provenance::Seed
        } else {
            Provenance::Generated
        }
    }
}

impl TryFrom<PoseDocument> for PoseSequence {
    type Error = PoseError;

    fn try_from(document: PoseDocument) -> Result<Self, Self::Error> {
        let PoseDocument {
            video_path,
            seed_frames,
            generated_frames,
            total_frames,
            pose_dimension,
            poses,
        } = document;
        if pose_dimension != POSE_DIMENSION {
            return Err(Malformation::PoseDimension {
                declared: pose_dimension,
                expected: POSE_DIMENSION,
            }
            .into());
        }
        if seed_frames.checked_add(generated_frames) != Some(total_frames) {
            return Err(Malformation::FrameTotals {
                seed: seed_frames,
                generated: generated_frames,
                total: total_frames,
            }
            .into());
        }
        if total_frames == 0 {
            return Err(PoseError::EmptySequence);
        }
        if poses.len() != total_frames {
            return Err(Malformation::FrameCount {
                declared: total_frames,
                actual: poses.len(),
            }
            .into());
        }
        let frames = poses
            .into_iter()
            .enumerate()
            .map(|(index, pose)| {
                let values = pose.into_iter().map(|value| value as f32).collect();
                PoseVector::new(values).map_err(|fault| Malformation::Frame { index, fault })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            source: video_path,
            frames,
            seed_count: seed_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(seed: usize, generated: usize) -> PoseDocument {
        PoseDocument {
            video_path: "dance.mp4".to_string(),
            seed_frames: seed,
            generated_frames: generated,
            total_frames: seed + generated,
            pose_dimension: POSE_DIMENSION,
            poses: vec![vec![0.5; POSE_DIMENSION]; seed + generated],
        }
    }

    #[test]
    fn test_provenance_boundary() {
        let sequence = PoseSequence::try_from(document(32, 100)).unwrap();
        assert_eq!(sequence.total_count(), 132);
        assert_eq!(sequence.provenance(31), Provenance::Seed);
        assert_eq!(sequence.provenance(32), Provenance::Generated);
        assert_eq!(sequence.provenance(31).label(), "SEED");
        assert_eq!(sequence.provenance(32).to_string(), "GENERATED");
    }

    #[test]
    fn test_all_generated_when_no_seed() {
        let sequence = PoseSequence::try_from(document(0, 3)).unwrap();
        assert_eq!(sequence.provenance(0), Provenance::Generated);
        assert_eq!(sequence.generated_count(), 3);
    }

    #[test]
    fn test_short_poses_rejected() {
        let mut document = document(4, 6);
        document.poses.truncate(7);
        match PoseSequence::try_from(document) {
            Err(PoseError::MalformedSequence(Malformation::FrameCount { declared, actual })) => {
                assert_eq!((declared, actual), (10, 7));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_totals_must_add_up() {
        let mut document = document(4, 6);
        document.total_frames = 11;
        assert!(matches!(
            PoseSequence::try_from(document),
            Err(PoseError::MalformedSequence(Malformation::FrameTotals { .. }))
        ));
    }

    #[test]
    fn test_wrong_dimension_rejected() {
        let mut document = document(1, 1);
        document.pose_dimension = 51;
        assert!(matches!(
            PoseSequence::try_from(document),
            Err(PoseError::MalformedSequence(Malformation::PoseDimension {
                declared: 51,
                expected: 99
            }))
        ));
    }

    #[test]
    fn test_short_frame_rejected() {
        let mut document = document(1, 2);
        document.poses[2].pop();
        assert!(matches!(
            PoseSequence::try_from(document),
            Err(PoseError::MalformedSequence(Malformation::Frame {
                index: 2,
                fault: VectorFault::Length { .. }
            }))
        ));
    }

    #[test]
    fn test_overflowing_coordinate_rejected() {
        let mut document = document(1, 0);
        document.poses[0][5] = 1e300;
        assert!(matches!(
            PoseSequence::try_from(document),
            Err(PoseError::MalformedSequence(Malformation::Frame {
                index: 0,
                fault: VectorFault::NonFinite { coordinate: 5 }
            }))
        ));
    }

    #[test]
    fn test_empty_sequence() {
        assert!(matches!(
            PoseSequence::try_from(document(0, 0)),
            Err(PoseError::EmptySequence)
        ));
    }

    #[test]
    fn test_from_json() {
        let poses = vec![vec![0.0; POSE_DIMENSION]; 2];
        let json = serde_json::json!({
            "video_path": "uploads/clip.mp4",
            "seed_frames": 1,
            "generated_frames": 1,
            "total_frames": 2,
            "pose_dimension": 99,
            "poses": poses,
        })
        .to_string();
        let sequence = PoseSequence::from_json(&json).unwrap();
        assert_eq!(sequence.source(), "uploads/clip.mp4");
        assert_eq!(sequence.frame(1).values().len(), POSE_DIMENSION);
        assert_eq!(sequence.frame(99), sequence.frame(1));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PoseSequence::from_json("{\"seed_frames\": 1}"),
            Err(PoseError::Json(_))
        ));
    }
}
