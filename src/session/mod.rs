use std::path::Path;

use log::{info, warn};

use crate::config::PlaybackConfig;
use crate::error::PoseError;
use crate::playback::{PlaybackScheduler, PlaybackState};
use crate::projection::{Projection, WorldSpace};
use crate::rig::RigPose;
use crate::sequence::{PoseSequence, Provenance};
use crate::skeleton::{reconstruct, Skeleton};


/// Everything a renderer needs for one paint, taken together in one tick.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub index: usize,
    pub total: usize,
    pub provenance: Provenance,
    pub state: PlaybackState,
    pub skeleton: Skeleton,
}

impl FrameSnapshot {
    /// Frame number as shown to people, starting at one
    pub fn frame_number(&self) -> usize {
        self.index + 1
    }

    pub fn frame_text(&self) -> String {
        format!("Frame {} / {}", self.frame_number(), self.total)
    }
}

/// One loaded sequence and the scheduler playing it.
pub struct PlaybackSession {
    sequence: PoseSequence,
    scheduler: PlaybackScheduler,
}

impl PlaybackSession {
    pub fn new(sequence: PoseSequence, config: &PlaybackConfig) -> Result<Self, PoseError> {
        let scheduler = PlaybackScheduler::new(sequence.total_count(), config)?;
        info!(
            "Playing {} frames at {} fps",
            sequence.total_count(),
            scheduler.frames_per_second()
        );
        Ok(Self {
            sequence,
            scheduler,
        })
    }

    pub fn load(path: impl AsRef<Path>, config: &PlaybackConfig) -> Result<Self, PoseError> {
        Self::new(PoseSequence::load(path)?, config)
    }

    pub fn from_json(json: &str, config: &PlaybackConfig) -> Result<Self, PoseError> {
        Self::new(PoseSequence::from_json(json)?, config)
    }

    /// Advance if due, then rebuild the skeleton of whatever frame is current.
    pub fn tick(&mut self, elapsed_ms: f64) -> Option<FrameSnapshot> {
        if self.scheduler.is_stopped() {
            return None;
        }
        self.scheduler.tick(elapsed_ms);
        self.snapshot()
    }

    pub fn snapshot(&self) -> Option<FrameSnapshot> {
        if self.scheduler.is_stopped() {
            return None;
        }
        self.snapshot_at(self.scheduler.current_frame())
    }

    /// A snapshot of any frame, carrying the current playback state.
    pub fn snapshot_at(&self, index: usize) -> Option<FrameSnapshot> {
        let total = self.sequence.total_count();
        let index = index.min(total - 1);
        match reconstruct(self.sequence.frame(index).values()) {
            Ok(skeleton) => Some(FrameSnapshot {
                index,
                total,
                provenance: self.sequence.provenance(index),
                state: self.scheduler.state(),
                skeleton,
            }),
            Err(fault) => {
                warn!("Frame {index} skipped: {fault}");
                None
            }
        }
    }

    /// Positions for the named joints and every bone transform, in world space.
    pub fn rig_pose(&self, joint_names: &[&str]) -> Option<RigPose> {
        let snapshot = self.snapshot()?;
        let world = WorldSpace.project(&snapshot.skeleton);
        Some(RigPose::from_skeleton(snapshot.index, &world, joint_names))
    }

    pub fn sequence(&self) -> &PoseSequence {
        &self.sequence
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PlaybackScheduler {
        &mut self.scheduler
    }

    pub fn is_live(&self) -> bool {
        !self.scheduler.is_stopped()
    }

    /// Stop the scheduler so nothing reads frames any more.
    pub fn stop(&mut self) {
        if !self.scheduler.is_stopped() {
            self.scheduler.stop();
            info!("Playback stopped at frame {}", self.scheduler.current_frame() + 1);
        }
    }

    /// Stop, then release the sequence.
    pub fn end(mut self) {
        self.stop();
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop();
    }
}
