use crate::config::PlaybackConfig;
use crate::error::PoseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Playing,
    Paused,
    Stopped,
}

/// What renderers get to see of playback, copied out once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub current_frame: usize,
    pub is_playing: bool,
    pub frames_per_second: u32,
    /// Time accumulated since the last advance
    pub since_advance_ms: f64,
}

/// Advances the frame index at a logical rate, no matter how often it is ticked.
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    stage: Stage,
    total_count: usize,
    current_frame: usize,
    frames_per_second: u32,
    min_frames_per_second: u32,
    max_frames_per_second: u32,
    since_advance_ms: f64,
}

impl PlaybackScheduler {
    pub fn new(total_count: usize, config: &PlaybackConfig) -> Result<Self, PoseError> {
        if total_count == 0 {
            return Err(PoseError::EmptySequence);
        }
        config.validate()?;
        Ok(Self {
            stage: Stage::Playing,
            total_count,
            current_frame: 0,
            frames_per_second: config.frames_per_second,
            min_frames_per_second: config.min_frames_per_second,
            max_frames_per_second: config.max_frames_per_second,
            since_advance_ms: 0.0,
        })
    }

    /// One host paint callback. Returns true when the frame index moved.
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        if self.stage != Stage::Playing {
            return false;
        }
        self.since_advance_ms += elapsed_ms.max(0.0);
        if self.since_advance_ms < self.frame_interval_ms() {
            return false;
        }
        self.current_frame = (self.current_frame + 1) % self.total_count;
        self.since_advance_ms = 0.0;
        true
    }

    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.frames_per_second as f64
    }

    pub fn toggle_play_pause(&mut self) {
        self.stage = match self.stage {
            Stage::Playing => Stage::Paused,
            Stage::Paused => Stage::Playing,
            Stage::Stopped => Stage::Stopped,
        };
    }

    pub fn play(&mut self) {
        if self.stage == Stage::Paused {
            self.stage = Stage::Playing;
        }
    }

    pub fn pause(&mut self) {
        if self.stage == Stage::Playing {
            self.stage = Stage::Paused;
        }
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.since_advance_ms = 0.0;
    }

    pub fn set_frames_per_second(&mut self, frames_per_second: u32) {
        self.frames_per_second =
            frames_per_second.clamp(self.min_frames_per_second, self.max_frames_per_second);
    }

    pub fn faster(&mut self) {
        self.set_frames_per_second(self.frames_per_second.saturating_add(1));
    }

    pub fn slower(&mut self) {
        self.set_frames_per_second(self.frames_per_second.saturating_sub(1));
    }

    pub fn step_forward(&mut self) {
        if self.stage != Stage::Stopped {
            self.current_frame = (self.current_frame + 1) % self.total_count;
            self.since_advance_ms = 0.0;
        }
    }

    pub fn step_backward(&mut self) {
        if self.stage != Stage::Stopped {
            self.current_frame = (self.current_frame + self.total_count - 1) % self.total_count;
            self.since_advance_ms = 0.0;
        }
    }

    /// Final: no more advances and no more paint requests.
    pub fn stop(&mut self) {
        self.stage = Stage::Stopped;
    }

    pub fn is_playing(&self) -> bool {
        self.stage == Stage::Playing
    }

    pub fn is_stopped(&self) -> bool {
        self.stage == Stage::Stopped
    }

    /// Whether the host should keep scheduling paint callbacks
    pub fn wants_paint(&self) -> bool {
        self.stage == Stage::Playing
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_frame: self.current_frame,
            is_playing: self.is_playing(),
            frames_per_second: self.frames_per_second,
            since_advance_ms: self.since_advance_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn scheduler(total: usize, fps: u32) -> PlaybackScheduler {
        let mut scheduler = PlaybackScheduler::new(total, &PlaybackConfig::default()).unwrap();
        scheduler.set_frames_per_second(fps);
        scheduler
    }

    #[test]
    fn test_starts_playing_at_zero() {
        let scheduler = scheduler(5, 10);
        assert!(scheduler.is_playing());
        assert_eq!(scheduler.current_frame(), 0);
    }

    #[test]
    fn test_no_scheduler_for_empty_sequence() {
        assert!(matches!(
            PlaybackScheduler::new(0, &PlaybackConfig::default()),
            Err(PoseError::EmptySequence)
        ));
    }

    #[test]
    fn test_inverted_rate_range_rejected() {
        let config = PlaybackConfig {
            frames_per_second: 10,
            min_frames_per_second: 20,
            max_frames_per_second: 5,
        };
        assert!(matches!(
            PlaybackScheduler::new(5, &config),
            Err(PoseError::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_rate_outside_range_rejected() {
        let config = PlaybackConfig {
            frames_per_second: 0,
            ..PlaybackConfig::default()
        };
        assert!(PlaybackScheduler::new(5, &config).is_err());
    }

    #[test]
    fn test_loop_closure() {
        for total in [1, 2, 7, 132] {
            let mut scheduler = scheduler(total, 30);
            for _ in 0..total {
                assert!(scheduler.tick(1000.0));
            }
            assert_eq!(scheduler.current_frame(), 0, "total {total}");
        }
    }

    #[test]
    fn test_short_ticks_accumulate() {
        let mut scheduler = scheduler(10, 10);
        let advances = (0..25).filter(|_| scheduler.tick(10.0)).count();
        assert_eq!(advances, 2);
        assert_eq!(scheduler.current_frame(), 2);
        assert_eq!(scheduler.state().since_advance_ms, 50.0);
    }

    #[test]
    fn test_one_advance_per_tick() {
        let mut scheduler = scheduler(10, 10);
        assert!(scheduler.tick(350.0));
        assert_eq!(scheduler.current_frame(), 1);
        assert_eq!(scheduler.state().since_advance_ms, 0.0);
    }

    #[test]
    fn test_paused_ticks_change_nothing() {
        let mut scheduler = scheduler(10, 10);
        scheduler.toggle_play_pause();
        assert!(!scheduler.is_playing());
        assert!(!scheduler.tick(1000.0));
        assert_eq!(scheduler.state().since_advance_ms, 0.0);
        scheduler.toggle_play_pause();
        assert!(scheduler.tick(100.0));
    }

    #[test]
    fn test_reset_keeps_play_state() {
        let mut scheduler = scheduler(10, 10);
        scheduler.tick(100.0);
        scheduler.pause();
        scheduler.reset();
        assert_eq!(scheduler.current_frame(), 0);
        assert!(!scheduler.is_playing());
    }

    #[test]
    fn test_speed_change_keeps_frame() {
        let mut scheduler = scheduler(10, 2);
        scheduler.tick(500.0);
        scheduler.tick(300.0);
        scheduler.set_frames_per_second(4);
        assert_eq!(scheduler.current_frame(), 1);
        assert!(scheduler.tick(0.0), "300ms already exceeds the new 250ms interval");
        assert_eq!(scheduler.current_frame(), 2);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut scheduler = scheduler(10, 100);
        assert_eq!(scheduler.frames_per_second(), 30);
        scheduler.faster();
        assert_eq!(scheduler.frames_per_second(), 30);
        scheduler.set_frames_per_second(0);
        assert_eq!(scheduler.frames_per_second(), 1);
        scheduler.slower();
        assert_eq!(scheduler.frames_per_second(), 1);
    }

    #[test]
    fn test_stepping_wraps() {
        let mut scheduler = scheduler(3, 10);
        scheduler.step_backward();
        assert_eq!(scheduler.current_frame(), 2);
        scheduler.step_forward();
        assert_eq!(scheduler.current_frame(), 0);
    }

    #[test]
    fn test_stop_is_final() {
        let mut scheduler = scheduler(3, 10);
        scheduler.stop();
        scheduler.toggle_play_pause();
        scheduler.play();
        assert!(scheduler.is_stopped());
        assert!(!scheduler.wants_paint());
        assert!(!scheduler.tick(1000.0));
        scheduler.step_forward();
        assert_eq!(scheduler.current_frame(), 0);
    }
}
