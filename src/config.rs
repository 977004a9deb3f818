use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::skeleton::landmark::{BoneCategory, LANDMARK_COUNT};

/// Everything the player needs that is not pose data, fixed at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub playback: PlaybackConfig,
    pub render: RenderConfig,
    pub window: WindowConfig,
}

impl PlayerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PlayerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.playback.validate()?;
        let margin = self.render.fit_margin;
        if !(margin > 0.0 && margin <= 1.0) {
            return Err(ConfigError::Invalid(format!("fit_margin {margin} must be in (0, 1]")));
        }
        if self.render.upper_body_split > LANDMARK_COUNT {
            return Err(ConfigError::Invalid(format!(
                "upper_body_split {} beyond {LANDMARK_COUNT} landmarks",
                self.render.upper_body_split
            )));
        }
        if self.render.surface_width == 0 || self.render.surface_height == 0 {
            return Err(ConfigError::Invalid("empty drawing surface".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub frames_per_second: u32,
    pub min_frames_per_second: u32,
    pub max_frames_per_second: u32,
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let PlaybackConfig {
            frames_per_second,
            min_frames_per_second,
            max_frames_per_second,
        } = *self;
        if min_frames_per_second == 0 || min_frames_per_second > max_frames_per_second {
            return Err(ConfigError::Invalid(format!(
                "frame rate range {min_frames_per_second}..={max_frames_per_second}"
            )));
        }
        if !(min_frames_per_second..=max_frames_per_second).contains(&frames_per_second) {
            return Err(ConfigError::Invalid(format!(
                "frames_per_second {frames_per_second} outside {min_frames_per_second}..={max_frames_per_second}"
            )));
        }
        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 10,
            min_frames_per_second: 1,
            max_frames_per_second: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Share of the surface the figure's bounding box may fill
    pub fit_margin: f32,
    /// Landmarks below this index are drawn in the upper-body color
    pub upper_body_split: usize,
    pub surface_width: u32,
    pub surface_height: u32,
    pub joint_marker_size: f32,
    pub bone_stroke: f32,
    pub head_radius: f32,
    pub marker_radius: f32,
    pub colors: ColorTable,
    pub thickness: ThicknessTable,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fit_margin: 0.7,
            upper_body_split: 23,
            surface_width: 800,
            surface_height: 600,
            joint_marker_size: 5.0,
            bone_stroke: 3.0,
            head_radius: 0.12,
            marker_radius: 0.035,
            colors: ColorTable::default(),
            thickness: ThicknessTable::default(),
        }
    }
}

/// RGBA colors, components in 0..=1
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorTable {
    pub background: [f32; 4],
    pub bone: [f32; 4],
    pub upper_joint: [f32; 4],
    pub lower_joint: [f32; 4],
    pub text: [f32; 4],
    pub seed_label: [f32; 4],
    pub generated_label: [f32; 4],
    pub head: [f32; 4],
    pub marker: [f32; 4],
    pub ground: [f32; 4],
    pub grid: [f32; 4],
}

impl Default for ColorTable {
    fn default() -> Self {
        Self {
            background: [0.06, 0.07, 0.12, 1.0],
            bone: [0.0, 0.85, 1.0, 1.0],
            upper_joint: [1.0, 0.42, 0.42, 1.0],
            lower_joint: [0.3, 0.8, 0.77, 1.0],
            text: [1.0, 1.0, 1.0, 1.0],
            seed_label: [0.3, 0.9, 0.4, 1.0],
            generated_label: [1.0, 0.6, 0.1, 1.0],
            head: [0.88, 0.67, 0.41, 1.0],
            marker: [0.95, 0.95, 0.95, 1.0],
            ground: [0.18, 0.2, 0.26, 1.0],
            grid: [0.35, 0.38, 0.45, 1.0],
        }
    }
}

impl ColorTable {
    pub fn rgba8(color: [f32; 4]) -> [u8; 4] {
        color.map(|component| (component.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Cylinder radius per bone category in the spatial mesh
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ThicknessTable {
    pub torso: f32,
    pub upper_arm: f32,
    pub forearm: f32,
    pub thigh: f32,
    pub shin: f32,
    pub foot: f32,
}

impl Default for ThicknessTable {
    fn default() -> Self {
        Self {
            torso: 0.06,
            upper_arm: 0.04,
            forearm: 0.03,
            thigh: 0.05,
            shin: 0.04,
            foot: 0.032,
        }
    }
}

impl ThicknessTable {
    /// `None` for categories that are left out of the mesh
    pub fn radius(&self, category: BoneCategory) -> Option<f32> {
        match category {
            BoneCategory::Torso => Some(self.torso),
            BoneCategory::UpperArm => Some(self.upper_arm),
            BoneCategory::Forearm => Some(self.forearm),
            BoneCategory::Thigh => Some(self.thigh),
            BoneCategory::Shin => Some(self.shin),
            BoneCategory::Foot => Some(self.foot),
            BoneCategory::Face | BoneCategory::Hand => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 960,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_defaults_are_valid() {
        let config = PlayerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.playback.frames_per_second, 10);
        assert_eq!(config.render.fit_margin, 0.7);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlayerConfig::from_json(
            r#"{ "playback": { "frames_per_second": 24 }, "render": { "fit_margin": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.playback.frames_per_second, 24);
        assert_eq!(config.playback.max_frames_per_second, 30);
        assert_eq!(config.render.fit_margin, 0.5);
        assert_eq!(config.render.upper_body_split, 23);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            PlayerConfig::from_json(r#"{ "playback": { "frames_per_second": 60 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            PlayerConfig::from_json(r#"{ "render": { "fit_margin": 1.5 } }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_torso_thickest_forearm_thinnest() {
        let table = ThicknessTable::default();
        let radii: Vec<f32> = BoneCategory::iter().filter_map(|c| table.radius(c)).collect();
        let max = radii.iter().copied().fold(f32::MIN, f32::max);
        let min = radii.iter().copied().fold(f32::MAX, f32::min);
        assert_eq!(max, table.torso);
        assert_eq!(min, table.forearm);
    }

    #[test]
    fn test_rgba8() {
        assert_eq!(ColorTable::rgba8([1.0, 0.0, 0.5, 2.0]), [255, 0, 128, 255]);
    }
}
