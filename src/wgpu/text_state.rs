use wgpu_text::glyph_brush::{
    BuiltInLineBreaker, HorizontalAlign, Layout, OwnedSection, OwnedText, VerticalAlign,
};

use crate::config::ColorTable;
use crate::sequence::Provenance;
use crate::session::FrameSnapshot;
use crate::View;

const MARGIN: f32 = 24.0;
const STATUS_SCALE: f32 = 28.0;
const LEGEND_SCALE: f32 = 18.0;
const LEGEND: &str = "Space play/pause   R reset   \u{2191}\u{2193} speed   \u{2190}\u{2192} step   Tab view   Esc quit";

#[derive(Clone, Debug, Copy)]
pub enum SectionName {
    Status = 0,
    Legend = 1,
}

impl SectionName {
    const fn count() -> usize {
        2
    }
}

/// The heads-up text over the spatial view: frame counter, provenance, speed and keys.
#[derive(Clone, Debug)]
pub struct TextState {
    width: f32,
    height: f32,
    colors: ColorTable,
    view: View,
    sections: [Option<OwnedSection>; SectionName::count()],
}

impl TextState {
    pub fn new(width: u32, height: u32, colors: ColorTable, view: View) -> Self {
        let mut fresh = Self {
            width: width as f32,
            height: height as f32,
            colors,
            view,
            sections: Default::default(),
        };
        fresh.update_legend();
        fresh
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
        self.update_legend();
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.update_legend();
    }

    pub fn show(&mut self, snapshot: &FrameSnapshot) {
        let label_color = match snapshot.provenance {
            Provenance::Seed => self.colors.seed_label,
            Provenance::Generated => self.colors.generated_label,
        };
        let mut speed = format!("{} fps", snapshot.state.frames_per_second);
        if !snapshot.state.is_playing {
            speed.push_str("  PAUSED");
        }
        let section = self
            .create_section(SectionName::Status)
            .add_text(self.text(format!("{}\n", snapshot.frame_text()), self.colors.text, STATUS_SCALE))
            .add_text(self.text(format!("{}\n", snapshot.provenance), label_color, STATUS_SCALE))
            .add_text(self.text(speed, self.colors.text, STATUS_SCALE));
        self.sections[SectionName::Status as usize] = Some(section);
    }

    pub fn sections(&self) -> Vec<&OwnedSection> {
        self.sections.iter().flatten().collect()
    }

    /// All text currently shown, for logging and tests.
    pub fn contents(&self) -> String {
        self.sections()
            .iter()
            .flat_map(|section| section.text.iter())
            .map(|text| text.text.as_str())
            .collect()
    }

    fn update_legend(&mut self) {
        let legend = format!("{} view   {LEGEND}", self.view);
        let section = self
            .create_section(SectionName::Legend)
            .add_text(self.text(legend, self.colors.text, LEGEND_SCALE));
        self.sections[SectionName::Legend as usize] = Some(section);
    }

    fn text(&self, text: String, color: [f32; 4], scale: f32) -> OwnedText {
        OwnedText::new(text).with_color(color).with_scale(scale)
    }

    fn create_section(&self, section_name: SectionName) -> OwnedSection {
        OwnedSection::default()
            .with_layout(Self::create_layout(section_name))
            .with_bounds([self.width, self.height])
            .with_screen_position(self.create_position(section_name))
    }

    fn create_layout(section_name: SectionName) -> Layout<BuiltInLineBreaker> {
        use SectionName::*;
        Layout::default()
            .v_align(match section_name {
                Status => VerticalAlign::Top,
                Legend => VerticalAlign::Bottom,
            })
            .h_align(match section_name {
                Status => HorizontalAlign::Left,
                Legend => HorizontalAlign::Center,
            })
    }

    fn create_position(&self, section_name: SectionName) -> [f32; 2] {
        use SectionName::*;
        match section_name {
            Status => [MARGIN, MARGIN],
            Legend => [self.width / 2.0, self.height - MARGIN],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::playback::PlaybackState;
    use crate::skeleton::landmark::LANDMARK_COUNT;
    use crate::skeleton::Skeleton;
    use glam::Vec3;

    fn snapshot(is_playing: bool) -> FrameSnapshot {
        FrameSnapshot {
            index: 4,
            total: 10,
            provenance: Provenance::Generated,
            state: PlaybackState {
                current_frame: 4,
                is_playing,
                frames_per_second: 12,
                since_advance_ms: 0.0,
            },
            skeleton: Skeleton::from_joints([Vec3::ZERO; LANDMARK_COUNT]),
        }
    }

    #[test]
    fn test_status_text() {
        let mut state = TextState::new(800, 600, RenderConfig::default().colors, View::Mesh);
        assert_eq!(state.sections().len(), 1);
        state.show(&snapshot(true));
        let contents = state.contents();
        assert!(contents.contains("Frame 5 / 10"));
        assert!(contents.contains("GENERATED"));
        assert!(contents.contains("12 fps"));
        assert!(!contents.contains("PAUSED"));
        state.show(&snapshot(false));
        assert!(state.contents().contains("PAUSED"));
    }

    #[test]
    fn test_legend_names_view() {
        let mut state = TextState::new(800, 600, RenderConfig::default().colors, View::Mesh);
        assert!(state.contents().starts_with("mesh view"));
        state.set_view(View::Line);
        assert!(state.contents().starts_with("line view"));
    }
}
