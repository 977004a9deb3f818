use strum::{Display, EnumIter, EnumString};

use crate::wgpu::Wgpu;

pub mod application;
pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod figure;
pub mod mesh;
pub mod playback;
pub mod projection;
pub mod rig;
pub mod scene;
pub mod sequence;
pub mod session;
pub mod skeleton;
pub mod wgpu;

/// The two ways a frame can be shown in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum View {
    /// Flat line figure fitted to a raster
    Line,
    /// Lit cylinders and spheres in a 3D scene
    #[default]
    Mesh,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Line => View::Mesh,
            View::Mesh => View::Line,
        }
    }
}

#[derive(Debug)]
pub enum PlayerEvent {
    ContextCreated(Wgpu),
    ContextFailed(String),
}

pub type Radio = winit::event_loop::EventLoopProxy<PlayerEvent>;

impl PlayerEvent {
    pub fn send(self, radio: &Radio) {
        if radio.send_event(self).is_err() {
            log::warn!("Event loop closed before the event arrived");
        }
    }
}
