use std::sync::Arc;
use std::time::Duration;

use ab_glyph::FontArc;
use glam::Vec3;
use instant::Instant;
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::RenderConfig;
use crate::mesh::{ground_level, sequence_focus};
use crate::scene::Scene;
use crate::session::PlaybackSession;
use crate::wgpu::Wgpu;
use crate::{PlayerEvent, Radio, View};

/// What a key press asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    TogglePlay,
    Reset,
    Faster,
    Slower,
    StepForward,
    StepBackward,
    SwitchView,
    Quit,
}

impl KeyAction {
    pub fn from_key(code: KeyCode) -> Option<Self> {
        use KeyAction::*;
        Some(match code {
            KeyCode::Space => TogglePlay,
            KeyCode::KeyR => Reset,
            KeyCode::ArrowUp => Faster,
            KeyCode::ArrowDown => Slower,
            KeyCode::ArrowRight => StepForward,
            KeyCode::ArrowLeft => StepBackward,
            KeyCode::Tab => SwitchView,
            KeyCode::Escape | KeyCode::KeyQ => Quit,
            _ => return None,
        })
    }
}

/// Apply a key action to the session. Returns false for the actions the session does not own.
pub fn apply_key_action(session: &mut PlaybackSession, action: KeyAction) -> bool {
    let scheduler = session.scheduler_mut();
    match action {
        KeyAction::TogglePlay => scheduler.toggle_play_pause(),
        KeyAction::Reset => scheduler.reset(),
        KeyAction::Faster => scheduler.faster(),
        KeyAction::Slower => scheduler.slower(),
        KeyAction::StepForward => scheduler.step_forward(),
        KeyAction::StepBackward => scheduler.step_backward(),
        KeyAction::SwitchView | KeyAction::Quit => return false,
    }
    true
}

pub struct Application {
    window_attributes: WindowAttributes,
    session: PlaybackSession,
    render_config: RenderConfig,
    font: FontArc,
    initial_view: View,
    ground_level: f32,
    focus: Vec3,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    radio: Radio,
    last_tick: Instant,
}

impl Application {
    pub fn new(
        window_attributes: WindowAttributes,
        session: PlaybackSession,
        render_config: RenderConfig,
        font: FontArc,
        initial_view: View,
        radio: Radio,
    ) -> Self {
        let ground_level = ground_level(session.sequence());
        let focus = sequence_focus(session.sequence());
        Self {
            window_attributes,
            session,
            render_config,
            font,
            initial_view,
            ground_level,
            focus,
            window: None,
            scene: None,
            radio,
            last_tick: Instant::now(),
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_key_event(&mut self, event_loop: &ActiveEventLoop, key_event: KeyEvent) {
        if !key_event.state.is_pressed() {
            return;
        }
        let PhysicalKey::Code(code) = key_event.physical_key else {
            return;
        };
        let Some(action) = KeyAction::from_key(code) else {
            return;
        };
        match action {
            KeyAction::Quit => self.quit(event_loop),
            KeyAction::SwitchView => {
                if let Some(scene) = &mut self.scene {
                    scene.toggle_view();
                }
            }
            _ => {
                apply_key_action(&mut self.session, action);
                self.show_current();
            }
        }
        self.request_redraw();
    }

    /// Push the current frame to the scene without advancing.
    fn show_current(&mut self) {
        if let (Some(scene), Some(snapshot)) = (&mut self.scene, self.session.snapshot()) {
            scene.show(snapshot);
        }
    }

    /// Stop playback first so nothing reads frames while the window goes away.
    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.session.stop();
        self.scene = None;
        event_loop.exit();
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.last_tick).as_secs_f64() * 1000.0;
        self.last_tick = now;
        let Some(scene) = &mut self.scene else {
            return;
        };
        let Some(snapshot) = self.session.tick(elapsed_ms) else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };
        let changed = scene.shown_frame().map_or(true, |shown| {
            shown.index != snapshot.index || shown.state.is_playing != snapshot.state.is_playing
        });
        if changed {
            scene.show(snapshot);
            self.request_redraw();
        }
        let scheduler = self.session.scheduler();
        if scheduler.wants_paint() {
            let state = scheduler.state();
            let remaining = (scheduler.frame_interval_ms() - state.since_advance_ms).max(1.0);
            event_loop.set_control_flow(ControlFlow::WaitUntil(
                now + Duration::from_secs_f64(remaining / 1000.0),
            ));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }

    fn redraw(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };
        match scene.redraw() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    scene.resize(size.width, size.height);
                }
            }
            Err(error) => warn!("Frame dropped: {error}"),
        }
    }
}

impl ApplicationHandler<PlayerEvent> for Application {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match event_loop.create_window(self.window_attributes.clone()) {
            Ok(window) => {
                let window = Arc::new(window);
                self.window = Some(window.clone());
                Wgpu::create_and_send(window, self.radio.clone());
            }
            Err(error) => {
                error!("Unable to create window: {error}");
                self.quit(event_loop);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: PlayerEvent) {
        match event {
            PlayerEvent::ContextCreated(wgpu) => {
                info!("Graphics ready");
                self.scene = Some(Scene::new(
                    wgpu,
                    self.render_config.clone(),
                    self.font.clone(),
                    self.ground_level,
                    self.focus,
                    self.initial_view,
                ));
                self.last_tick = Instant::now();
                self.show_current();
                self.request_redraw();
            }
            PlayerEvent::ContextFailed(reason) => {
                error!("{reason}");
                self.quit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let repaint = match event {
            WindowEvent::CloseRequested => {
                self.quit(event_loop);
                false
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                self.handle_key_event(event_loop, key_event);
                false
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                false
            }
            WindowEvent::Resized(size) => self.scene.as_mut().is_some_and(|scene| {
                scene.resize(size.width, size.height);
                true
            }),
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(scene) = &mut self.scene {
                    scene.mouse_input(state, button);
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => self
                .scene
                .as_mut()
                .is_some_and(|scene| scene.cursor_moved(position)),
            WindowEvent::MouseWheel { delta, .. } => self
                .scene
                .as_mut()
                .is_some_and(|scene| scene.mouse_wheel(delta)),
            _ => false,
        };
        if repaint {
            self.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_live() {
            self.tick(event_loop);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaybackConfig;

    fn session() -> PlaybackSession {
        let json = serde_json::json!({
            "seed_frames": 2, "generated_frames": 3, "total_frames": 5,
            "pose_dimension": 99, "poses": vec![vec![0.0; 99]; 5],
        })
        .to_string();
        PlaybackSession::from_json(&json, &PlaybackConfig::default()).unwrap()
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(KeyAction::from_key(KeyCode::Space), Some(KeyAction::TogglePlay));
        assert_eq!(KeyAction::from_key(KeyCode::Tab), Some(KeyAction::SwitchView));
        assert_eq!(KeyAction::from_key(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(KeyAction::from_key(KeyCode::KeyZ), None);
    }

    #[test]
    fn test_key_actions_drive_scheduler() {
        let mut session = session();
        assert!(apply_key_action(&mut session, KeyAction::TogglePlay));
        assert!(!session.scheduler().is_playing());
        apply_key_action(&mut session, KeyAction::StepBackward);
        assert_eq!(session.scheduler().current_frame(), 4);
        apply_key_action(&mut session, KeyAction::StepForward);
        apply_key_action(&mut session, KeyAction::StepForward);
        assert_eq!(session.scheduler().current_frame(), 1);
        apply_key_action(&mut session, KeyAction::Faster);
        assert_eq!(session.scheduler().frames_per_second(), 11);
        apply_key_action(&mut session, KeyAction::Reset);
        assert_eq!(session.scheduler().current_frame(), 0);
        assert!(!apply_key_action(&mut session, KeyAction::SwitchView));
    }
}
