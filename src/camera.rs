use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec3};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

const ROTATE_SPEED: f32 = 0.008;
const PAN_SPEED: f32 = 0.0015;
const ZOOM_STEP: f32 = 0.1;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;
const FRAMING_OFFSET: Vec3 = Vec3::new(0.8, 0.4, 2.6);
// keeps the gaze away from the poles so the up vector stays usable
const MAX_ELEVATION_DOT: f32 = 0.98;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Rotate,
    Pan,
}

/// Orbit camera: left drag rotates, right drag pans, the wheel zooms.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    moving_mouse: PhysicalPosition<f64>,
    drag: Option<(Drag, PhysicalPosition<f64>)>,
}

impl Camera {
    pub fn new(position: Vec3, look_at: Vec3, width: f32, height: f32) -> Self {
        Self {
            position,
            look_at,
            up: Vec3::Y,
            aspect: width / height.max(1.0),
            moving_mouse: PhysicalPosition::new(0.0, 0.0),
            drag: None,
        }
    }

    /// Looking at `focus` from slightly above and to the side. Only user input moves it afterwards.
    pub fn framing(focus: Vec3, width: f32, height: f32) -> Self {
        Self::new(focus + FRAMING_OFFSET, focus, width, height)
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1.0);
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        self.drag = match (state, button) {
            (ElementState::Pressed, MouseButton::Left) => Some((Drag::Rotate, self.moving_mouse)),
            (ElementState::Pressed, MouseButton::Right) => Some((Drag::Pan, self.moving_mouse)),
            (ElementState::Released, _) => None,
            (ElementState::Pressed, _) => self.drag,
        };
    }

    /// Returns true when the view changed.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> bool {
        self.moving_mouse = position;
        let Some((drag, pressed)) = self.drag else {
            return false;
        };
        let dx = (position.x - pressed.x) as f32;
        let dy = (position.y - pressed.y) as f32;
        match drag {
            Drag::Rotate => self.rotate(-dx * ROTATE_SPEED, dy * ROTATE_SPEED),
            Drag::Pan => self.pan(dx, dy),
        }
        self.drag = Some((drag, position));
        true
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) -> bool {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / 40.0,
        };
        if notches == 0.0 {
            return false;
        }
        self.zoom((1.0 - ZOOM_STEP).powf(notches));
        true
    }

    /// Orbit around the look-at point: yaw about `up`, pitch about the horizontal axis.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.look_at;
        let yawed = Quat::from_axis_angle(self.up, yaw) * offset;
        let Some(right) = self.up.cross(yawed).try_normalize() else {
            self.position = self.look_at + yawed;
            return;
        };
        let pitched = Quat::from_axis_angle(right, pitch.clamp(-PI / 4.0, PI / 4.0)) * yawed;
        let elevation = pitched.normalize_or_zero().dot(self.up).abs();
        self.position = self.look_at + if elevation < MAX_ELEVATION_DOT { pitched } else { yawed };
    }

    /// Slide camera and look-at point together across the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let gaze = self.look_at - self.position;
        let Some(right) = gaze.cross(self.up).try_normalize() else {
            return;
        };
        let screen_up = right.cross(gaze).normalize_or_zero();
        let scale = gaze.length() * PAN_SPEED;
        let shift = (-right * dx + screen_up * dy) * scale;
        self.position += shift;
        self.look_at += shift;
    }

    /// Scale the distance to the look-at point, within limits.
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.look_at;
        let distance = (offset.length() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.position = self.look_at + offset.normalize_or(Vec3::Z) * distance;
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.look_at)
    }

    pub fn mvp_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, self.up)
    }

    fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(2.0 * PI / 5.0, self.aspect, 0.05, 100.0)
    }
}
