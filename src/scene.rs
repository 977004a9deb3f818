use ab_glyph::FontArc;
use glam::Vec3;
use image::RgbaImage;
use log::info;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::figure::LineFigureRenderer;
use crate::mesh::SceneMesh;
use crate::projection::{Projection, WorldSpace};
use crate::session::FrameSnapshot;
use crate::wgpu::bone_renderer::BoneRenderer;
use crate::wgpu::ground_renderer::GroundRenderer;
use crate::wgpu::joint_renderer::JointRenderer;
use crate::wgpu::raster_renderer::RasterRenderer;
use crate::wgpu::text_renderer::TextRenderer;
use crate::wgpu::Wgpu;
use crate::View;

/// Owns the GPU context and every renderer, and turns snapshots into pixels.
pub struct Scene {
    wgpu: Wgpu,
    camera: Camera,
    view: View,
    render_config: RenderConfig,
    bone_renderer: BoneRenderer,
    joint_renderer: JointRenderer,
    ground_renderer: GroundRenderer,
    raster_renderer: RasterRenderer,
    text_renderer: TextRenderer,
    figure: LineFigureRenderer,
    canvas: RgbaImage,
    shown: Option<FrameSnapshot>,
}

impl Scene {
    pub fn new(
        wgpu: Wgpu,
        render_config: RenderConfig,
        font: FontArc,
        ground_level: f32,
        focus: Vec3,
        view: View,
    ) -> Self {
        let (width, height) = wgpu.size();
        let colors = render_config.colors.clone();
        let figure = LineFigureRenderer::new(render_config.clone(), font.clone());
        let canvas = figure.blank_surface();
        Self {
            camera: Camera::framing(focus, width as f32, height as f32),
            view,
            bone_renderer: BoneRenderer::new(&wgpu),
            joint_renderer: JointRenderer::new(&wgpu),
            ground_renderer: GroundRenderer::new(&wgpu, ground_level, colors.ground, colors.grid),
            raster_renderer: RasterRenderer::new(&wgpu, canvas.width(), canvas.height()),
            text_renderer: TextRenderer::new(&wgpu, font, colors, view),
            figure,
            canvas,
            render_config,
            shown: None,
            wgpu,
        }
    }

    pub fn shown_frame(&self) -> Option<&FrameSnapshot> {
        self.shown.as_ref()
    }

    /// Prepare the GPU side of the active view for this snapshot. The camera stays where the user left it.
    pub fn show(&mut self, snapshot: FrameSnapshot) {
        match self.view {
            View::Mesh => {
                let world = WorldSpace.project(&snapshot.skeleton);
                let mesh = SceneMesh::build(&world, &self.render_config);
                self.bone_renderer.update(&self.wgpu, &mesh.bones);
                self.joint_renderer.update(&self.wgpu, &mesh.joints);
                self.text_renderer.show(&snapshot);
            }
            View::Line => {
                self.figure.draw(&mut self.canvas, &snapshot);
                self.raster_renderer.update(&self.wgpu, &self.canvas);
            }
        }
        self.shown = Some(snapshot);
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.next();
        info!("Switched to {} view", self.view);
        self.text_renderer.set_view(self.view);
        if let Some(snapshot) = self.shown.take() {
            self.show(snapshot);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.wgpu.resize((width, height));
        let (width, height) = self.wgpu.size();
        self.camera.set_size(width as f32, height as f32);
        self.raster_renderer.resize(&self.wgpu);
        self.text_renderer.resize(&self.wgpu);
        if let Some(snapshot) = &self.shown {
            self.text_renderer.show(snapshot);
        }
    }

    /// Camera input only matters in the spatial view.
    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) {
        if self.view == View::Mesh {
            self.camera.mouse_input(state, button);
        }
    }

    /// Returns true when a repaint is needed.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> bool {
        self.view == View::Mesh && self.camera.cursor_moved(position)
    }

    pub fn mouse_wheel(&mut self, delta: MouseScrollDelta) -> bool {
        self.view == View::Mesh && self.camera.mouse_wheel(delta)
    }

    pub fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface_texture = self.wgpu.get_surface_texture()?;
        let texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.wgpu.create_depth_view();
        self.wgpu.update_mvp_matrix(self.camera.mvp_matrix());
        if self.view == View::Mesh {
            self.text_renderer.prepare(&self.wgpu);
        }
        let [r, g, b, a] = self.render_config.colors.background.map(f64::from);
        let mut encoder = self.wgpu.create_encoder();
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &texture_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            self.wgpu.set_bind_group(&mut render_pass);
            match self.view {
                View::Mesh => {
                    self.bone_renderer.render(&mut render_pass);
                    self.joint_renderer.render(&mut render_pass);
                    self.ground_renderer.render(&mut render_pass);
                    self.text_renderer.draw(&mut render_pass);
                }
                View::Line => {
                    self.raster_renderer.render(&mut render_pass);
                }
            }
        }
        self.wgpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}
