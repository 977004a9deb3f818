use ab_glyph::FontArc;
use log::warn;
use wgpu::RenderPass;
use wgpu_text::{BrushBuilder, TextBrush};

use crate::config::ColorTable;
use crate::session::FrameSnapshot;
use crate::wgpu::text_state::TextState;
use crate::wgpu::Wgpu;
use crate::View;

pub struct TextRenderer {
    text_state: TextState,
    brush: TextBrush<FontArc>,
}

impl TextRenderer {
    pub fn new(wgpu: &Wgpu, font: FontArc, colors: ColorTable, view: View) -> Self {
        let (width, height) = wgpu.size();
        let brush = BrushBuilder::using_font(font)
            .with_depth_stencil(Some(wgpu::DepthStencilState {
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                ..crate::wgpu::default_depth_stencil_state()
            }))
            .build(
                &wgpu.device,
                width,
                height,
                wgpu.surface_configuration.format,
            );
        let text_state = TextState::new(width, height, colors, view);
        TextRenderer { brush, text_state }
    }

    pub fn show(&mut self, snapshot: &FrameSnapshot) {
        self.text_state.show(snapshot);
    }

    pub fn set_view(&mut self, view: View) {
        self.text_state.set_view(view);
    }

    pub fn resize(&mut self, wgpu: &Wgpu) {
        let (width, height) = wgpu.size();
        self.text_state.set_size(width, height);
        self.brush.resize_view(width as f32, height as f32, &wgpu.queue);
    }

    /// Lay out the current text. Must run before the render pass that draws it.
    pub fn prepare(&mut self, wgpu: &Wgpu) {
        if let Err(error) = self.brush.queue(&wgpu.device, &wgpu.queue, self.text_state.sections()) {
            warn!("Text not queued: {error}");
        }
    }

    pub fn draw<'a>(&'a self, render_pass: &mut RenderPass<'a>) {
        self.brush.draw(render_pass);
    }
}
