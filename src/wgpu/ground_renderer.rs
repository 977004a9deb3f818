use bytemuck::{cast_slice, Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::RenderPass;

use crate::wgpu::{default_depth_stencil_state, Wgpu, DEFAULT_PRIMITIVE_STATE};

const HALF_EXTENT: f32 = 3.0;
const GRID_SPACING: f32 = 0.25;
const GRID_LIFT: f32 = 0.001;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Default)]
pub struct GroundVertex {
    position: [f32; 4],
    color: [f32; 4],
}

impl GroundVertex {
    fn at(x: f32, y: f32, z: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y, z, 1.0],
            color,
        }
    }

    /// Two triangles covering a square centered under the origin.
    pub fn plane(level: f32, half_extent: f32, color: [f32; 4]) -> [GroundVertex; 6] {
        let corner = |x: f32, z: f32| Self::at(x * half_extent, level, z * half_extent, color);
        let (a, b, c, d) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));
        [a, c, b, a, d, c]
    }

    /// Line pairs in both directions, lifted slightly off the plane.
    pub fn grid(level: f32, half_extent: f32, spacing: f32, color: [f32; 4]) -> Vec<GroundVertex> {
        let y = level + GRID_LIFT;
        let steps = (half_extent / spacing).floor() as i32;
        (-steps..=steps)
            .map(|step| step as f32 * spacing)
            .flat_map(|offset| {
                [
                    Self::at(offset, y, -half_extent, color),
                    Self::at(offset, y, half_extent, color),
                    Self::at(-half_extent, y, offset, color),
                    Self::at(half_extent, y, offset, color),
                ]
            })
            .collect()
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<GroundVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

struct Drawing {
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Static floor under the figure: a translucent plane and a grid, built once.
pub struct GroundRenderer {
    plane: Drawing,
    grid: Drawing,
}

impl GroundRenderer {
    pub fn new(wgpu: &Wgpu, level: f32, plane_color: [f32; 4], grid_color: [f32; 4]) -> Self {
        let plane = GroundVertex::plane(level, HALF_EXTENT, plane_color);
        let grid = GroundVertex::grid(level, HALF_EXTENT, GRID_SPACING, grid_color);
        Self {
            plane: Self::drawing(wgpu, "Ground Plane", &plane, wgpu::PrimitiveTopology::TriangleList),
            grid: Self::drawing(wgpu, "Ground Grid", &grid, wgpu::PrimitiveTopology::LineList),
        }
    }

    fn drawing(
        wgpu: &Wgpu,
        label: &str,
        vertices: &[GroundVertex],
        topology: wgpu::PrimitiveTopology,
    ) -> Drawing {
        let pipeline_layout = wgpu.create_pipeline_layout(label, &[]);
        let pipeline = wgpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &wgpu.shader,
                    entry_point: Some("ground_vertex"),
                    compilation_options: Default::default(),
                    buffers: &[GroundVertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &wgpu.shader,
                    entry_point: Some("ground_fragment"),
                    compilation_options: Default::default(),
                    targets: &[wgpu.color_target(wgpu::BlendState::ALPHA_BLENDING)],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    ..DEFAULT_PRIMITIVE_STATE
                },
                depth_stencil: Some(default_depth_stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });
        let buffer = wgpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Drawing {
            pipeline,
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    pub fn render(&self, render_pass: &mut RenderPass) {
        for drawing in [&self.grid, &self.plane] {
            render_pass.set_pipeline(&drawing.pipeline);
            render_pass.set_vertex_buffer(0, drawing.buffer.slice(..));
            render_pass.draw(0..drawing.vertex_count, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_sits_at_level() {
        let plane = GroundVertex::plane(-0.9, 2.0, [1.0; 4]);
        assert!(plane.iter().all(|vertex| vertex.position[1] == -0.9));
        let xs: Vec<f32> = plane.iter().map(|vertex| vertex.position[0]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 2.0);
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -2.0);
    }

    #[test]
    fn test_grid_lines() {
        let grid = GroundVertex::grid(0.0, 1.0, 0.5, [1.0; 4]);
        // five offsets, two lines each, two vertices per line
        assert_eq!(grid.len(), 5 * 2 * 2);
        assert!(grid.iter().all(|vertex| vertex.position[1] > 0.0));
    }
}
