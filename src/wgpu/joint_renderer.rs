use std::f32::consts::PI;
use std::mem::size_of;

use bytemuck::cast_slice;
use wgpu::PipelineCompilationOptions;

use crate::mesh::JointInstance;
use crate::skeleton::landmark::ARTICULATIONS;
use crate::wgpu::{
    default_depth_stencil_state, vertex_layout_f32x8, MeshVertex, Wgpu, DEFAULT_PRIMITIVE_STATE,
};

const SECTORS: u32 = 16;
const STACKS: u32 = 12;
// the head plus one marker per articulation
const MAX_INSTANCES: usize = ARTICULATIONS.len() + 1;

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    3 => Float32x3, // position
    4 => Float32,   // scale
    5 => Float32x4  // color
];

/// Draws the head sphere and the articulation markers.
pub struct JointRenderer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    render_pipeline: wgpu::RenderPipeline,
    num_indices: u32,
    num_instances: u32,
}

impl JointRenderer {
    pub fn new(wgpu: &Wgpu) -> Self {
        let (vertex_buffer, index_buffer, num_indices) = create_sphere(wgpu);
        let instance_buffer = wgpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Joint Instance Buffer"),
            size: (size_of::<JointInstance>() * MAX_INSTANCES) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pipeline_layout = wgpu.create_pipeline_layout("Joint Pipeline Layout", &[]);
        let render_pipeline = wgpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some("Joint Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    compilation_options: PipelineCompilationOptions::default(),
                    module: &wgpu.shader,
                    entry_point: Some("joint_vertex"),
                    buffers: &[
                        vertex_layout_f32x8(),
                        wgpu::VertexBufferLayout {
                            array_stride: size_of::<JointInstance>() as wgpu::BufferAddress,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &INSTANCE_ATTRIBUTES,
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    compilation_options: PipelineCompilationOptions::default(),
                    module: &wgpu.shader,
                    entry_point: Some("lit_fragment"),
                    targets: &[wgpu.color_target(wgpu::BlendState::REPLACE)],
                }),
                primitive: DEFAULT_PRIMITIVE_STATE,
                depth_stencil: Some(default_depth_stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
            });
        JointRenderer {
            vertex_buffer,
            index_buffer,
            instance_buffer,
            render_pipeline,
            num_indices,
            num_instances: 0,
        }
    }

    pub fn update(&mut self, wgpu: &Wgpu, instances: &[JointInstance]) {
        let instances = &instances[..instances.len().min(MAX_INSTANCES)];
        self.num_instances = instances.len() as u32;
        if !instances.is_empty() {
            wgpu.queue
                .write_buffer(&self.instance_buffer, 0, cast_slice(instances));
        }
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass) {
        if self.num_instances == 0 {
            return;
        }
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..self.num_instances);
    }
}

/// Unit sphere as stacks of latitude rings.
pub fn sphere_mesh(sectors: u32, stacks: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((sectors + 1) * (stacks + 1)) as usize);
    let mut indices = Vec::new();

    for i in 0..=stacks {
        let stack_angle = PI * i as f32 / stacks as f32;
        let (ring, y) = stack_angle.sin_cos();
        for j in 0..=sectors {
            let sector_angle = 2.0 * PI * j as f32 / sectors as f32;
            let (z, x) = sector_angle.sin_cos();
            let position = [ring * x, y, ring * z];
            vertices.push(MeshVertex {
                position,
                normal: position,
                uv: [j as f32 / sectors as f32, i as f32 / stacks as f32],
            });
        }
    }

    for i in 0..stacks {
        let k1 = i * (sectors + 1);
        let k2 = k1 + sectors + 1;
        for j in 0..sectors {
            if i != 0 {
                indices.extend([k1 + j, k2 + j, k1 + j + 1]);
            }
            if i != stacks - 1 {
                indices.extend([k1 + j + 1, k2 + j, k2 + j + 1]);
            }
        }
    }
    (vertices, indices)
}

pub fn create_sphere(wgpu: &Wgpu) -> (wgpu::Buffer, wgpu::Buffer, u32) {
    let (vertices, indices) = sphere_mesh(SECTORS, STACKS);
    wgpu.create_mesh_buffers("Sphere", &vertices, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_unit_surface() {
        let (vertices, indices) = sphere_mesh(SECTORS, STACKS);
        assert_eq!(vertices.len(), ((SECTORS + 1) * (STACKS + 1)) as usize);
        // the pole rows contribute one triangle per sector, the rest two
        assert_eq!(indices.len(), (SECTORS * (STACKS - 1) * 2 * 3) as usize);
        assert!(indices.iter().all(|&index| (index as usize) < vertices.len()));
        for vertex in vertices {
            let [x, y, z] = vertex.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
    }
}
