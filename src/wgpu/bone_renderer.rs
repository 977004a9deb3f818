use std::mem::size_of;

use bytemuck::cast_slice;
use wgpu::PipelineCompilationOptions;

use crate::mesh::BoneInstance;
use crate::skeleton::landmark::BONES;
use crate::wgpu::{default_depth_stencil_state, vertex_layout_f32x8, Wgpu, DEFAULT_PRIMITIVE_STATE};

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    3 => Float32x3, // midpoint
    4 => Float32,   // length
    5 => Float32x4, // rotation
    6 => Float32x4, // color
    7 => Float32    // radius
];

/// Draws every bone as a unit cylinder scaled, turned and placed per instance.
pub struct BoneRenderer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    render_pipeline: wgpu::RenderPipeline,
    num_indices: u32,
    num_instances: u32,
}

impl BoneRenderer {
    pub fn new(wgpu: &Wgpu) -> Self {
        let (vertex_buffer, index_buffer, num_indices) = wgpu.create_cylinder();
        let instance_buffer = wgpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Bone Instance Buffer"),
            size: (size_of::<BoneInstance>() * BONES.len()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let pipeline_layout = wgpu.create_pipeline_layout("Bone Pipeline Layout", &[]);
        let render_pipeline = wgpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Bone Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    compilation_options: PipelineCompilationOptions::default(),
                    module: &wgpu.shader,
                    entry_point: Some("bone_vertex"),
                    buffers: &[
                        vertex_layout_f32x8(),
                        wgpu::VertexBufferLayout {
                            array_stride: size_of::<BoneInstance>() as wgpu::BufferAddress,
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
                cache: None,
            });
        Self {
            vertex_buffer,
            index_buffer,
            instance_buffer,
            render_pipeline,
            num_indices,
            num_instances: 0,
        }
    }

    pub fn update(&mut self, wgpu: &Wgpu, instances: &[BoneInstance]) {
        let instances = &instances[..instances.len().min(BONES.len())];
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
