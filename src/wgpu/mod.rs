use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use bytemuck::{cast_slice, Pod, Zeroable};
use glam::Mat4;
use log::info;
use wgpu::util::DeviceExt;
use wgpu::MemoryHints::Performance;
use wgpu::{DepthStencilState, RenderPass, ShaderModule};
use winit::window::Window;

use crate::error::RenderError;
use crate::{PlayerEvent, Radio};

pub mod bone_renderer;
pub mod cylinder;
pub mod ground_renderer;
pub mod joint_renderer;
pub use joint_renderer::create_sphere;
pub mod raster_renderer;
pub mod text_renderer;
pub mod text_state;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub const DEFAULT_PRIMITIVE_STATE: wgpu::PrimitiveState = wgpu::PrimitiveState {
    topology: wgpu::PrimitiveTopology::TriangleList,
    strip_index_format: None,
    front_face: wgpu::FrontFace::Ccw,
    cull_mode: None,
    unclipped_depth: false,
    polygon_mode: wgpu::PolygonMode::Fill,
    conservative: false,
};

pub fn default_depth_stencil_state() -> DepthStencilState {
    DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Layout of mesh vertices: position[3], normal[3], uv[2]
pub fn vertex_layout_f32x8() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: size_of::<[f32; 8]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

pub struct Wgpu {
    surface: wgpu::Surface<'static>,
    pub surface_configuration: wgpu::SurfaceConfiguration,
    uniform_buffer: wgpu::Buffer,
    pub shader: ShaderModule,
    pub queue: wgpu::Queue,
    pub device: wgpu::Device,
    pub uniform_bind_group_layout: wgpu::BindGroupLayout,
    pub uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
}

impl Debug for Wgpu {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Wgpu")
    }
}

impl Wgpu {
    pub async fn new_async(window: Arc<Window>) -> Result<Wgpu, RenderError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(Arc::clone(&window))
            .map_err(RenderError::Surface)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .map_err(RenderError::Adapter)?;
        info!("Adapter {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Player Device"),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Performance,
                ..Default::default()
            })
            .await
            .map_err(RenderError::Device)?;
        let size = window.inner_size();
        let surface_configuration = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or(RenderError::Unsupported)?;
        surface.configure(&device, &surface_configuration);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MVP"),
            contents: cast_slice(&[0.0f32; 16]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Uniform Bind Group"),
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let depth_texture = create_depth_texture(&device, &surface_configuration);
        Ok(Self {
            surface,
            surface_configuration,
            device,
            queue,
            uniform_bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
            shader,
            depth_texture,
        })
    }

    pub fn create_and_send(window: Arc<Window>, radio: Radio) {
        match futures::executor::block_on(Self::new_async(window)) {
            Ok(wgpu) => PlayerEvent::ContextCreated(wgpu).send(&radio),
            Err(error) => PlayerEvent::ContextFailed(error.to_string()).send(&radio),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (
            self.surface_configuration.width,
            self.surface_configuration.height,
        )
    }

    pub fn resize(&mut self, new_size: (u32, u32)) {
        let (width, height) = new_size;
        self.surface_configuration.width = width.max(1);
        self.surface_configuration.height = height.max(1);
        self.surface
            .configure(&self.device, &self.surface_configuration);
        self.depth_texture = create_depth_texture(&self.device, &self.surface_configuration);
    }

    pub fn get_surface_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            })
    }

    pub fn create_depth_view(&self) -> wgpu::TextureView {
        self.depth_texture
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn update_mvp_matrix(&self, matrix: Mat4) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, cast_slice(&matrix.to_cols_array()));
    }

    pub fn set_bind_group(&self, render_pass: &mut RenderPass) {
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
    }

    /// Pipeline layout with the MVP uniform at group 0 and optional extra groups after it.
    pub fn create_pipeline_layout(
        &self,
        label: &str,
        extra: &[&wgpu::BindGroupLayout],
    ) -> wgpu::PipelineLayout {
        let mut bind_group_layouts = vec![&self.uniform_bind_group_layout];
        bind_group_layouts.extend_from_slice(extra);
        self.device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &bind_group_layouts,
                immediate_size: 0,
            })
    }

    /// Upload an indexed mesh, returning vertex buffer, index buffer and index count.
    pub fn create_mesh_buffers(
        &self,
        label: &str,
        vertices: &[MeshVertex],
        indices: &[u32],
    ) -> (wgpu::Buffer, wgpu::Buffer, u32) {
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        (vertex_buffer, index_buffer, indices.len() as u32)
    }

    pub fn color_target(&self, blend: wgpu::BlendState) -> Option<wgpu::ColorTargetState> {
        Some(wgpu::ColorTargetState {
            format: self.surface_configuration.format,
            blend: Some(blend),
            write_mask: wgpu::ColorWrites::ALL,
        })
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    configuration: &wgpu::SurfaceConfiguration,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: configuration.width,
            height: configuration.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    })
}
