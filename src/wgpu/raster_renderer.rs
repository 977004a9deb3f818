use bytemuck::{cast_slice, Pod, Zeroable};
use image::RgbaImage;
use wgpu::util::DeviceExt;
use wgpu::RenderPass;

use crate::wgpu::{Wgpu, DEFAULT_PRIMITIVE_STATE};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RasterVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

impl RasterVertex {
    /// A centered quad in clip space covering `scale` of each axis.
    pub fn quad(scale: [f32; 2]) -> [RasterVertex; 6] {
        let [sx, sy] = scale;
        let corner = |x: f32, y: f32| RasterVertex {
            position: [x * sx, y * sy],
            uv: [(x + 1.0) / 2.0, (1.0 - y) / 2.0],
        };
        let (a, b, c, d) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));
        [a, b, c, a, c, d]
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<RasterVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Fraction of the window each axis of the image may cover while keeping its aspect ratio.
pub fn letterbox(image: (u32, u32), window: (u32, u32)) -> [f32; 2] {
    let image_aspect = image.0.max(1) as f32 / image.1.max(1) as f32;
    let window_aspect = window.0.max(1) as f32 / window.1.max(1) as f32;
    if window_aspect > image_aspect {
        [image_aspect / window_aspect, 1.0]
    } else {
        [1.0, window_aspect / image_aspect]
    }
}

/// Shows the line figure raster as a textured quad filling the window.
pub struct RasterRenderer {
    texture: wgpu::Texture,
    texture_size: wgpu::Extent3d,
    texture_bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
}

impl RasterRenderer {
    pub fn new(wgpu: &Wgpu, width: u32, height: u32) -> Self {
        let texture_size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = wgpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Figure Texture"),
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = wgpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Figure Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        let texture_bind_group_layout =
            wgpu.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Figure Texture Bind Group Layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });
        let texture_bind_group = wgpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("Figure Texture Bind Group"),
        });
        let pipeline_layout =
            wgpu.create_pipeline_layout("Figure Pipeline Layout", &[&texture_bind_group_layout]);
        let pipeline = wgpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Figure Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &wgpu.shader,
                    entry_point: Some("raster_vertex"),
                    compilation_options: Default::default(),
                    buffers: &[RasterVertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &wgpu.shader,
                    entry_point: Some("raster_fragment"),
                    compilation_options: Default::default(),
                    targets: &[wgpu.color_target(wgpu::BlendState::REPLACE)],
                }),
                primitive: DEFAULT_PRIMITIVE_STATE,
                depth_stencil: Some(wgpu::DepthStencilState {
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::Always,
                    ..crate::wgpu::default_depth_stencil_state()
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });
        let quad = RasterVertex::quad(letterbox((width, height), wgpu.size()));
        let quad_buffer = wgpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Figure Quad"),
                contents: cast_slice(&quad),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        Self {
            texture,
            texture_size,
            texture_bind_group,
            pipeline,
            quad_buffer,
        }
    }

    /// Upload a freshly drawn figure. Images of another size are ignored.
    pub fn update(&self, wgpu: &Wgpu, image: &RgbaImage) {
        if image.dimensions() != (self.texture_size.width, self.texture_size.height) {
            log::warn!("Figure raster size {:?} does not match texture", image.dimensions());
            return;
        }
        wgpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.texture_size.width),
                rows_per_image: Some(self.texture_size.height),
            },
            self.texture_size,
        );
    }

    pub fn resize(&self, wgpu: &Wgpu) {
        let image = (self.texture_size.width, self.texture_size.height);
        let quad = RasterVertex::quad(letterbox(image, wgpu.size()));
        wgpu.queue
            .write_buffer(&self.quad_buffer, 0, cast_slice(&quad));
    }

    pub fn render(&self, render_pass: &mut RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        render_pass.draw(0..6, 0..1);
    }
}
