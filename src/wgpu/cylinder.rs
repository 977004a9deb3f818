use std::f32::consts::PI;

use crate::wgpu::{MeshVertex, Wgpu};

const SEGMENT_COUNT: usize = 12;

/// Unit cylinder along +Y: radius 1, height 1, centered on the origin.
pub fn cylinder_mesh(segment_count: usize) -> (Vec<MeshVertex>, Vec<u32>) {
    let segment_count = segment_count.max(3);
    let half_height = 0.5;
    let mut vertices = Vec::with_capacity((segment_count + 1) * 4 + 2);
    let mut indices = Vec::with_capacity(segment_count * 12);

    for i in 0..=segment_count {
        let fraction = i as f32 / segment_count as f32;
        let angle = fraction * 2.0 * PI;
        let (z, x) = angle.sin_cos();
        let side_normal = [x, 0.0, z];
        let cap_uv = [0.5 + 0.5 * x, 0.5 + 0.5 * z];
        vertices.extend([
            MeshVertex {
                position: [x, half_height, z],
                normal: side_normal,
                uv: [fraction, 0.0],
            },
            MeshVertex {
                position: [x, -half_height, z],
                normal: side_normal,
                uv: [fraction, 1.0],
            },
            MeshVertex {
                position: [x, half_height, z],
                normal: [0.0, 1.0, 0.0],
                uv: cap_uv,
            },
            MeshVertex {
                position: [x, -half_height, z],
                normal: [0.0, -1.0, 0.0],
                uv: cap_uv,
            },
        ]);
    }
    let top_center = vertices.len() as u32;
    vertices.push(MeshVertex {
        position: [0.0, half_height, 0.0],
        normal: [0.0, 1.0, 0.0],
        uv: [0.5, 0.5],
    });
    let bottom_center = top_center + 1;
    vertices.push(MeshVertex {
        position: [0.0, -half_height, 0.0],
        normal: [0.0, -1.0, 0.0],
        uv: [0.5, 0.5],
    });

    for i in 0..segment_count as u32 {
        // four vertices per ring step: side top, side bottom, cap top, cap bottom
        let base = i * 4;
        indices.extend([
            base,
            base + 4,
            base + 1,
            base + 1,
            base + 4,
            base + 5,
            base + 2,
            top_center,
            base + 6,
            base + 7,
            bottom_center,
            base + 3,
        ]);
    }
    (vertices, indices)
}

impl Wgpu {
    pub fn create_cylinder(&self) -> (wgpu::Buffer, wgpu::Buffer, u32) {
        let (vertices, indices) = cylinder_mesh(SEGMENT_COUNT);
        self.create_mesh_buffers("Cylinder", &vertices, &indices)
    }
}
