//! GPU copies of a point cloud.

use wgpu::util::DeviceExt;

use crate::galaxy::PointCloud;

/// Vertex buffers for one generated cloud.
///
/// Positions and colors live in separate buffers so a recolor only re-uploads
/// the color half. Buffers are released with [`dispose`](Self::dispose) when
/// the cloud is replaced, not left to be reclaimed whenever the handles drop.
pub struct CloudBuffers {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    count: u32,
}

impl CloudBuffers {
    /// Upload `cloud`. Returns `None` for an empty cloud, which has nothing to draw.
    pub fn new(device: &wgpu::Device, cloud: &PointCloud) -> Option<Self> {
        if cloud.is_empty() {
            return None;
        }

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Positions"),
            contents: bytemuck::cast_slice(cloud.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Galaxy Colors"),
            contents: bytemuck::cast_slice(cloud.colors()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Some(Self {
            positions,
            colors,
            count: cloud.len() as u32,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Overwrite the color buffer with the cloud's current colors.
    pub fn upload_colors(&self, queue: &wgpu::Queue, cloud: &PointCloud) {
        queue.write_buffer(&self.colors, 0, bytemuck::cast_slice(cloud.colors()));
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.colors.slice(..));
    }

    /// Free the GPU memory now.
    pub fn dispose(self) {
        self.positions.destroy();
        self.colors.destroy();
    }
}

/// Layouts for the two per-instance vertex streams.
pub(crate) fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 2] {
    const POSITION: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    const COLOR: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &POSITION,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &COLOR,
        },
    ]
}
