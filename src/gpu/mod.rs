//! GPU state: surface, point pipeline and the current cloud's buffers.

mod cloud;
#[cfg(feature = "egui")]
pub mod egui_integration;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use cloud::CloudBuffers;

use crate::camera::Camera;
use crate::error::GpuError;
use crate::shader::POINT_SHADER;
use crate::state::GalaxyState;

/// Upper bound on the device pixel ratio used for the render target.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct PointUniforms {
    view_proj: [[f32; 4]; 4],
    point_size: f32,
    aspect: f32,
    _padding: [f32; 2],
}

/// Render target size for a window: its logical size times the pixel ratio
/// capped at [`MAX_PIXEL_RATIO`]. Never zero.
pub fn render_size(physical: PhysicalSize<u32>, scale_factor: f64) -> PhysicalSize<u32> {
    let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    };
    let ratio = scale.min(MAX_PIXEL_RATIO) / scale;
    PhysicalSize::new(
        ((physical.width as f64 * ratio).round() as u32).max(1),
        ((physical.height as f64 * ratio).round() as u32).max(1),
    )
}

/// What [`GpuState::sync`] has to do to match the CPU cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncAction {
    /// Dispose the current buffers, then upload the whole cloud.
    Rebuild,
    /// Re-upload the color buffer only.
    UploadColors,
    Nothing,
}

/// Decide how to bring buffers holding `buffered` points (none for an empty
/// cloud) up to date with a cloud of `len` points.
///
/// A buffer whose length no longer matches is rebuilt even within one
/// generation, since a color upload cannot resize it.
pub(crate) fn sync_action(
    synced_generation: u64,
    generation: u64,
    buffered: Option<u32>,
    len: usize,
    colors_dirty: bool,
) -> SyncAction {
    let buffered_len = buffered.map_or(0, |count| count as usize);
    if synced_generation != generation || buffered_len != len {
        SyncAction::Rebuild
    } else if colors_dirty && buffered.is_some() {
        SyncAction::UploadColors
    } else {
        SyncAction::Nothing
    }
}

/// Describes the frame an [`Overlay`] draws into.
#[derive(Debug, Clone, Copy)]
pub struct ScreenInfo {
    /// Render target size in pixels.
    pub size_in_pixels: [u32; 2],
    /// Render target pixels per window physical pixel (below 1 when the pixel ratio is capped).
    pub render_scale: f32,
}

/// Something drawn on top of the galaxy in the same pass, such as the debug panel.
pub trait Overlay {
    /// Upload whatever the overlay needs before the pass begins.
    ///
    /// Returns extra command buffers to submit ahead of the frame.
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &ScreenInfo,
    ) -> Vec<wgpu::CommandBuffer>;

    /// Record draw calls into the galaxy's render pass.
    fn paint(&self, pass: &mut wgpu::RenderPass<'static>, screen: &ScreenInfo);

    /// Release per-frame resources after submission.
    fn finish(&mut self) {}
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cloud: Option<CloudBuffers>,
    synced_generation: u64,
    window_size: PhysicalSize<u32>,
}

impl GpuState {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let window_size = window.inner_size();
        let size = render_size(window_size, window.scale_factor());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&PointUniforms::zeroed()),
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
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline = create_point_pipeline(&device, &uniform_bind_group_layout, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            cloud: None,
            synced_generation: 0,
            window_size,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>, scale_factor: f64) {
        if new_size.width > 0 && new_size.height > 0 {
            let size = render_size(new_size, scale_factor);
            self.window_size = new_size;
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Bring the GPU copy of the cloud up to date with `state`.
    ///
    /// A new generation disposes the old buffers before uploading the new
    /// cloud. Otherwise only dirty colors are re-uploaded.
    pub fn sync(&mut self, state: &mut GalaxyState) {
        let action = sync_action(
            self.synced_generation,
            state.generation(),
            self.cloud.as_ref().map(CloudBuffers::count),
            state.cloud().len(),
            state.cloud().colors_dirty(),
        );

        match action {
            SyncAction::Rebuild => {
                if let Some(old) = self.cloud.take() {
                    old.dispose();
                }
                self.cloud = CloudBuffers::new(&self.device, state.cloud());
                self.synced_generation = state.generation();
            }
            SyncAction::UploadColors => {
                if let Some(buffers) = &self.cloud {
                    buffers.upload_colors(&self.queue, state.cloud());
                }
            }
            SyncAction::Nothing => {}
        }
        state.cloud_mut().take_colors_dirty();
    }

    fn update_uniforms(&self, camera: &Camera, point_size: f32) {
        let aspect = self.config.width as f32 / self.config.height as f32;
        let uniforms = PointUniforms {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            point_size,
            aspect,
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    fn screen_info(&self) -> ScreenInfo {
        let render_scale = if self.window_size.width > 0 {
            self.config.width as f32 / self.window_size.width as f32
        } else {
            1.0
        };
        ScreenInfo {
            size_in_pixels: [self.config.width, self.config.height],
            render_scale,
        }
    }

    pub fn render(
        &mut self,
        camera: &Camera,
        point_size: f32,
        mut overlay: Option<&mut dyn Overlay>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.update_uniforms(camera, point_size);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let screen = self.screen_info();
        let extra = match overlay.as_mut() {
            Some(o) => o.prepare(&self.device, &self.queue, &mut encoder, &screen),
            None => Vec::new(),
        };

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            if let Some(cloud) = &self.cloud {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                cloud.bind(&mut render_pass);
                render_pass.draw(0..6, 0..cloud.count());
            }

            if let Some(o) = overlay.as_ref() {
                o.paint(&mut render_pass, &screen);
            }
        }

        self.queue
            .submit(extra.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        if let Some(o) = overlay.as_mut() {
            o.finish();
        }

        Ok(())
    }

    /// Recover from a lost or outdated surface. Returns `false` if rendering cannot continue.
    pub fn handle_surface_error(&mut self, error: wgpu::SurfaceError) -> bool {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                log::debug!("surface {:?}, reconfiguring", error);
                self.reconfigure();
                true
            }
            wgpu::SurfaceError::OutOfMemory => {
                log::error!("GPU out of memory");
                false
            }
            other => {
                log::warn!("Render error: {:?}", other);
                true
            }
        }
    }
}

impl Drop for GpuState {
    fn drop(&mut self) {
        if let Some(cloud) = self.cloud.take() {
            cloud.dispose();
        }
    }
}

fn create_point_pipeline(
    device: &wgpu::Device,
    uniform_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Point Shader"),
        source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Point Pipeline Layout"),
        bind_group_layouts: &[uniform_layout],
        push_constant_ranges: &[],
    });

    // Additive so overlapping points brighten; no depth so draw order doesn't matter
    let additive = wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    };

    let buffers = cloud::vertex_layouts();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(additive),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
