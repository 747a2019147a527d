//! Egui overlay for the debug panel.
//!
//! Only built with the `egui` feature.

use std::sync::Arc;

use winit::window::Window;

use super::{Overlay, ScreenInfo};

/// Egui context, winit glue and wgpu renderer, drawn as an [`Overlay`].
pub struct EguiOverlay {
    pub ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    frame: Option<EguiFrame>,
}

struct EguiFrame {
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl EguiOverlay {
    pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Arc<Window>) -> Self {
        let ctx = egui::Context::default();

        let mut style = egui::Style::default();
        style.visuals = egui::Visuals::dark();
        style.visuals.window_shadow = egui::Shadow::NONE;
        style.visuals.popup_shadow = egui::Shadow::NONE;
        ctx.set_style(style);

        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window.as_ref(),
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let renderer = egui_wgpu::Renderer::new(
            device,
            output_format,
            None,  // depth format
            1,     // msaa samples
            false, // dithering
        );

        Self {
            ctx,
            state,
            renderer,
            frame: None,
        }
    }

    /// Feed a window event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run one UI pass and keep its output for the next [`Overlay::prepare`].
    ///
    /// Texture changes from a frame that never reached the GPU (the surface
    /// was lost or outdated) are kept and delivered with this one.
    pub fn run(&mut self, window: &Window, ui: impl FnMut(&egui::Context)) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, ui);

        self.state
            .handle_platform_output(window, output.platform_output);

        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.frame = Some(EguiFrame {
            paint_jobs,
            textures_delta: carry_over(self.frame.take(), output.textures_delta),
            pixels_per_point: output.pixels_per_point,
        });
    }

    /// Whether the user is mid-edit: a pointer button is down, or a widget
    /// such as a slider's number box holds keyboard focus.
    pub fn editing(&self) -> bool {
        self.ctx.input(|i| i.pointer.any_down()) || self.ctx.wants_keyboard_input()
    }

    fn screen_descriptor(frame: &EguiFrame, screen: &ScreenInfo) -> egui_wgpu::ScreenDescriptor {
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: screen.size_in_pixels,
            pixels_per_point: frame.pixels_per_point * screen.render_scale,
        }
    }
}

impl Overlay for EguiOverlay {
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        screen: &ScreenInfo,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(frame) = &self.frame else {
            return Vec::new();
        };

        for (id, image_delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }

        let descriptor = Self::screen_descriptor(frame, screen);
        self.renderer
            .update_buffers(device, queue, encoder, &frame.paint_jobs, &descriptor)
    }

    fn paint(&self, pass: &mut wgpu::RenderPass<'static>, screen: &ScreenInfo) {
        if let Some(frame) = &self.frame {
            let descriptor = Self::screen_descriptor(frame, screen);
            self.renderer.render(pass, &frame.paint_jobs, &descriptor);
        }
    }

    fn finish(&mut self) {
        if let Some(frame) = self.frame.take() {
            for id in &frame.textures_delta.free {
                self.renderer.free_texture(id);
            }
        }
    }
}

/// Texture changes still owed to the renderer: those of an undelivered
/// `previous` frame followed by `newer`.
fn carry_over(previous: Option<EguiFrame>, newer: egui::TexturesDelta) -> egui::TexturesDelta {
    match previous {
        Some(frame) => {
            log::debug!(
                "egui frame skipped, carrying {} texture updates",
                frame.textures_delta.set.len() + frame.textures_delta.free.len()
            );
            let mut delta = frame.textures_delta;
            delta.append(newer);
            delta
        }
        None => newer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::epaint::{ColorImage, ImageDelta};
    use egui::{Color32, TextureId, TextureOptions};

    fn upload(id: u64) -> (TextureId, ImageDelta) {
        let image = ColorImage::new([1, 1], Color32::WHITE);
        (TextureId::Managed(id), ImageDelta::full(image, TextureOptions::default()))
    }

    fn frame_with(textures_delta: egui::TexturesDelta) -> EguiFrame {
        EguiFrame {
            paint_jobs: Vec::new(),
            textures_delta,
            pixels_per_point: 1.0,
        }
    }

    #[test]
    fn test_skipped_frame_keeps_font_atlas_upload() {
        let atlas = egui::TexturesDelta {
            set: vec![upload(0)],
            free: vec![TextureId::Managed(7)],
        };
        let next = egui::TexturesDelta {
            set: vec![upload(1)],
            free: Vec::new(),
        };

        let delta = carry_over(Some(frame_with(atlas)), next);
        let ids: Vec<TextureId> = delta.set.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![TextureId::Managed(0), TextureId::Managed(1)]);
        assert_eq!(delta.free, vec![TextureId::Managed(7)]);
    }

    #[test]
    fn test_delivered_frame_passes_delta_through() {
        let next = egui::TexturesDelta {
            set: vec![upload(2)],
            free: Vec::new(),
        };
        let delta = carry_over(None, next);
        assert_eq!(delta.set.len(), 1);
        assert!(delta.free.is_empty());
    }
}
