//! Viewer builder and window event loop.

use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::error::AppError;
use crate::gpu::{GpuState, Overlay};
use crate::input::{Pointer, PointerAction};
use crate::params::GalaxyParams;
use crate::picking::Picker;
use crate::state::GalaxyState;
use crate::time::Clock;

#[cfg(feature = "egui")]
use crate::gpu::egui_integration::EguiOverlay;
#[cfg(feature = "egui")]
use crate::ui::ParamPanel;

/// Galaxy viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
///
/// ```ignore
/// use galaxy::prelude::*;
///
/// Viewer::new()
///     .with_params(GalaxyParams::default().with_branches(5))
///     .with_seed(42)
///     .run()?;
/// ```
pub struct Viewer {
    params: GalaxyParams,
    seed: Option<u64>,
    picker: Picker,
    title: String,
}

impl Viewer {
    pub fn new() -> Self {
        Self {
            params: GalaxyParams::default(),
            seed: None,
            picker: Picker::default(),
            title: "Galaxy".to_string(),
        }
    }

    pub fn with_params(mut self, params: GalaxyParams) -> Self {
        self.params = params;
        self
    }

    /// Fix the random seed so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), AppError> {
        let state = match self.seed {
            Some(seed) => GalaxyState::with_seed(self.params, seed),
            None => GalaxyState::new(self.params),
        }
        .with_picker(self.picker);

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(state, Camera::new(), self.title);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    #[cfg(feature = "egui")]
    egui: Option<EguiOverlay>,
    #[cfg(feature = "egui")]
    panel: ParamPanel,
    state: GalaxyState,
    camera: Camera,
    pointer: Pointer,
    clock: Clock,
    title: String,
    error: Option<AppError>,
}

impl App {
    fn new(state: GalaxyState, camera: Camera, title: String) -> Self {
        Self {
            window: None,
            gpu: None,
            #[cfg(feature = "egui")]
            egui: None,
            #[cfg(feature = "egui")]
            panel: ParamPanel::new(),
            state,
            camera,
            pointer: Pointer::new(),
            clock: Clock::new(),
            title,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = pollster::block_on(GpuState::new(window.clone()))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiOverlay::new(gpu.device(), gpu.surface_format(), &window));
        }

        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn apply_pointer(&mut self, action: PointerAction, window: &Window) {
        let size = window.inner_size();
        let viewport = Vec2::new(size.width as f32, size.height as f32);

        match action {
            PointerAction::Drag { delta } => self.camera.rotate(delta, viewport.y),
            PointerAction::Scroll(amount) => self.camera.zoom(amount),
            PointerAction::Click { position } => {
                self.state.click(position, viewport, &self.camera);
            }
        }
    }

    /// One logical frame: controls, panel, commits, GPU sync, draw.
    fn frame(&mut self, event_loop: &ActiveEventLoop, window: &Window) {
        self.clock.tick();
        self.camera.update();

        #[cfg(feature = "egui")]
        let overlay: Option<&mut dyn Overlay> = match self.egui.as_mut() {
            Some(egui) => {
                let points = self.state.cloud().len();
                let panel = &mut self.panel;
                let params = self.state.params_mut();
                let clock = &self.clock;
                egui.run(window, |ctx| panel.show(ctx, params, points, clock));

                self.panel.dispatch(egui.editing(), &mut self.state);
                Some(egui as &mut dyn Overlay)
            }
            None => None,
        };
        #[cfg(not(feature = "egui"))]
        let overlay: Option<&mut dyn Overlay> = {
            let _ = window;
            None
        };

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        gpu.sync(&mut self.state);

        let point_size = self.state.point_size();
        if let Err(e) = gpu.render(&self.camera, point_size, overlay) {
            if !gpu.handle_surface_error(e) {
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("{}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        #[cfg(feature = "egui")]
        let consumed = match self.egui.as_mut() {
            Some(egui) => egui.on_window_event(&window, &event),
            None => false,
        };
        #[cfg(not(feature = "egui"))]
        let consumed = false;

        // Pointer state is always tracked so a release over the panel ends a drag
        if let Some(action) = self.pointer.handle_event(&event) {
            if !consumed {
                self.apply_pointer(action, &window);
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size, window.scale_factor());
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(window.inner_size(), scale_factor);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop, &window);
                window.request_redraw();
            }
            _ => {}
        }
    }
}
