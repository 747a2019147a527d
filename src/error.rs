//! Error types for the galaxy viewer.
//!
//! GPU initialization and window creation can fail at startup; color parsing
//! can fail when parameters are built from hex strings. Everything after
//! startup is infallible from the caller's point of view.

use std::fmt;

/// Startup failures while acquiring the GPU.
#[derive(Debug)]
pub enum GpuError {
    /// The window could not back a wgpu surface.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No adapter can present to the window's surface.
    NoAdapter,
    DeviceCreation(wgpu::RequestDeviceError),
    /// The surface reported no supported texture formats for the adapter.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "cannot render to this window: {}", e),
            GpuError::NoAdapter => write!(f, "no GPU adapter can draw the galaxy (Vulkan, Metal, DX12 or WebGPU required)"),
            GpuError::DeviceCreation(e) => write!(f, "GPU device request rejected: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "surface offers no texture format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Why a `#rrggbb` string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// Expected six hex digits, got this many.
    Length(usize),
    /// The string contained a non-hex character.
    InvalidDigit(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::Length(n) => write!(f, "expected 6 hex digits, found {}", n),
            ColorParseError::InvalidDigit(s) => write!(f, "not a hex color: {:?}", s),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Everything [`Viewer::run`](crate::Viewer::run) can fail with.
#[derive(Debug)]
pub enum AppError {
    EventLoop(winit::error::EventLoopError),
    Window(winit::error::OsError),
    Gpu(GpuError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "event loop: {}", e),
            AppError::Window(e) => write!(f, "window: {}", e),
            AppError::Gpu(e) => write!(f, "gpu: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_gpu_error_wraps_into_app_error() {
        let err: AppError = GpuError::NoAdapter.into();
        assert!(matches!(err, AppError::Gpu(GpuError::NoAdapter)));
        assert!(err.to_string().starts_with("gpu: no GPU adapter"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_color_parse_error_messages() {
        assert_eq!(ColorParseError::Length(4).to_string(), "expected 6 hex digits, found 4");
        assert!(ColorParseError::InvalidDigit("zz0000".into())
            .to_string()
            .contains("zz0000"));
    }
}
