//! # Galaxy
//!
//! An interactive spiral galaxy rendered as a GPU point cloud.
//!
//! The crate has two pieces of real logic and some glue around them:
//!
//! - [`galaxy::generate`] builds a [`PointCloud`] from [`GalaxyParams`]:
//!   points spread along spiral arms, jittered, and colored from the inside
//!   color to the outside color by radius.
//! - [`Picker`] turns a click into a camera ray, selects the nearest point
//!   along it, and repaints every point within a fixed radius of that hit.
//!
//! The glue is a winit window, a wgpu point renderer and, with the default
//! `egui` feature, a debug panel whose sliders regenerate the galaxy when an
//! edit is committed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use galaxy::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     Viewer::new()
//!         .with_params(
//!             GalaxyParams::default()
//!                 .with_count(8_000)
//!                 .with_branches(4)
//!                 .with_spin(1.5),
//!         )
//!         .run()
//! }
//! ```
//!
//! ## Headless use
//!
//! Generation and picking do not need a window:
//!
//! ```ignore
//! use galaxy::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
//! let mut cloud = galaxy::generate(&GalaxyParams::default(), &mut rng);
//!
//! let ray = Camera::new().ray_through(Vec2::ZERO, 16.0 / 9.0);
//! if let Some(hit) = Picker::new().pick(&ray, &mut cloud, 0.01, &mut rng) {
//!     println!("repainted {} points", hit.recolored);
//! }
//! ```

pub mod camera;
pub mod color;
pub mod error;
pub mod galaxy;
mod gpu;
pub mod input;
pub mod params;
pub mod picking;
mod shader;
pub mod state;
pub mod time;
#[cfg(feature = "egui")]
pub mod ui;
mod viewer;

pub use camera::Camera;
pub use color::Color;
pub use error::{AppError, ColorParseError, GpuError};
pub use galaxy::{generate, PointCloud};
pub use glam::{Vec2, Vec3};
pub use gpu::{render_size, MAX_PIXEL_RATIO};
pub use params::{CommitTracker, GalaxyParams, ParamField, ParamListener, ParamRange};
pub use picking::{screen_to_ndc, Intersection, PickOutcome, Picker, Ray};
pub use state::GalaxyState;
pub use time::Clock;
pub use viewer::Viewer;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use galaxy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::camera::Camera;
    pub use crate::color::Color;
    pub use crate::error::AppError;
    pub use crate::galaxy::PointCloud;
    pub use crate::params::{GalaxyParams, ParamField, ParamListener};
    pub use crate::picking::{PickOutcome, Picker, Ray};
    pub use crate::state::GalaxyState;
    pub use crate::viewer::Viewer;
    pub use crate::{Vec2, Vec3};
}
