//! Orbit camera with damped controls.

use glam::{Mat4, Vec2, Vec3};

use crate::picking::Ray;

/// Perspective camera orbiting a target point.
///
/// Drag and scroll input is accumulated as velocity and bled into the
/// orientation a fraction at a time by [`update`](Self::update), which gives
/// the eased motion of damped orbit controls. Call `update` once per frame.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of pending motion applied per frame, in `(0, 1]`.
    pub damping: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;
const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 50.0;

impl Camera {
    /// Camera at `(3, 3, 3)` looking at the origin.
    pub fn new() -> Self {
        Self::looking_at(Vec3::splat(3.0), Vec3::ZERO)
    }

    /// Camera placed at `eye`, orbiting `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length().max(MIN_DISTANCE);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        Self {
            yaw,
            pitch,
            distance,
            target,
            fov_y: 75.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            damping: 0.05,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view_matrix()
    }

    /// World-space ray from the eye through a point in normalized device coordinates.
    pub fn ray_through(&self, ndc: Vec2, aspect: f32) -> Ray {
        let inverse = self.view_proj(aspect).inverse();
        let eye = self.position();
        let on_plane = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(eye, on_plane - eye)
    }

    /// Queue a rotation from a pointer drag of `delta` pixels.
    ///
    /// A drag across the full viewport height turns the camera once around.
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        let scale = std::f32::consts::TAU / viewport_height;
        self.yaw_velocity -= delta.x * scale;
        self.pitch_velocity += delta.y * scale;
    }

    /// Queue a zoom; positive `scroll` moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        self.zoom_velocity += scroll;
    }

    /// Advance damped motion by one frame.
    pub fn update(&mut self) {
        let d = self.damping.clamp(f32::EPSILON, 1.0);

        self.yaw += self.yaw_velocity * d;
        self.pitch = (self.pitch + self.pitch_velocity * d).clamp(MIN_PITCH, MAX_PITCH);
        self.distance = (self.distance * 0.95_f32.powf(self.zoom_velocity * d))
            .clamp(MIN_DISTANCE, MAX_DISTANCE);

        self.yaw_velocity *= 1.0 - d;
        self.pitch_velocity *= 1.0 - d;
        self.zoom_velocity *= 1.0 - d;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
