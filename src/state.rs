//! CPU-side viewer state.
//!
//! [`GalaxyState`] owns everything the generator and picker touch: the
//! parameters, the current cloud, the random source and the picker settings.
//! The GPU layer watches [`generation`](GalaxyState::generation) to know when
//! the cloud was replaced and the cloud's dirty flag to know when only its
//! colors changed.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::camera::Camera;
use crate::galaxy::{generate, PointCloud};
use crate::params::{GalaxyParams, ParamField, ParamListener};
use crate::picking::{screen_to_ndc, PickOutcome, Picker};

pub struct GalaxyState {
    params: GalaxyParams,
    cloud: PointCloud,
    rng: SmallRng,
    picker: Picker,
    generation: u64,
    point_size: f32,
}

impl GalaxyState {
    /// Generate an initial galaxy seeded from OS entropy.
    pub fn new(params: GalaxyParams) -> Self {
        Self::from_rng(params, SmallRng::from_entropy())
    }

    /// Generate an initial galaxy from a fixed seed.
    pub fn with_seed(params: GalaxyParams, seed: u64) -> Self {
        Self::from_rng(params, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(params: GalaxyParams, rng: SmallRng) -> Self {
        let mut state = Self {
            params,
            cloud: PointCloud::new(),
            rng,
            picker: Picker::default(),
            generation: 0,
            point_size: 0.0,
        };
        state.regenerate();
        state
    }

    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = picker;
        self
    }

    pub fn params(&self) -> &GalaxyParams {
        &self.params
    }

    /// Mutable access for widgets. Changes take effect on the next [`regenerate`](Self::regenerate).
    pub fn params_mut(&mut self) -> &mut GalaxyParams {
        &mut self.params
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn cloud_mut(&mut self) -> &mut PointCloud {
        &mut self.cloud
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    /// Size the current cloud is drawn at, fixed when it was generated.
    ///
    /// Clicks test against the live `params().size` instead, so a size edit
    /// affects picking before it is committed.
    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Incremented every time the cloud is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the cloud with a fresh one built from the current parameters.
    pub fn regenerate(&mut self) {
        self.cloud = generate(&self.params, &mut self.rng);
        self.point_size = self.params.sanitized().size;
        self.generation += 1;
        log::info!(
            "generated galaxy #{}: {} points, {} branches, radius {:.2}",
            self.generation,
            self.cloud.len(),
            self.params.branches.max(1),
            self.params.radius
        );
    }

    /// Handle a click at `screen` pixels in a `viewport`-sized window.
    ///
    /// Returns what was repainted, or `None` if the click missed.
    pub fn click(&mut self, screen: Vec2, viewport: Vec2, camera: &Camera) -> Option<PickOutcome> {
        let ndc = screen_to_ndc(screen, viewport)?;
        let ray = camera.ray_through(ndc, viewport.x / viewport.y);
        let outcome = self
            .picker
            .pick(&ray, &mut self.cloud, self.params.size, &mut self.rng);

        match &outcome {
            Some(o) => log::debug!(
                "picked point {} at {:.3?}, recolored {} points",
                o.hit.index,
                o.hit.point,
                o.recolored
            ),
            None => log::trace!("click at {:?} missed", screen),
        }
        outcome
    }
}

impl ParamListener for GalaxyState {
    fn on_parameter_committed(&mut self, field: ParamField) {
        log::debug!("{} committed", field.label());
        self.regenerate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CommitTracker;

    #[test]
    fn test_new_generates_once() {
        let state = GalaxyState::with_seed(GalaxyParams::default().with_count(50), 3);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.cloud().len(), 50);
    }

    #[test]
    fn test_commit_regenerates_with_new_params() {
        let mut state = GalaxyState::with_seed(GalaxyParams::default().with_count(50), 3);
        let mut tracker = CommitTracker::new();

        state.params_mut().count = 200;
        tracker.record(ParamField::Count);
        // Nothing happens while the slider is still held
        tracker.dispatch(true, &mut state);
        assert_eq!(state.cloud().len(), 50);

        tracker.dispatch(false, &mut state);
        assert_eq!(state.generation(), 2);
        assert_eq!(state.cloud().len(), 200);
    }

    #[test]
    fn test_point_size_follows_commits_only() {
        let mut state = GalaxyState::with_seed(GalaxyParams::default().with_size(0.02), 3);
        let mut tracker = CommitTracker::new();
        assert_eq!(state.point_size(), 0.02);

        state.params_mut().size = 0.05;
        tracker.record(ParamField::Size);
        tracker.dispatch(true, &mut state);
        assert_eq!(state.point_size(), 0.02);

        tracker.dispatch(false, &mut state);
        assert_eq!(state.point_size(), 0.05);
    }

    #[test]
    fn test_click_center_hits_point_at_target() {
        let params = GalaxyParams::default().with_count(0);
        let mut state = GalaxyState::with_seed(params, 1);
        state.cloud_mut().push([0.0, 0.0, 0.0], crate::Color::WHITE);

        let camera = Camera::new();
        let viewport = Vec2::new(800.0, 600.0);
        let outcome = state.click(viewport / 2.0, viewport, &camera);

        let outcome = outcome.expect("center click should hit the origin");
        assert_eq!(outcome.hit.index, 0);
        assert_eq!(outcome.recolored, 1);
        assert!(state.cloud().colors_dirty());
    }

    #[test]
    fn test_click_on_empty_viewport_is_noop() {
        let mut state = GalaxyState::with_seed(GalaxyParams::default().with_count(10), 1);
        let outcome = state.click(Vec2::ZERO, Vec2::ZERO, &Camera::new());
        assert!(outcome.is_none());
        assert!(!state.cloud().colors_dirty());
    }
}
