//! Spiral galaxy point-cloud generation.
//!
//! Points are assigned round-robin to evenly spaced arms. Each point's radius
//! is drawn uniformly along the radius (not by area), so the core ends up
//! denser than the rim. Arms twist by `spin` radians per unit of radius and
//! every axis gets an independent jitter whose spread is shaped by
//! `randomness_power`. Color runs from the inside color to the outside color
//! with the radius.

use std::f32::consts::TAU;

use rand::Rng;

use crate::color::Color;
use crate::params::GalaxyParams;

/// Positions and colors of every rendered point.
///
/// The two vectors are always the same length and index-aligned: `colors[i]`
/// belongs to `positions[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
    colors_dirty: bool,
}

impl PointCloud {
    /// Create an empty cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cloud with room for `count` points.
    pub fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
            colors_dirty: false,
        }
    }

    /// Append one point.
    pub fn push(&mut self, position: [f32; 3], color: Color) {
        self.positions.push(position);
        self.colors.push(color.to_array());
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied().map(Color::from_array)
    }

    /// Overwrite one point's color and mark the colors for re-upload.
    pub fn set_color(&mut self, index: usize, color: Color) {
        if let Some(slot) = self.colors.get_mut(index) {
            *slot = color.to_array();
            self.colors_dirty = true;
        }
    }

    /// Whether colors changed since the GPU copy was last refreshed.
    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_colors_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.colors_dirty, false)
    }
}

/// Angle of the arm that point `index` belongs to.
///
/// `branches == 0` is treated as a single arm.
pub fn branch_angle(index: u32, branches: u32) -> f32 {
    let branches = branches.max(1);
    (index % branches) as f32 / branches as f32 * TAU
}

/// Interpolation factor for a point at `distance` from the center.
///
/// Zero when the galaxy radius is zero or not finite, so such a galaxy is
/// painted entirely in the inside color.
pub fn color_factor(distance: f32, radius: f32) -> f32 {
    if radius > 0.0 && radius.is_finite() {
        distance / radius
    } else {
        0.0
    }
}

/// One axis of jitter: `u^power * (±1) * randomness * distance`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, randomness: f32, power: f32, distance: f32) -> f32 {
    let magnitude = rng.gen::<f32>().powf(power);
    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    magnitude * sign * randomness * distance
}

/// Generate a galaxy from `params`, drawing randomness from `rng`.
pub fn generate<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> PointCloud {
    let params = params.sanitized();
    let mut cloud = PointCloud::with_capacity(params.count as usize);

    for i in 0..params.count {
        let distance = rng.gen::<f32>() * params.radius;
        let angle = branch_angle(i, params.branches) + params.spin * distance;

        let jx = jitter(rng, params.randomness, params.randomness_power, distance);
        let jy = jitter(rng, params.randomness, params.randomness_power, distance);
        let jz = jitter(rng, params.randomness, params.randomness_power, distance);

        let position = [
            angle.cos() * distance + jx,
            jy,
            angle.sin() * distance + jz,
        ];
        let color = params
            .inside_color
            .lerp(params.outside_color, color_factor(distance, params.radius));

        cloud.push(position, color);
    }

    cloud
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_lengths_match_count() {
        let params = GalaxyParams::default().with_count(1234);
        let cloud = generate(&params, &mut rng());
        assert_eq!(cloud.len(), 1234);
        assert_eq!(cloud.positions().len(), cloud.colors().len());
        assert!(!cloud.colors_dirty());
    }

    #[test]
    fn test_zero_count_is_empty() {
        let cloud = generate(&GalaxyParams::default().with_count(0), &mut rng());
        assert!(cloud.is_empty());
        assert!(cloud.colors().is_empty());
    }

    #[test]
    fn test_branch_angle_cycles() {
        assert_eq!(branch_angle(0, 4), 0.0);
        assert!((branch_angle(1, 4) - TAU / 4.0).abs() < 1e-6);
        assert!((branch_angle(3, 4) - 3.0 * TAU / 4.0).abs() < 1e-6);
        assert_eq!(branch_angle(4, 4), 0.0);
        assert_eq!(branch_angle(5, 0), 0.0);
    }

    #[test]
    fn test_points_lie_on_arms_without_jitter() {
        let params = GalaxyParams::default()
            .with_count(300)
            .with_branches(3)
            .with_spin(0.0)
            .with_randomness(0.0);
        let cloud = generate(&params, &mut rng());

        for (i, p) in cloud.positions().iter().enumerate() {
            assert_eq!(p[1], 0.0);
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            if r < 1e-3 {
                continue;
            }
            let expected = branch_angle(i as u32, 3);
            let actual = p[2].atan2(p[0]).rem_euclid(TAU);
            let diff = (actual - expected).abs();
            assert!(diff < 1e-3 || (TAU - diff) < 1e-3, "point {i}: {actual} vs {expected}");
        }
    }

    #[test]
    fn test_points_stay_within_radius_without_jitter() {
        let params = GalaxyParams::default().with_randomness(0.0).with_radius(2.0);
        let cloud = generate(&params, &mut rng());
        for p in cloud.positions() {
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(r <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn test_jitter_bounded_by_randomness() {
        let params = GalaxyParams::default()
            .with_radius(1.0)
            .with_randomness(0.5)
            .with_count(2000);
        let cloud = generate(&params, &mut rng());
        for p in cloud.positions() {
            assert!(p[1].abs() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_zero_radius_uses_inside_color() {
        let params = GalaxyParams::default().with_radius(0.0).with_count(10);
        let cloud = generate(&params, &mut rng());
        for i in 0..cloud.len() {
            assert_eq!(cloud.color(i), Some(params.inside_color));
            assert_eq!(cloud.positions()[i], [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_color_factor_guard() {
        assert_eq!(color_factor(1.0, 0.0), 0.0);
        assert_eq!(color_factor(1.0, f32::INFINITY), 0.0);
        assert_eq!(color_factor(2.5, 5.0), 0.5);
    }

    #[test]
    fn test_set_color_marks_dirty() {
        let mut cloud = PointCloud::new();
        cloud.push([0.0; 3], Color::BLACK);
        cloud.set_color(5, Color::WHITE);
        assert!(!cloud.colors_dirty());

        cloud.set_color(0, Color::WHITE);
        assert!(cloud.colors_dirty());
        assert_eq!(cloud.color(0), Some(Color::WHITE));
        assert!(cloud.take_colors_dirty());
        assert!(!cloud.colors_dirty());
    }
}
