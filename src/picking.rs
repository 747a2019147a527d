//! Click-to-recolor picking.
//!
//! A click is turned into a world-space ray through the cursor. Every point
//! closer to that ray than [`Picker::threshold`] becomes a candidate, and the
//! candidates are sorted nearest-first along the ray. The first candidate
//! whose distance to the ray is within the rendered point size wins, and every
//! point within [`Picker::recolor_radius`] of its hit point is repainted with
//! one random color.
//!
//! There is no spatial index: both the intersection test and the recolor scan
//! are linear in the number of points.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::color::Color;
use crate::galaxy::PointCloud;

/// A half-line `origin + t * direction` for `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray. `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Parameter of the point on the ray closest to `point`, clamped to `t >= 0`.
    pub fn closest_t(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.direction).max(0.0)
    }

    /// Point on the ray closest to `point`. Points behind the origin map to the origin.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        self.at(self.closest_t(point))
    }
}

/// Convert a cursor position in pixels to normalized device coordinates.
///
/// `(0, 0)` is the top-left pixel; the result has `+y` up. Returns `None` for
/// an empty viewport.
pub fn screen_to_ndc(position: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (position.x / viewport.x) * 2.0 - 1.0,
        -(position.y / viewport.y) * 2.0 + 1.0,
    ))
}

/// One point that passed the ray threshold test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Index into the cloud.
    pub index: usize,
    /// Closest point on the ray to the cloud point.
    pub point: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    /// Distance from the cloud point to the ray.
    pub distance_to_ray: f32,
}

/// What a successful pick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickOutcome {
    /// The intersection that was selected.
    pub hit: Intersection,
    /// Color applied to the neighborhood.
    pub color: Color,
    /// Number of points repainted.
    pub recolored: usize,
}

/// Picking configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Picker {
    /// Maximum point-to-ray distance for a point to be a candidate.
    pub threshold: f32,
    /// Points strictly closer than this to the hit are repainted.
    pub recolor_radius: f32,
    /// Candidates nearer than this along the ray are ignored.
    pub near: f32,
    /// Candidates farther than this along the ray are ignored.
    pub far: f32,
}

impl Default for Picker {
    fn default() -> Self {
        Self {
            threshold: 0.02,
            recolor_radius: 1.0,
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All points within `threshold` of the ray, sorted by `distance` ascending.
    pub fn intersect(&self, ray: &Ray, positions: &[[f32; 3]]) -> Vec<Intersection> {
        let threshold_sq = self.threshold * self.threshold;

        let mut hits: Vec<Intersection> = positions
            .iter()
            .enumerate()
            .filter_map(|(index, &p)| {
                let p = Vec3::from_array(p);
                let point = ray.closest_point(p);
                let dist_sq = point.distance_squared(p);
                if dist_sq >= threshold_sq {
                    return None;
                }
                let distance = ray.origin.distance(point);
                if distance < self.near || distance > self.far {
                    return None;
                }
                Some(Intersection {
                    index,
                    point,
                    distance,
                    distance_to_ray: dist_sq.sqrt(),
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// First candidate, in the given order, whose distance to the ray is at most `max_distance_to_ray`.
    pub fn select(candidates: &[Intersection], max_distance_to_ray: f32) -> Option<&Intersection> {
        candidates
            .iter()
            .find(|hit| hit.distance_to_ray <= max_distance_to_ray)
    }

    /// Repaint every point strictly within `radius` of `center`. Returns the count.
    pub fn recolor_within(cloud: &mut PointCloud, center: Vec3, radius: f32, color: Color) -> usize {
        let radius_sq = radius * radius;
        let inside: Vec<usize> = cloud
            .positions()
            .iter()
            .enumerate()
            .filter(|(_, p)| Vec3::from_array(**p).distance_squared(center) < radius_sq)
            .map(|(i, _)| i)
            .collect();

        for &i in &inside {
            cloud.set_color(i, color);
        }
        inside.len()
    }

    /// Run a full pick along `ray`.
    ///
    /// `point_size` is the rendered size of a point; it bounds how far from
    /// the ray the selected candidate may be. One random color is drawn per
    /// call whether or not anything is hit. On a miss the cloud is untouched
    /// and its colors are not marked dirty.
    pub fn pick<R: Rng + ?Sized>(
        &self,
        ray: &Ray,
        cloud: &mut PointCloud,
        point_size: f32,
        rng: &mut R,
    ) -> Option<PickOutcome> {
        let color = Color::new(rng.gen(), rng.gen(), rng.gen());

        let candidates = self.intersect(ray, cloud.positions());
        let hit = *Self::select(&candidates, point_size)?;
        let recolored = Self::recolor_within(cloud, hit.point, self.recolor_radius, color);

        Some(PickOutcome {
            hit,
            color,
            recolored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn cloud_of(points: &[[f32; 3]]) -> PointCloud {
        let mut cloud = PointCloud::new();
        for &p in points {
            cloud.push(p, Color::WHITE);
        }
        cloud
    }

    #[test]
    fn test_screen_to_ndc() {
        let viewport = Vec2::new(800.0, 600.0);
        assert_eq!(screen_to_ndc(Vec2::new(400.0, 300.0), viewport), Some(Vec2::ZERO));
        assert_eq!(screen_to_ndc(Vec2::ZERO, viewport), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(screen_to_ndc(viewport, viewport), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(screen_to_ndc(Vec2::ZERO, Vec2::new(0.0, 600.0)), None);
    }

    #[test]
    fn test_closest_point_clamps_behind_origin() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(ray.closest_point(Vec3::new(1.0, 0.0, 5.0)), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.closest_point(Vec3::new(0.0, 0.0, -5.0)), Vec3::ZERO);
        assert_eq!(ray.closest_t(Vec3::new(0.0, 0.0, -2.0)), 0.0);
    }

    #[test]
    fn test_intersect_sorted_by_distance() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let positions = [
            [0.0, 0.01, 9.0],
            [0.0, 0.0, 3.0],
            [0.5, 0.0, 1.0],
            [0.0, -0.005, 6.0],
        ];
        let hits = Picker::new().intersect(&ray, &positions);
        let order: Vec<usize> = hits.iter().map(|h| h.index).collect();
        assert_eq!(order, vec![1, 3, 0]);
        assert!((hits[2].distance_to_ray - 0.01).abs() < 1e-6);
        assert!((hits[0].distance - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_respects_far() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let picker = Picker {
            far: 5.0,
            ..Picker::default()
        };
        let hits = picker.intersect(&ray, &[[0.0, 0.0, 4.0], [0.0, 0.0, 6.0]]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn test_select_first_within_size() {
        let hit = |index, distance_to_ray| Intersection {
            index,
            point: Vec3::ZERO,
            distance: index as f32,
            distance_to_ray,
        };
        let candidates = [hit(0, 0.015), hit(1, 0.004), hit(2, 0.001)];
        assert_eq!(Picker::select(&candidates, 0.01).map(|h| h.index), Some(1));
        assert_eq!(Picker::select(&candidates, 0.0001), None);
        assert_eq!(Picker::select(&[], 1.0), None);
    }

    #[test]
    fn test_recolor_only_near_points() {
        let mut cloud = cloud_of(&[[0.0, 0.0, 0.0], [5.0, 5.0, 5.0], [0.0, 0.99, 0.0], [0.0, 1.0, 0.0]]);
        let red = Color::new(1.0, 0.0, 0.0);
        let n = Picker::recolor_within(&mut cloud, Vec3::ZERO, 1.0, red);

        assert_eq!(n, 2);
        assert_eq!(cloud.color(0), Some(red));
        assert_eq!(cloud.color(1), Some(Color::WHITE));
        assert_eq!(cloud.color(2), Some(red));
        // Strictly less than the radius
        assert_eq!(cloud.color(3), Some(Color::WHITE));
        assert!(cloud.colors_dirty());
    }

    #[test]
    fn test_pick_miss_leaves_cloud_clean() {
        let mut cloud = cloud_of(&[[0.0, 0.0, 0.0]]);
        let before = cloud.clone();
        let ray = Ray::new(Vec3::new(10.0, 10.0, 10.0), Vec3::X);

        let outcome = Picker::new().pick(&ray, &mut cloud, 0.01, &mut SmallRng::seed_from_u64(1));
        assert!(outcome.is_none());
        assert_eq!(cloud, before);
        assert!(!cloud.colors_dirty());
    }

    #[test]
    fn test_pick_hit_recolors_neighborhood() {
        let mut cloud = cloud_of(&[[0.0, 0.0, 0.0], [5.0, 5.0, 5.0], [0.3, 0.0, 0.0]]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);

        let outcome = Picker::new()
            .pick(&ray, &mut cloud, 0.01, &mut SmallRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(outcome.hit.index, 0);
        assert_eq!(outcome.recolored, 2);
        assert_eq!(cloud.color(0), Some(outcome.color));
        assert_eq!(cloud.color(2), Some(outcome.color));
        assert_eq!(cloud.color(1), Some(Color::WHITE));
    }

    #[test]
    fn test_pick_candidate_outside_size_is_ignored() {
        // Within the 0.02 threshold but farther from the ray than the point size
        let mut cloud = cloud_of(&[[0.015, 0.0, 0.0]]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z);
        let outcome = Picker::new().pick(&ray, &mut cloud, 0.01, &mut SmallRng::seed_from_u64(1));
        assert!(outcome.is_none());
        assert!(!cloud.colors_dirty());
    }
}
