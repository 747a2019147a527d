//! Galaxy generation parameters.
//!
//! [`GalaxyParams`] is the single configuration record for the generator.
//! Each field has a [`ParamField`] tag carrying the slider range the debug
//! panel exposes it with. Edits are reported through [`ParamListener`] only
//! once they are committed, so a slider drag regenerates once on release
//! rather than on every intermediate value.
//!
//! # Example
//!
//! ```ignore
//! use galaxy::params::GalaxyParams;
//!
//! let params = GalaxyParams::default()
//!     .with_count(5_000)
//!     .with_branches(5)
//!     .with_spin(-1.5);
//! ```

use crate::color::Color;

/// Configuration for one galaxy generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyParams {
    /// Number of points.
    pub count: u32,
    /// Rendered point size in world units. Also the pick tolerance.
    pub size: f32,
    /// Outer radius of the disk.
    pub radius: f32,
    /// Number of spiral arms.
    pub branches: u32,
    /// Arm twist in radians per unit of radius.
    pub spin: f32,
    /// Jitter magnitude, relative to each point's radius.
    pub randomness: f32,
    /// Jitter concentration exponent. Higher values pull points onto the arms.
    pub randomness_power: f32,
    /// Color at the center.
    pub inside_color: Color,
    /// Color at the rim.
    pub outside_color: Color,
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            count: 10_000,
            size: 0.01,
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
            inside_color: Color::from_srgb8(0xff, 0x60, 0x30),
            outside_color: Color::from_srgb8(0x1b, 0x39, 0x84),
        }
    }
}

impl GalaxyParams {
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_branches(mut self, branches: u32) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_randomness(mut self, randomness: f32) -> Self {
        self.randomness = randomness;
        self
    }

    pub fn with_randomness_power(mut self, power: f32) -> Self {
        self.randomness_power = power;
        self
    }

    pub fn with_colors(mut self, inside: Color, outside: Color) -> Self {
        self.inside_color = inside;
        self.outside_color = outside;
        self
    }

    /// Copy with every field forced into its valid domain.
    ///
    /// `branches >= 1`, `randomness >= 0`, `randomness_power >= 1`, and
    /// non-negative `radius`/`size`. NaN floats fall back to the lower bound.
    pub fn sanitized(&self) -> Self {
        let non_neg = |v: f32| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Self {
            count: self.count,
            size: non_neg(self.size),
            radius: non_neg(self.radius),
            branches: self.branches.max(1),
            spin: if self.spin.is_finite() { self.spin } else { 0.0 },
            randomness: non_neg(self.randomness),
            randomness_power: if self.randomness_power.is_nan() {
                1.0
            } else {
                self.randomness_power.max(1.0)
            },
            inside_color: self.inside_color,
            outside_color: self.outside_color,
        }
    }
}

/// Identifies one editable field of [`GalaxyParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    Count,
    Size,
    Radius,
    Branches,
    Spin,
    Randomness,
    RandomnessPower,
    InsideColor,
    OutsideColor,
}

/// Slider bounds for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp to `[min, max]` and snap to the nearest step from `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }
}

impl ParamField {
    pub const ALL: [ParamField; 9] = [
        ParamField::Count,
        ParamField::Size,
        ParamField::Radius,
        ParamField::Branches,
        ParamField::Spin,
        ParamField::Randomness,
        ParamField::RandomnessPower,
        ParamField::InsideColor,
        ParamField::OutsideColor,
    ];

    /// Display label used by the debug panel.
    pub fn label(self) -> &'static str {
        match self {
            ParamField::Count => "count",
            ParamField::Size => "size",
            ParamField::Radius => "radius",
            ParamField::Branches => "branches",
            ParamField::Spin => "spin",
            ParamField::Randomness => "randomness",
            ParamField::RandomnessPower => "randomnessPower",
            ParamField::InsideColor => "insideColor",
            ParamField::OutsideColor => "outsideColor",
        }
    }

    /// Slider range, or `None` for color fields.
    pub fn range(self) -> Option<ParamRange> {
        match self {
            ParamField::Count => Some(ParamRange::new(100.0, 10_000.0, 100.0)),
            ParamField::Size => Some(ParamRange::new(0.001, 0.1, 0.001)),
            ParamField::Radius => Some(ParamRange::new(0.01, 10.0, 0.01)),
            ParamField::Branches => Some(ParamRange::new(1.0, 20.0, 1.0)),
            ParamField::Spin => Some(ParamRange::new(-5.0, 5.0, 0.001)),
            ParamField::Randomness => Some(ParamRange::new(0.0, 2.0, 0.01)),
            ParamField::RandomnessPower => Some(ParamRange::new(1.0, 10.0, 0.001)),
            ParamField::InsideColor | ParamField::OutsideColor => None,
        }
    }

    pub fn is_color(self) -> bool {
        self.range().is_none()
    }
}

/// Receives committed parameter edits.
pub trait ParamListener {
    fn on_parameter_committed(&mut self, field: ParamField);
}

/// Buffers field edits until the edit is finished.
///
/// Widgets report every value change with [`record`](Self::record); once per
/// frame the owner calls [`poll`](Self::poll) saying whether an edit is still
/// in progress. That is the case while a pointer button is down, and while a
/// typed value has keyboard focus (each keystroke changes the value). Edits
/// are flushed, each field once, on the first frame neither holds.
#[derive(Debug, Default)]
pub struct CommitTracker {
    pending: Vec<ParamField>,
}

impl CommitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note that `field` changed this frame.
    pub fn record(&mut self, field: ParamField) {
        if !self.pending.contains(&field) {
            self.pending.push(field);
        }
    }

    /// Whether edits are waiting for the current one to finish.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Return the fields to commit, unless an edit is still in progress.
    pub fn poll(&mut self, editing: bool) -> Vec<ParamField> {
        if editing {
            return Vec::new();
        }
        std::mem::take(&mut self.pending)
    }

    /// Poll and deliver commits to a listener. Returns how many were delivered.
    pub fn dispatch<L: ParamListener + ?Sized>(&mut self, editing: bool, listener: &mut L) -> usize {
        let fields = self.poll(editing);
        for &field in &fields {
            listener.on_parameter_committed(field);
        }
        fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<ParamField>);

    impl ParamListener for Recorder {
        fn on_parameter_committed(&mut self, field: ParamField) {
            self.0.push(field);
        }
    }

    #[test]
    fn test_defaults_within_ranges() {
        let p = GalaxyParams::default();
        let in_range = |field: ParamField, v: f64| {
            let r = field.range().unwrap();
            v >= r.min && v <= r.max
        };
        assert!(in_range(ParamField::Count, p.count as f64));
        assert!(in_range(ParamField::Size, p.size as f64));
        assert!(in_range(ParamField::Radius, p.radius as f64));
        assert!(in_range(ParamField::Branches, p.branches as f64));
        assert!(in_range(ParamField::Spin, p.spin as f64));
        assert!(in_range(ParamField::Randomness, p.randomness as f64));
        assert!(in_range(ParamField::RandomnessPower, p.randomness_power as f64));
    }

    #[test]
    fn test_builder() {
        let p = GalaxyParams::default()
            .with_count(0)
            .with_branches(7)
            .with_spin(-2.0)
            .with_colors(Color::WHITE, Color::BLACK);
        assert_eq!(p.count, 0);
        assert_eq!(p.branches, 7);
        assert_eq!(p.spin, -2.0);
        assert_eq!(p.inside_color, Color::WHITE);
        assert_eq!(p.outside_color, Color::BLACK);
    }

    #[test]
    fn test_sanitized_clamps_degenerate_values() {
        let p = GalaxyParams {
            branches: 0,
            randomness: -1.0,
            randomness_power: 0.5,
            radius: f32::NAN,
            size: -0.1,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(p.branches, 1);
        assert_eq!(p.randomness, 0.0);
        assert_eq!(p.randomness_power, 1.0);
        assert_eq!(p.radius, 0.0);
        assert_eq!(p.size, 0.0);
    }

    #[test]
    fn test_range_snap() {
        let r = ParamField::Count.range().unwrap();
        assert_eq!(r.snap(149.0), 100.0);
        assert_eq!(r.snap(151.0), 200.0);
        assert_eq!(r.snap(1e9), 10_000.0);
        assert_eq!(r.snap(-5.0), 100.0);
    }

    #[test]
    fn test_color_fields_have_no_range() {
        assert!(ParamField::InsideColor.is_color());
        assert!(ParamField::OutsideColor.is_color());
        assert!(!ParamField::Spin.is_color());
        assert_eq!(ParamField::ALL.len(), 9);
    }

    #[test]
    fn test_commit_held_while_pointer_down() {
        let mut tracker = CommitTracker::new();
        tracker.record(ParamField::Spin);
        tracker.record(ParamField::Spin);
        tracker.record(ParamField::Radius);

        assert!(tracker.poll(true).is_empty());
        assert!(tracker.has_pending());

        assert_eq!(tracker.poll(false), vec![ParamField::Spin, ParamField::Radius]);
        assert!(!tracker.has_pending());
        assert!(tracker.poll(false).is_empty());
    }

    #[test]
    fn test_dispatch_notifies_listener_once_per_field() {
        let mut tracker = CommitTracker::new();
        let mut listener = Recorder::default();

        tracker.record(ParamField::Branches);
        assert_eq!(tracker.dispatch(true, &mut listener), 0);
        tracker.record(ParamField::Branches);
        assert_eq!(tracker.dispatch(false, &mut listener), 1);
        assert_eq!(listener.0, vec![ParamField::Branches]);
    }

    #[test]
    fn test_typed_value_commits_once_on_blur() {
        let mut tracker = CommitTracker::new();
        let mut listener = Recorder::default();

        // "5000" typed into the count box: four value changes, focus held throughout
        for _ in 0..4 {
            tracker.record(ParamField::Count);
            assert_eq!(tracker.dispatch(true, &mut listener), 0);
        }
        assert!(listener.0.is_empty());

        assert_eq!(tracker.dispatch(false, &mut listener), 1);
        assert_eq!(listener.0, vec![ParamField::Count]);
    }
}
