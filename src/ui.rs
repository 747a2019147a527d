//! Debug panel for tuning galaxy parameters.
//!
//! One slider per numeric field and one color button per color, using the
//! ranges from [`ParamField::range`]. Widgets write straight into the
//! parameters; the panel's [`CommitTracker`] decides when those edits are
//! final and should regenerate the galaxy.

use crate::color::Color;
use crate::params::{CommitTracker, GalaxyParams, ParamField, ParamListener};
use crate::time::Clock;

#[derive(Default)]
pub struct ParamPanel {
    tracker: CommitTracker,
}

impl ParamPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the panel and record any edits.
    pub fn show(&mut self, ctx: &egui::Context, params: &mut GalaxyParams, points: usize, clock: &Clock) {
        egui::Window::new("Galaxy")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                for field in ParamField::ALL {
                    if field_widget(ui, field, params) {
                        self.tracker.record(field);
                    }
                }

                if self.tracker.has_pending() {
                    ui.weak("release or press Enter to apply");
                }

                ui.separator();
                ui.label(format!("{} points", points));
                ui.label(format!("{:.0} fps, {:.1} ms", clock.fps(), clock.delta() * 1000.0));
            });
    }

    /// Deliver committed edits once no edit is in progress.
    pub fn dispatch<L: ParamListener + ?Sized>(&mut self, editing: bool, listener: &mut L) -> usize {
        self.tracker.dispatch(editing, listener)
    }
}

/// Draw the widget for one field. Returns true if its value changed.
fn field_widget(ui: &mut egui::Ui, field: ParamField, params: &mut GalaxyParams) -> bool {
    match field {
        ParamField::Count => int_slider(ui, field, &mut params.count),
        ParamField::Branches => int_slider(ui, field, &mut params.branches),
        ParamField::Size => float_slider(ui, field, &mut params.size),
        ParamField::Radius => float_slider(ui, field, &mut params.radius),
        ParamField::Spin => float_slider(ui, field, &mut params.spin),
        ParamField::Randomness => float_slider(ui, field, &mut params.randomness),
        ParamField::RandomnessPower => float_slider(ui, field, &mut params.randomness_power),
        ParamField::InsideColor => color_button(ui, field, &mut params.inside_color),
        ParamField::OutsideColor => color_button(ui, field, &mut params.outside_color),
    }
}

// Both sliders snap typed values to the field's step.

fn int_slider(ui: &mut egui::Ui, field: ParamField, value: &mut u32) -> bool {
    let Some(range) = field.range() else {
        return false;
    };
    let changed = ui
        .add(
            egui::Slider::new(value, range.min as u32..=range.max as u32)
                .step_by(range.step)
                .text(field.label()),
        )
        .changed();
    if changed {
        *value = range.snap(*value as f64) as u32;
    }
    changed
}

fn float_slider(ui: &mut egui::Ui, field: ParamField, value: &mut f32) -> bool {
    let Some(range) = field.range() else {
        return false;
    };
    let changed = ui
        .add(
            egui::Slider::new(value, range.min as f32..=range.max as f32)
                .step_by(range.step)
                .text(field.label()),
        )
        .changed();
    if changed {
        *value = range.snap(*value as f64) as f32;
    }
    changed
}

fn color_button(ui: &mut egui::Ui, field: ParamField, color: &mut Color) -> bool {
    ui.horizontal(|ui| {
        let mut srgb = color.to_srgb8();
        let changed = ui.color_edit_button_srgb(&mut srgb).changed();
        if changed {
            *color = Color::from_srgb8(srgb[0], srgb[1], srgb[2]);
        }
        ui.label(format!("{} {}", field.label(), color.to_hex()));
        changed
    })
    .inner
}
