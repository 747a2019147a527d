//! Pointer input.
//!
//! Turns raw winit mouse events into the three gestures the viewer cares
//! about: a drag (orbits the camera), a click (picks), and a scroll (zooms).
//! A left press that travels less than [`CLICK_SLOP`] pixels before release
//! counts as a click; anything longer is a drag and does not pick.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Maximum pointer travel, in pixels, for a press/release to count as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// A gesture recognised from pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Cursor moved by `delta` pixels with the left button held.
    Drag { delta: Vec2 },
    /// Left button pressed and released in place at `position`.
    Click { position: Vec2 },
    /// Wheel movement; positive is away from the user.
    Scroll(f32),
}

/// Pointer state for one window.
#[derive(Debug, Default)]
pub struct Pointer {
    position: Vec2,
    pressed_at: Option<Vec2>,
    travel: f32,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in physical pixels.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the left button is down.
    pub fn is_held(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) -> Option<PointerAction> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(Vec2::new(position.x as f32, position.y as f32))
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.left_button(*state == ElementState::Pressed),
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                Some(PointerAction::Scroll(amount))
            }
            WindowEvent::CursorLeft { .. } => {
                self.pressed_at = None;
                None
            }
            _ => None,
        }
    }

    pub(crate) fn cursor_moved(&mut self, position: Vec2) -> Option<PointerAction> {
        let delta = position - self.position;
        self.position = position;

        self.pressed_at?;
        self.travel += delta.length();
        Some(PointerAction::Drag { delta })
    }

    pub(crate) fn left_button(&mut self, pressed: bool) -> Option<PointerAction> {
        if pressed {
            self.pressed_at = Some(self.position);
            self.travel = 0.0;
            return None;
        }

        let pressed_at = self.pressed_at.take()?;
        if self.travel < CLICK_SLOP && pressed_at.distance(self.position) < CLICK_SLOP {
            Some(PointerAction::Click {
                position: self.position,
            })
        } else {
            None
        }
    }
}
