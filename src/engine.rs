// engine.rs — 姿态融合引擎：拖拽手势 + 设备姿态 -> 相机朝向

use crate::orientation::{gaze, rotate, ScreenOrientation};
use glam::{Quat, Vec2};
use std::f32::consts::{PI, TAU};

/// Phase reported by the pan gesture source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// Size of the hosting view, in the same units as gesture translations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport that can turn a translation into an angle.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Everything the windowing collaborator supplies to a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayContext {
    pub viewport: Viewport,
    pub screen: ScreenOrientation,
}

impl DisplayContext {
    pub fn new(viewport: Viewport, screen: ScreenOrientation) -> Self {
        Self { viewport, screen }
    }
}

/// Fuses pan gestures and optional device attitude into a camera orientation.
///
/// Both inputs trigger their own recompute; nothing is batched. Without an
/// attitude each gesture delta is composed once onto the previous orientation.
/// With an attitude the gesture deltas are summed into a running offset that
/// is laid on top of the sensor gaze on every tick.
#[derive(Debug, Clone)]
pub struct OrientationEngine {
    previous_translation: Vec2,
    translation_delta: Vec2,
    // x = pitch, y = yaw (radians)
    cumulative_offset: Vec2,
    attitude: Option<Quat>,
    orientation: Quat,
}

impl Default for OrientationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationEngine {
    pub fn new() -> Self {
        Self::with_orientation(Quat::IDENTITY)
    }

    pub fn with_orientation(orientation: Quat) -> Self {
        Self {
            previous_translation: Vec2::ZERO,
            translation_delta: Vec2::ZERO,
            cumulative_offset: Vec2::ZERO,
            attitude: None,
            orientation,
        }
    }

    /// `translation` is cumulative since the gesture began, not a per-event delta.
    pub fn on_gesture(&mut self, phase: GesturePhase, translation: Vec2, display: DisplayContext) -> Quat {
        match phase {
            GesturePhase::Began => {
                self.previous_translation = Vec2::ZERO;
            }
            GesturePhase::Changed => {
                self.translation_delta = translation - self.previous_translation;
                self.previous_translation = translation;
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                self.previous_translation = Vec2::ZERO;
                self.translation_delta = Vec2::ZERO;
            }
        }

        self.recompute(display)
    }

    pub fn on_device_attitude(&mut self, attitude: Quat, display: DisplayContext) -> Quat {
        self.attitude = Some(attitude);
        self.recompute(display)
    }

    /// Drops the stored attitude and falls back to pan-only composition.
    ///
    /// A source that simply stops delivering samples leaves the last attitude in place.
    pub fn clear_device_attitude(&mut self, display: DisplayContext) -> Quat {
        if self.attitude.take().is_some() {
            log::debug!("device attitude cleared, pan-only mode");
        }
        self.recompute(display)
    }

    pub fn recompute(&mut self, display: DisplayContext) -> Quat {
        let offset = self.consume_delta(display.viewport);

        self.orientation = match self.attitude {
            Some(attitude) => {
                self.cumulative_offset += offset;
                rotate(gaze(attitude, display.screen), self.cumulative_offset)
            }
            None => rotate(self.orientation, offset),
        };

        self.orientation
    }

    /// Converts the pending translation delta into `(pitch, yaw)` and clears it,
    /// so a finger resting on the screen does not keep the camera spinning.
    fn consume_delta(&mut self, viewport: Viewport) -> Vec2 {
        let delta = std::mem::take(&mut self.translation_delta);
        if !viewport.is_usable() {
            return Vec2::ZERO;
        }

        let yaw = delta.x / viewport.width * TAU;
        let pitch = delta.y / viewport.height * PI;
        let offset = Vec2::new(pitch, yaw);
        if offset.is_finite() {
            offset
        } else {
            Vec2::ZERO
        }
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Running `(pitch, yaw)` total contributed by gestures while an attitude is present.
    pub fn cumulative_offset(&self) -> Vec2 {
        self.cumulative_offset
    }

    pub fn device_attitude(&self) -> Option<Quat> {
        self.attitude
    }

    pub fn has_device_attitude(&self) -> bool {
        self.attitude.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Quat, b: Quat) {
        assert!(a.abs_diff_eq(b, 1e-6), "{a:?} != {b:?}");
    }

    fn display() -> DisplayContext {
        DisplayContext::new(Viewport::new(400.0, 800.0), ScreenOrientation::Portrait)
    }

    #[test]
    fn began_resets_baseline() {
        let mut engine = OrientationEngine::new();
        engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display());
        engine.on_gesture(GesturePhase::Changed, Vec2::new(40.0, 0.0), display());
        engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display());
        assert_eq!(engine.previous_translation, Vec2::ZERO);
    }

    #[test]
    fn ended_clears_pending_delta() {
        let mut engine = OrientationEngine::new();
        engine.translation_delta = Vec2::new(12.0, 3.0);
        engine.previous_translation = Vec2::new(50.0, 50.0);
        let before = engine.orientation();
        let after = engine.on_gesture(GesturePhase::Ended, Vec2::new(50.0, 50.0), display());
        assert_close(before, after);
        assert_eq!(engine.previous_translation, Vec2::ZERO);
    }

    #[test]
    fn delta_is_consumed_once() {
        let mut engine = OrientationEngine::new();
        engine.on_gesture(GesturePhase::Began, Vec2::ZERO, display());
        let moved = engine.on_gesture(GesturePhase::Changed, Vec2::new(100.0, 0.0), display());
        let again = engine.recompute(display());
        assert_close(moved, again);
    }

    #[test]
    fn clearing_attitude_keeps_last_orientation() {
        let mut engine = OrientationEngine::new();
        let with_motion = engine.on_device_attitude(Quat::from_rotation_z(0.3), display());
        let cleared = engine.clear_device_attitude(display());
        assert!(!engine.has_device_attitude());
        assert_close(with_motion, cleared);
    }

    #[test]
    fn non_finite_viewport_contributes_nothing() {
        let mut engine = OrientationEngine::new();
        let bad = DisplayContext::new(Viewport::new(f32::NAN, 10.0), ScreenOrientation::Portrait);
        engine.on_gesture(GesturePhase::Began, Vec2::ZERO, bad);
        let q = engine.on_gesture(GesturePhase::Changed, Vec2::new(10.0, 10.0), bad);
        assert_close(q, Quat::IDENTITY);
    }
}
