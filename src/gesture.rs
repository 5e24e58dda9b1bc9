// gesture.rs — 把鼠标按下/移动/抬起转换成平移手势（阶段 + 起点以来的累计位移）

use crate::engine::GesturePhase;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub phase: GesturePhase,
    /// Cumulative since the gesture began.
    pub translation: Vec2,
}

impl PanEvent {
    fn new(phase: GesturePhase, translation: Vec2) -> Self {
        Self { phase, translation }
    }
}

/// Pointer-driven pan recognizer.
///
/// Mouse and touch feed the same gesture. While a finger is down the mouse is
/// ignored, since some platforms synthesize mouse events from touches.
#[derive(Debug, Default, Clone)]
pub struct PanRecognizer {
    origin: Option<Vec2>,
    last: Vec2,
    touch: Option<u64>,
}

impl PanRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }

    pub fn is_touching(&self) -> bool {
        self.touch.is_some()
    }

    /// Pressing again while tracking restarts the gesture from `position`.
    pub fn press(&mut self, position: Vec2) -> Option<PanEvent> {
        if self.touch.is_some() {
            return None;
        }
        Some(self.begin(position))
    }

    pub fn moved(&mut self, position: Vec2) -> Option<PanEvent> {
        if self.touch.is_some() {
            return None;
        }
        self.track(position)
    }

    pub fn release(&mut self) -> Option<PanEvent> {
        if self.touch.is_some() {
            return None;
        }
        self.finish(GesturePhase::Ended)
    }

    /// Focus loss or pointer capture lost. Ends any gesture, touch included.
    pub fn cancel(&mut self) -> Option<PanEvent> {
        self.touch = None;
        self.finish(GesturePhase::Cancelled)
    }

    /// Only the first finger drives the pan; later fingers are ignored.
    pub fn touch_started(&mut self, id: u64, position: Vec2) -> Option<PanEvent> {
        if self.touch.is_some() {
            return None;
        }
        self.touch = Some(id);
        Some(self.begin(position))
    }

    pub fn touch_moved(&mut self, id: u64, position: Vec2) -> Option<PanEvent> {
        if self.touch != Some(id) {
            return None;
        }
        self.track(position)
    }

    pub fn touch_ended(&mut self, id: u64) -> Option<PanEvent> {
        if self.touch != Some(id) {
            return None;
        }
        self.touch = None;
        self.finish(GesturePhase::Ended)
    }

    pub fn touch_cancelled(&mut self, id: u64) -> Option<PanEvent> {
        if self.touch != Some(id) {
            return None;
        }
        self.touch = None;
        self.finish(GesturePhase::Cancelled)
    }

    fn begin(&mut self, position: Vec2) -> PanEvent {
        self.origin = Some(position);
        self.last = position;
        PanEvent::new(GesturePhase::Began, Vec2::ZERO)
    }

    fn track(&mut self, position: Vec2) -> Option<PanEvent> {
        let origin = self.origin?;
        if position == self.last {
            return None;
        }
        self.last = position;
        Some(PanEvent::new(GesturePhase::Changed, position - origin))
    }

    fn finish(&mut self, phase: GesturePhase) -> Option<PanEvent> {
        let origin = self.origin.take()?;
        Some(PanEvent::new(phase, self.last - origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_is_cumulative() {
        let mut pan = PanRecognizer::new();
        assert_eq!(pan.press(Vec2::new(100.0, 100.0)).unwrap().phase, GesturePhase::Began);
        let first = pan.moved(Vec2::new(110.0, 100.0)).unwrap();
        let second = pan.moved(Vec2::new(120.0, 95.0)).unwrap();
        assert_eq!(first.translation, Vec2::new(10.0, 0.0));
        assert_eq!(second.translation, Vec2::new(20.0, -5.0));
        assert_eq!(second.phase, GesturePhase::Changed);

        let end = pan.release().unwrap();
        assert_eq!(end.phase, GesturePhase::Ended);
        assert!(!pan.is_tracking());
    }

    #[test]
    fn hover_without_press_is_ignored() {
        let mut pan = PanRecognizer::new();
        assert!(pan.moved(Vec2::new(5.0, 5.0)).is_none());
        assert!(pan.release().is_none());
        assert!(pan.cancel().is_none());
    }

    #[test]
    fn stationary_pointer_emits_nothing() {
        let mut pan = PanRecognizer::new();
        pan.press(Vec2::ZERO);
        assert!(pan.moved(Vec2::ZERO).is_none());
    }

    #[test]
    fn cancel_ends_tracking() {
        let mut pan = PanRecognizer::new();
        pan.press(Vec2::ZERO);
        pan.moved(Vec2::new(3.0, 4.0));
        let ev = pan.cancel().unwrap();
        assert_eq!(ev.phase, GesturePhase::Cancelled);
        assert_eq!(ev.translation, Vec2::new(3.0, 4.0));
        assert!(pan.moved(Vec2::new(9.0, 9.0)).is_none());
    }

    #[test]
    fn mouse_is_ignored_while_a_finger_is_down() {
        let mut pan = PanRecognizer::new();
        let began = pan.touch_started(7, Vec2::new(50.0, 50.0)).unwrap();
        assert_eq!(began.phase, GesturePhase::Began);

        // mouse events synthesized from the same touch
        assert!(pan.press(Vec2::new(50.0, 50.0)).is_none());
        assert!(pan.moved(Vec2::new(80.0, 50.0)).is_none());
        assert!(pan.release().is_none());
        assert!(pan.is_tracking());

        let moved = pan.touch_moved(7, Vec2::new(60.0, 50.0)).unwrap();
        assert_eq!(moved.translation, Vec2::new(10.0, 0.0));
        let ended = pan.touch_ended(7).unwrap();
        assert_eq!(ended.phase, GesturePhase::Ended);
        assert!(!pan.is_touching());

        assert!(pan.press(Vec2::ZERO).is_some());
    }

    #[test]
    fn only_first_finger_drives_the_pan() {
        let mut pan = PanRecognizer::new();
        pan.touch_started(1, Vec2::ZERO);
        assert!(pan.touch_started(2, Vec2::new(5.0, 5.0)).is_none());
        assert!(pan.touch_moved(2, Vec2::new(9.0, 9.0)).is_none());
        assert!(pan.touch_ended(2).is_none());

        let ev = pan.touch_cancelled(1).unwrap();
        assert_eq!(ev.phase, GesturePhase::Cancelled);
        assert!(!pan.is_tracking());
    }

    #[test]
    fn focus_loss_releases_the_touch() {
        let mut pan = PanRecognizer::new();
        pan.touch_started(3, Vec2::ZERO);
        assert!(pan.cancel().is_some());
        assert!(!pan.is_touching());
        assert!(pan.press(Vec2::ZERO).is_some());
    }
}
