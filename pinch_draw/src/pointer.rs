//! Mouse and touch input, fed through the same stroke state machine as
//! the hand.
//!
//! | Event | Sample |
//! |---|---|
//! | `Down(p)` | active at `p` (always starts a fresh stroke) |
//! | `Move(p)` while pressed | active at `p` |
//! | `Move(p)` while released | ignored |
//! | `Up` / `Leave` | inactive |

use pinch_core::{BrushConfig, CanvasPoint, SegmentSink, StrokeController};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(CanvasPoint),
    Move(CanvasPoint),
    Up,
    Leave,
}

#[derive(Debug, Default)]
pub struct PointerAdapter {
    pressed:    bool,
    last:       CanvasPoint,
    controller: StrokeController,
}

impl PointerAdapter {
    pub fn new() -> Self { Self::default() }

    pub fn is_pressed(&self) -> bool { self.pressed }
    pub fn is_drawing(&self) -> bool { self.controller.is_drawing() }

    /// Apply one event, stamping onto `sink`. Returns whether a segment was
    /// drawn.
    pub fn handle<S: SegmentSink + ?Sized>(
        &mut self,
        event: PointerEvent,
        brush: &BrushConfig,
        sink:  &mut S,
    ) -> bool {
        match event {
            PointerEvent::Down(p) => {
                self.controller.reset();
                self.pressed = true;
                self.last = p;
                self.controller.feed(p, true, brush, sink)
            }
            PointerEvent::Move(p) => {
                if !self.pressed { return false; }
                self.last = p;
                self.controller.feed(p, true, brush, sink)
            }
            PointerEvent::Up | PointerEvent::Leave => {
                if !self.pressed { return false; }
                self.pressed = false;
                self.controller.feed(self.last, false, brush, sink)
            }
        }
    }

    /// Drop any stroke in progress.
    pub fn cancel(&mut self) {
        self.pressed = false;
        self.controller.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_core::StrokeSegment;

    fn pt(x: f32, y: f32) -> CanvasPoint { CanvasPoint::new(x, y) }

    fn run(events: &[PointerEvent]) -> Vec<StrokeSegment> {
        let mut sink = Vec::new();
        let mut p = PointerAdapter::new();
        for &e in events {
            p.handle(e, &BrushConfig::default(), &mut sink);
        }
        sink
    }

    #[test]
    fn drag_draws_connected_segments() {
        let segs = run(&[
            PointerEvent::Down(pt(0.0, 0.0)),
            PointerEvent::Move(pt(5.0, 0.0)),
            PointerEvent::Move(pt(5.0, 5.0)),
            PointerEvent::Up,
        ]);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].to, segs[1].from);
    }

    #[test]
    fn hover_draws_nothing() {
        assert!(run(&[PointerEvent::Move(pt(1.0, 1.0)), PointerEvent::Move(pt(9.0, 9.0))]).is_empty());
    }

    #[test]
    fn leave_ends_stroke() {
        let segs = run(&[
            PointerEvent::Down(pt(0.0, 0.0)),
            PointerEvent::Leave,
            PointerEvent::Move(pt(50.0, 50.0)),
        ]);
        assert!(segs.is_empty());
    }

    #[test]
    fn new_press_does_not_join_previous_stroke() {
        let segs = run(&[
            PointerEvent::Down(pt(0.0, 0.0)),
            PointerEvent::Up,
            PointerEvent::Down(pt(100.0, 100.0)),
            PointerEvent::Move(pt(110.0, 100.0)),
        ]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].from, pt(100.0, 100.0));
    }

    #[test]
    fn cancel_drops_stroke() {
        let mut sink: Vec<StrokeSegment> = Vec::new();
        let mut p = PointerAdapter::new();
        let brush = BrushConfig::default();
        p.handle(PointerEvent::Down(pt(0.0, 0.0)), &brush, &mut sink);
        p.cancel();
        assert!(!p.handle(PointerEvent::Move(pt(3.0, 3.0)), &brush, &mut sink));
        assert!(!p.is_drawing());
    }
}
