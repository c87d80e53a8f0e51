//! The stroke state machine.
//!
//! ```text
//!              active / seed anchor
//!        ┌──────────────────────────────┐
//!        │                              ▼
//!    ┌───────┐   inactive     ┌─────────────────┐  active / emit(anchor → p),
//!    │ Idle  │ ◄───────────── │ Pinching{anchor}│  anchor = p
//!    └───────┘                └─────────────────┘ ─────┐
//!      ▲   │ inactive                    ▲             │
//!      └───┘                             └─────────────┘
//! ```
//!
//! Pen-down never emits: drawing from whatever position was left over from
//! the previous stroke would produce a long stray line.
//!
//! Gesture frames and pointer events both arrive through
//! [`StrokeController::on_gesture_sample`], so strokes look the same no
//! matter where they came from.

use crate::brush::{BrushConfig, LineCap, Rgba};
use crate::classifier::PinchState;
use crate::mapper::CanvasPoint;

/// One straight piece of a stroke, with the brush it was drawn with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSegment {
    pub from:  CanvasPoint,
    pub to:    CanvasPoint,
    pub color: Rgba,
    pub width: f32,
    pub cap:   LineCap,
}

/// Anything segments can be composited onto.
pub trait SegmentSink {
    fn stamp_segment(&mut self, segment: &StrokeSegment);
}

impl SegmentSink for Vec<StrokeSegment> {
    fn stamp_segment(&mut self, segment: &StrokeSegment) {
        self.push(*segment);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Pinching { anchor: CanvasPoint },
}

#[derive(Debug, Default)]
pub struct StrokeController {
    state: StrokeState,
}

impl StrokeController {
    pub fn new() -> Self {
        StrokeController { state: StrokeState::Idle }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Pinching { .. })
    }

    /// Advance the machine by one sample.
    ///
    /// `brush` is read only when a segment is actually emitted.
    pub fn on_gesture_sample(
        &mut self,
        point:     CanvasPoint,
        is_active: bool,
        brush:     &BrushConfig,
    ) -> Option<StrokeSegment> {
        match (self.state, is_active) {
            (StrokeState::Idle, false) => None,
            (StrokeState::Idle, true) => {
                self.state = StrokeState::Pinching { anchor: point };
                None
            }
            (StrokeState::Pinching { anchor }, true) => {
                self.state = StrokeState::Pinching { anchor: point };
                Some(StrokeSegment {
                    from:  anchor,
                    to:    point,
                    color: brush.color,
                    width: brush.width,
                    cap:   brush.cap(),
                })
            }
            (StrokeState::Pinching { .. }, false) => {
                self.state = StrokeState::Idle;
                None
            }
        }
    }

    /// Gesture-path adapter: a released frame carries no position.
    pub fn apply_pinch(&mut self, pinch: PinchState, brush: &BrushConfig) -> Option<StrokeSegment> {
        match pinch {
            PinchState::Pinching { midpoint } => self.on_gesture_sample(midpoint, true, brush),
            PinchState::Released => {
                let last = match self.state {
                    StrokeState::Pinching { anchor } => anchor,
                    StrokeState::Idle                => CanvasPoint::default(),
                };
                self.on_gesture_sample(last, false, brush)
            }
        }
    }

    /// Like [`on_gesture_sample`](Self::on_gesture_sample) but stamps the
    /// segment straight onto `sink`. Returns whether anything was drawn.
    pub fn feed<S: SegmentSink + ?Sized>(
        &mut self,
        point:     CanvasPoint,
        is_active: bool,
        brush:     &BrushConfig,
        sink:      &mut S,
    ) -> bool {
        match self.on_gesture_sample(point, is_active, brush) {
            Some(seg) => { sink.stamp_segment(&seg); true }
            None      => false,
        }
    }

    /// Force back to `Idle`, dropping the anchor.
    pub fn reset(&mut self) {
        if self.is_drawing() {
            tracing::debug!("stroke controller reset while drawing");
        }
        self.state = StrokeState::Idle;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
