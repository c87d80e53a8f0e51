//! Pinch detection from two fingertip positions.
//!
//! The threshold is measured in **canvas** pixels after mapping, so the
//! same physical pinch reads differently on a small and a large canvas.

use crate::error::CoreError;
use crate::landmark::HandLandmarks;
use crate::mapper::{map_point, CanvasPoint, FrameDims};

/// Default pinch distance, canvas pixels.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 60.0;

/// Result of classifying one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinchState {
    Released,
    /// Fingertips closer than the threshold; `midpoint` is where the pen is.
    Pinching { midpoint: CanvasPoint },
}

impl PinchState {
    pub fn is_pinching(&self) -> bool {
        matches!(self, PinchState::Pinching { .. })
    }

    pub fn midpoint(&self) -> Option<CanvasPoint> {
        match self {
            PinchState::Pinching { midpoint } => Some(*midpoint),
            PinchState::Released              => None,
        }
    }
}

pub fn distance(a: CanvasPoint, b: CanvasPoint) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn midpoint(a: CanvasPoint, b: CanvasPoint) -> CanvasPoint {
    CanvasPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchClassifier {
    pub threshold: f32,
}

impl Default for PinchClassifier {
    fn default() -> Self {
        PinchClassifier { threshold: DEFAULT_PINCH_THRESHOLD }
    }
}

impl PinchClassifier {
    pub fn new(threshold: f32) -> Self {
        PinchClassifier { threshold }
    }

    /// Classify thumb tip and index tip (order does not matter).
    ///
    /// A missing tip means the detector did not see it; that is a release,
    /// not a failure.
    pub fn classify(&self, thumb: Option<CanvasPoint>, index: Option<CanvasPoint>) -> PinchState {
        let (Some(thumb), Some(index)) = (thumb, index) else {
            return PinchState::Released;
        };
        if distance(thumb, index) < self.threshold {
            PinchState::Pinching { midpoint: midpoint(thumb, index) }
        } else {
            PinchState::Released
        }
    }

    /// Classify a whole detection. `None` (no hand this frame) or a list too
    /// short to hold the index tip is `Released`; only missing video
    /// dimensions are reported as an error, so the caller can skip the frame.
    pub fn classify_hand(
        &self,
        hand: Option<&HandLandmarks>,
        dims: &FrameDims,
    ) -> Result<PinchState, CoreError> {
        let Some(hand) = hand else {
            return Ok(PinchState::Released);
        };
        let thumb = hand.thumb_tip().map(|p| map_point(p, dims)).transpose()?;
        let index = hand.index_tip().map(|p| map_point(p, dims)).transpose()?;
        let state = self.classify(thumb, index);
        tracing::trace!(?state, "classified hand");
        Ok(state)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
