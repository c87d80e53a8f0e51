//! Hand-skeleton overlay.
//!
//! Pure feedback: redrawn from scratch every detection frame and never
//! exported.

use pinch_core::{CanvasPoint, LineCap, Rgba, HAND_CONNECTIONS};

use crate::Canvas;

const JOINT_RADIUS: f32  = 5.0;
const JOINT_COLOR:  Rgba = Rgba::GREEN;
const BONE_WIDTH:   f32  = 2.0;
const BONE_COLOR:   Rgba = Rgba::BLUE;

#[derive(Clone, Debug)]
pub struct Overlay {
    layer: Canvas,
}

impl Overlay {
    pub fn new(width: u32, height: u32) -> Self {
        Overlay { layer: Canvas::new(width, height) }
    }

    pub fn layer(&self) -> &Canvas { &self.layer }

    pub fn clear(&mut self) {
        self.layer.clear();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.layer.resize(width, height);
    }

    /// Replace the overlay with one hand: a dot per keypoint, then the
    /// bones between them. Bones referring past the end of `points` are
    /// skipped.
    pub fn draw_hand(&mut self, points: &[CanvasPoint]) {
        self.layer.clear();
        for &p in points {
            self.layer.fill_disc(p, JOINT_RADIUS, JOINT_COLOR);
        }
        for [i, j] in HAND_CONNECTIONS {
            if let (Some(&a), Some(&b)) = (points.get(i), points.get(j)) {
                self.layer.stamp_segment(a, b, BONE_COLOR, BONE_WIDTH, LineCap::Butt);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
