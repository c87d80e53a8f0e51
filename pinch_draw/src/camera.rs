//! Video source collaborator.
//!
//! The drawing pipeline never looks at pixels, only at a frame's sequence
//! number and size, so a [`VideoFrame`] carries nothing else. A frame that
//! reports `0×0` arrived before the stream's metadata did.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// ════════════════════════════════════════════════════════════════════════════
// VideoFrame
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VideoFrame {
    pub seq:    u64,
    pub width:  u32,
    pub height: u32,
}

impl VideoFrame {
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Constraints
// ════════════════════════════════════════════════════════════════════════════

/// `min ≤ ideal ≤ max`, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min:   u32,
    pub ideal: u32,
    pub max:   u32,
}

impl SizeRange {
    pub const fn new(min: u32, ideal: u32, max: u32) -> Self {
        SizeRange { min, ideal, max }
    }

    /// The size a device would pick, or `None` if the range is empty.
    pub fn resolve(&self) -> Option<u32> {
        (self.min <= self.max).then(|| self.ideal.clamp(self.min, self.max))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConstraints {
    pub width:         SizeRange,
    pub height:        SizeRange,
    pub facing:        FacingMode,
    /// Frames delivered with `0×0` size before metadata settles.
    pub warmup_frames: u32,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        CameraConstraints {
            width:         SizeRange::new(640, 1280, 1920),
            height:        SizeRange::new(480,  720, 1080),
            facing:        FacingMode::User,
            warmup_frames: 3,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VideoSource trait
// ════════════════════════════════════════════════════════════════════════════

pub trait VideoSource {
    fn start(&mut self, constraints: &CameraConstraints) -> Result<(), AppError>;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Latest frame, or `None` while stopped.
    fn poll_frame(&mut self) -> Option<VideoFrame>;
}

// ════════════════════════════════════════════════════════════════════════════
// SimCamera
// ════════════════════════════════════════════════════════════════════════════

/// A camera with no sensor behind it: frames are bookkeeping only.
#[derive(Debug)]
pub struct SimCamera {
    available:   bool,
    running:     bool,
    seq:         u64,
    warmup_left: u32,
    size:        (u32, u32),
}

impl Default for SimCamera {
    fn default() -> Self { Self::new() }
}

impl SimCamera {
    pub fn new() -> Self {
        SimCamera { available: true, running: false, seq: 0, warmup_left: 0, size: (0, 0) }
    }

    /// A camera whose every `start` fails, as if permission was denied.
    pub fn unavailable() -> Self {
        SimCamera { available: false, ..Self::new() }
    }
}

impl VideoSource for SimCamera {
    fn start(&mut self, c: &CameraConstraints) -> Result<(), AppError> {
        if !self.available {
            return Err(AppError::DeviceUnavailable("no camera device found".into()));
        }
        let (Some(w), Some(h)) = (c.width.resolve(), c.height.resolve()) else {
            return Err(AppError::DeviceUnavailable("constraints cannot be satisfied".into()));
        };
        self.size        = (w, h);
        self.warmup_left = c.warmup_frames;
        self.running     = true;
        tracing::info!(width = w, height = h, facing = ?c.facing, "camera started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            tracing::info!(frames = self.seq, "camera stopped");
        }
        self.running = false;
    }

    fn is_running(&self) -> bool { self.running }

    fn poll_frame(&mut self) -> Option<VideoFrame> {
        if !self.running { return None; }
        self.seq += 1;
        if self.warmup_left > 0 {
            self.warmup_left -= 1;
            return Some(VideoFrame { seq: self.seq, width: 0, height: 0 });
        }
        Some(VideoFrame { seq: self.seq, width: self.size.0, height: self.size.1 })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
