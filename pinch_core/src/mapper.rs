//! Video-pixel → canvas-pixel rescaling.
//!
//! Each axis is scaled independently by `canvas / video` for that axis, so
//! a non-matching aspect ratio stretches rather than letterboxes.

use crate::error::CoreError;
use crate::landmark::VideoPoint;

/// A point in drawing-surface pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        CanvasPoint { x, y }
    }
}

/// Dimensions in effect for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameDims {
    pub video_width:   u32,
    pub video_height:  u32,
    pub canvas_width:  u32,
    pub canvas_height: u32,
}

impl FrameDims {
    pub const fn new(video_width: u32, video_height: u32, canvas_width: u32, canvas_height: u32) -> Self {
        FrameDims { video_width, video_height, canvas_width, canvas_height }
    }

    /// Per-axis scale factors `(sx, sy)`.
    ///
    /// Fails while the video has not reported its size (zero width or
    /// height), which is normal for the first frames after start.
    pub fn scale(&self) -> Result<(f32, f32), CoreError> {
        if self.video_width == 0 || self.video_height == 0 {
            return Err(CoreError::DimensionUnavailable {
                video_width:  self.video_width,
                video_height: self.video_height,
            });
        }
        Ok((
            self.canvas_width  as f32 / self.video_width  as f32,
            self.canvas_height as f32 / self.video_height as f32,
        ))
    }

    /// Same video, different target surface (e.g. the overlay).
    pub fn with_canvas(self, canvas_width: u32, canvas_height: u32) -> Self {
        FrameDims { canvas_width, canvas_height, ..self }
    }
}

/// Map one video-space point into canvas space.
pub fn map_point(p: VideoPoint, dims: &FrameDims) -> Result<CanvasPoint, CoreError> {
    let (sx, sy) = dims.scale()?;
    Ok(CanvasPoint { x: p.x * sx, y: p.y * sy })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: FrameDims = FrameDims::new(1280, 720, 640, 480);

    #[test]
    fn origin_maps_to_origin() {
        let p = map_point(VideoPoint::new(0.0, 0.0), &DIMS).unwrap();
        assert_eq!(p, CanvasPoint::new(0.0, 0.0));
    }

    #[test]
    fn far_corner_maps_to_canvas_corner() {
        for dims in [
            DIMS,
            FrameDims::new(640, 480, 640, 480),
            FrameDims::new(1920, 1080, 333, 777),
            FrameDims::new(7, 3, 1000, 10),
        ] {
            let p = map_point(
                VideoPoint::new(dims.video_width as f32, dims.video_height as f32),
                &dims,
            ).unwrap();
            assert!((p.x - dims.canvas_width  as f32).abs() < 1e-3, "{:?}", dims);
            assert!((p.y - dims.canvas_height as f32).abs() < 1e-3, "{:?}", dims);
        }
    }

    #[test]
    fn axes_scale_independently() {
        // 640/1280 = 0.5 on x, 480/720 = 2/3 on y
        let p = map_point(VideoPoint::new(200.0, 360.0), &DIMS).unwrap();
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!((p.y - 240.0).abs() < 1e-4);
    }

    #[test]
    fn depth_is_ignored() {
        let a = map_point(VideoPoint::with_depth(10.0, 10.0, 0.0),  &DIMS).unwrap();
        let b = map_point(VideoPoint::with_depth(10.0, 10.0, -9.0), &DIMS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_video_width_is_unavailable() {
        let dims = FrameDims::new(0, 720, 640, 480);
        assert_eq!(
            map_point(VideoPoint::new(1.0, 1.0), &dims),
            Err(CoreError::DimensionUnavailable { video_width: 0, video_height: 720 }),
        );
    }

    #[test]
    fn zero_video_height_is_unavailable() {
        let dims = FrameDims::new(640, 0, 640, 480);
        assert!(dims.scale().is_err());
    }

    #[test]
    fn with_canvas_keeps_video_size() {
        let d = DIMS.with_canvas(100, 50);
        assert_eq!(d, FrameDims::new(1280, 720, 100, 50));
    }
}
