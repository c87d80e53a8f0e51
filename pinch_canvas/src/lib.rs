//! # pinch_canvas
//!
//! A software raster the strokes are composited onto, a throw-away overlay
//! for the detected hand skeleton, and PNG export.
//!
//! Pixels are packed `0xAARRGGBB` with straight alpha; a cleared canvas is
//! fully transparent so exports keep an alpha channel.
//!
//! ```rust
//! use pinch_canvas::Canvas;
//! use pinch_core::{CanvasPoint, LineCap, Rgba};
//!
//! let mut canvas = Canvas::new(64, 64);
//! canvas.stamp_segment(CanvasPoint::new(8.0, 32.0), CanvasPoint::new(56.0, 32.0),
//!                      Rgba::BLACK, 4.0, LineCap::Round);
//! assert_eq!(canvas.pixel(32, 32), Some(Rgba::BLACK.to_argb()));
//!
//! let png = pinch_canvas::export_png(&canvas).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

pub mod export;
pub mod overlay;

pub use export::{export_file_name, export_png, save_png, today_utc, ExportError};
pub use overlay::Overlay;

use pinch_core::{CanvasPoint, LineCap, Rgba, SegmentSink, StrokeSegment};

/// Fully transparent pixel.
pub const CLEAR: u32 = 0x00000000;

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// Append-only raster. Strokes stay until [`clear`](Canvas::clear) or a
/// [`resize`](Canvas::resize).
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    width:  u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![CLEAR; width as usize * height as usize],
        }
    }

    pub fn width(&self)  -> u32    { self.width }
    pub fn height(&self) -> u32    { self.height }
    pub fn pixels(&self) -> &[u32] { &self.pixels }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height { return None; }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&p| p == CLEAR)
    }

    pub fn clear(&mut self) {
        self.pixels.fill(CLEAR);
    }

    /// Change size. Like an HTML canvas, resizing wipes the contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height { return; }
        tracing::debug!(width, height, "canvas resized");
        *self = Canvas::new(width, height);
    }

    /// Composite one thick line segment.
    ///
    /// A pixel is covered when its centre lies inside the stroked shape:
    /// within `width / 2` of the segment, with the ends finished per `cap`.
    pub fn stamp_segment(
        &mut self,
        from:  CanvasPoint,
        to:    CanvasPoint,
        color: Rgba,
        width: f32,
        cap:   LineCap,
    ) {
        if color.a == 0 || !(width > 0.0) { return; }
        let r = width / 2.0;

        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();

        // Square caps are butt caps on a segment stretched by r each way.
        let (a, b) = match cap {
            LineCap::Square if len > 0.0 => {
                let (ux, uy) = (dx / len * r, dy / len * r);
                (CanvasPoint::new(from.x - ux, from.y - uy),
                 CanvasPoint::new(to.x + ux,   to.y + uy))
            }
            _ => (from, to),
        };

        let min_x = a.x.min(b.x) - r;
        let max_x = a.x.max(b.x) + r;
        let min_y = a.y.min(b.y) - r;
        let max_y = a.y.max(b.y) + r;
        let Some((x0, x1)) = pixel_span(min_x, max_x, self.width)  else { return };
        let Some((y0, y1)) = pixel_span(min_y, max_y, self.height) else { return };

        let ex = b.x - a.x;
        let ey = b.y - a.y;
        let len_sq = ex * ex + ey * ey;
        let src = color.to_argb();

        for py in y0..y1 {
            for px in x0..x1 {
                let cx = px as f32 + 0.5;
                let cy = py as f32 + 0.5;
                let inside = if len_sq == 0.0 {
                    match cap {
                        LineCap::Round  => (cx - a.x).powi(2) + (cy - a.y).powi(2) <= r * r,
                        LineCap::Square => (cx - a.x).abs() <= r && (cy - a.y).abs() <= r,
                        LineCap::Butt   => false,
                    }
                } else {
                    let t = ((cx - a.x) * ex + (cy - a.y) * ey) / len_sq;
                    let t = match cap {
                        LineCap::Round => t.clamp(0.0, 1.0),
                        _ if !(0.0..=1.0).contains(&t) => continue,
                        _ => t,
                    };
                    let qx = a.x + t * ex - cx;
                    let qy = a.y + t * ey - cy;
                    qx * qx + qy * qy <= r * r
                };
                if inside {
                    let i = py * self.width as usize + px;
                    self.pixels[i] = blend_over(src, self.pixels[i]);
                }
            }
        }
    }

    /// Filled disc, used for landmark dots.
    pub fn fill_disc(&mut self, center: CanvasPoint, radius: f32, color: Rgba) {
        self.stamp_segment(center, center, color, radius * 2.0, LineCap::Round);
    }
}

impl SegmentSink for Canvas {
    fn stamp_segment(&mut self, seg: &StrokeSegment) {
        Canvas::stamp_segment(self, seg.from, seg.to, seg.color, seg.width, seg.cap);
    }
}

/// Pixel index range `[start, end)` whose centres may fall in `[lo, hi]`.
fn pixel_span(lo: f32, hi: f32, size: u32) -> Option<(usize, usize)> {
    if !lo.is_finite() || !hi.is_finite() { return None; }
    let start = lo.floor().max(0.0) as usize;
    let end   = (hi.ceil().max(0.0) as usize).min(size as usize);
    (start < end).then_some((start, end))
}

/// Source-over compositing of straight-alpha ARGB pixels.
pub fn blend_over(src: u32, dst: u32) -> u32 {
    let sa = (src >> 24) & 0xFF;
    if sa == 0xFF { return src; }
    if sa == 0    { return dst; }
    let da = (dst >> 24) & 0xFF;

    let sa_f = sa as f32 / 255.0;
    let da_f = da as f32 / 255.0 * (1.0 - sa_f);
    let out_a = sa_f + da_f;

    let channel = |shift: u32| {
        let s = ((src >> shift) & 0xFF) as f32;
        let d = ((dst >> shift) & 0xFF) as f32;
        (((s * sa_f + d * da_f) / out_a).round() as u32).min(255)
    };
    let a = (out_a * 255.0).round() as u32;
    (a << 24) | (channel(16) << 16) | (channel(8) << 8) | channel(0)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: u32 = 0xFF000000;

    fn pt(x: f32, y: f32) -> CanvasPoint { CanvasPoint::new(x, y) }

    fn horizontal(cap: LineCap) -> Canvas {
        let mut c = Canvas::new(100, 40);
        c.stamp_segment(pt(30.0, 20.0), pt(70.0, 20.0), Rgba::BLACK, 10.0, cap);
        c
    }

    // ── stamping ─────────────────────────────────────────────────────────

    #[test]
    fn new_canvas_is_blank() {
        assert!(Canvas::new(10, 10).is_blank());
    }

    #[test]
    fn segment_covers_its_body() {
        let c = horizontal(LineCap::Butt);
        assert_eq!(c.pixel(50, 20), Some(BLACK));
        assert_eq!(c.pixel(50, 16), Some(BLACK));
        assert_eq!(c.pixel(50, 26), Some(CLEAR));
        assert_eq!(c.pixel(50, 5),  Some(CLEAR));
    }

    #[test]
    fn butt_cap_stops_at_endpoints() {
        let c = horizontal(LineCap::Butt);
        assert_eq!(c.pixel(30, 20), Some(BLACK));
        assert_eq!(c.pixel(28, 20), Some(CLEAR));
        assert_eq!(c.pixel(71, 20), Some(CLEAR));
    }

    #[test]
    fn square_cap_extends_by_half_width() {
        let c = horizontal(LineCap::Square);
        assert_eq!(c.pixel(26, 20), Some(BLACK));
        assert_eq!(c.pixel(73, 20), Some(BLACK));
        // corners of the extension are filled too
        assert_eq!(c.pixel(26, 16), Some(BLACK));
        assert_eq!(c.pixel(23, 20), Some(CLEAR));
    }

    #[test]
    fn round_cap_is_a_half_disc() {
        let c = horizontal(LineCap::Round);
        assert_eq!(c.pixel(26, 20), Some(BLACK));
        // the corner a square cap would fill stays empty
        assert_eq!(c.pixel(25, 15), Some(CLEAR));
    }

    #[test]
    fn zero_length_round_is_a_dot_butt_is_nothing() {
        let mut c = Canvas::new(20, 20);
        c.stamp_segment(pt(10.0, 10.0), pt(10.0, 10.0), Rgba::BLACK, 6.0, LineCap::Butt);
        assert!(c.is_blank());
        c.stamp_segment(pt(10.0, 10.0), pt(10.0, 10.0), Rgba::BLACK, 6.0, LineCap::Round);
        assert_eq!(c.pixel(10, 10), Some(BLACK));
        assert_eq!(c.pixel(10, 17), Some(CLEAR));
    }

    #[test]
    fn off_canvas_segment_is_clipped() {
        let mut c = Canvas::new(10, 10);
        c.stamp_segment(pt(-50.0, -50.0), pt(-20.0, -20.0), Rgba::BLACK, 4.0, LineCap::Round);
        assert!(c.is_blank());
        c.stamp_segment(pt(-5.0, 5.0), pt(50.0, 5.0), Rgba::BLACK, 2.0, LineCap::Round);
        assert_eq!(c.pixel(0, 5), Some(BLACK));
        assert_eq!(c.pixel(9, 5), Some(BLACK));
    }

    #[test]
    fn diagonal_segment() {
        let mut c = Canvas::new(50, 50);
        c.stamp_segment(pt(5.0, 5.0), pt(45.0, 45.0), Rgba::BLACK, 3.0, LineCap::Butt);
        assert_eq!(c.pixel(25, 25), Some(BLACK));
        assert_eq!(c.pixel(25, 35), Some(CLEAR));
    }

    #[test]
    fn segment_sink_impl_stamps() {
        let mut c = Canvas::new(20, 20);
        let seg = StrokeSegment {
            from: pt(2.0, 10.0), to: pt(18.0, 10.0),
            color: Rgba::RED, width: 2.0, cap: LineCap::Round,
        };
        SegmentSink::stamp_segment(&mut c, &seg);
        assert_eq!(c.pixel(10, 10), Some(Rgba::RED.to_argb()));
    }

    // ── compositing ──────────────────────────────────────────────────────

    #[test]
    fn opaque_source_replaces() {
        assert_eq!(blend_over(0xFF112233, 0xFFFFFFFF), 0xFF112233);
    }

    #[test]
    fn transparent_source_keeps_destination() {
        assert_eq!(blend_over(0x00112233, 0xFF445566), 0xFF445566);
    }

    #[test]
    fn half_alpha_over_clear_keeps_color() {
        let out = blend_over(0x80FF0000, CLEAR);
        assert_eq!(out & 0x00FFFFFF, 0x00FF0000);
        assert_eq!(out >> 24, 0x80);
    }

    #[test]
    fn half_alpha_over_opaque_mixes() {
        let out = blend_over(0x80FFFFFF, 0xFF000000);
        assert_eq!(out >> 24, 0xFF);
        let r = (out >> 16) & 0xFF;
        assert!((126..=130).contains(&r), "r = {}", r);
    }

    // ── clear / resize ───────────────────────────────────────────────────

    #[test]
    fn clear_twice_equals_clear_once() {
        let mut once = horizontal(LineCap::Round);
        once.clear();
        let mut twice = horizontal(LineCap::Round);
        twice.clear();
        twice.clear();
        assert_eq!(once, twice);
        assert!(twice.is_blank());
    }

    #[test]
    fn resize_wipes_contents() {
        let mut c = horizontal(LineCap::Round);
        c.resize(50, 50);
        assert_eq!((c.width(), c.height()), (50, 50));
        assert!(c.is_blank());
    }

    #[test]
    fn resize_to_same_size_keeps_contents() {
        let mut c = horizontal(LineCap::Round);
        c.resize(100, 40);
        assert!(!c.is_blank());
    }
}
