//! Hand landmarks as produced by a hand-pose detector.
//!
//! A detection is an ordered list of keypoints in **video-pixel** space.
//! Index positions follow the usual 21-point anatomical convention:
//!
//! ```text
//!            8   12  16  20
//!            |   |   |   |
//!        4   7   11  15  19
//!        |   |   |   |   |
//!        3   6   10  14  18
//!         \  |   |   |   |
//!          2 5 - 9 - 13- 17
//!           \|          /
//!            1        /
//!             \     /
//!               0            (0 = wrist)
//! ```
//!
//! Landmarks carry no identity between frames; every frame is judged on
//! its raw positions alone.

/// Number of keypoints in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

/// Skeleton bones drawn by the overlay, as `[from, to]` landmark indices.
pub const HAND_CONNECTIONS: [[usize; 2]; 20] = [
    [0, 1],   [1, 2],   [2, 3],   [3, 4],   // thumb
    [0, 5],   [5, 6],   [6, 7],   [7, 8],   // index
    [5, 9],   [9, 10],  [10, 11], [11, 12], // middle
    [9, 13],  [13, 14], [14, 15], [15, 16], // ring
    [13, 17], [17, 18], [18, 19], [19, 20], // pinky
];

/// One keypoint in video-pixel coordinates. `z` is relative depth and is
/// ignored by the drawing pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VideoPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl VideoPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        VideoPoint { x, y, z: 0.0 }
    }

    pub const fn with_depth(x: f32, y: f32, z: f32) -> Self {
        VideoPoint { x, y, z }
    }
}

/// The keypoint list of one detected hand.
///
/// Normally [`LANDMARK_COUNT`] long, but detectors may hand back partial
/// lists; accessors return `None` rather than panicking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HandLandmarks {
    points: Vec<VideoPoint>,
}

impl HandLandmarks {
    pub fn new(points: Vec<VideoPoint>) -> Self {
        HandLandmarks { points }
    }

    pub fn get(&self, index: usize) -> Option<VideoPoint> {
        self.points.get(index).copied()
    }

    pub fn thumb_tip(&self) -> Option<VideoPoint> { self.get(THUMB_TIP) }
    pub fn index_tip(&self) -> Option<VideoPoint> { self.get(INDEX_TIP) }

    pub fn points(&self) -> &[VideoPoint] { &self.points }
    pub fn len(&self)    -> usize         { self.points.len() }
    pub fn is_empty(&self) -> bool        { self.points.is_empty() }

    /// True when all 21 keypoints are present.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    /// Mirror every keypoint around the vertical centre line of a frame
    /// `video_width` pixels wide.
    pub fn mirrored(&self, video_width: f32) -> HandLandmarks {
        HandLandmarks {
            points: self.points.iter()
                .map(|p| VideoPoint { x: video_width - p.x, ..*p })
                .collect(),
        }
    }
}

impl From<Vec<VideoPoint>> for HandLandmarks {
    fn from(points: Vec<VideoPoint>) -> Self {
        HandLandmarks::new(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn hand() -> HandLandmarks {
        (0..LANDMARK_COUNT)
            .map(|i| VideoPoint::new(i as f32 * 10.0, 5.0))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn tips_are_indices_4_and_8() {
        let h = hand();
        assert_eq!(h.thumb_tip(), Some(VideoPoint::new(40.0, 5.0)));
        assert_eq!(h.index_tip(), Some(VideoPoint::new(80.0, 5.0)));
    }

    #[test]
    fn partial_hand_has_no_index_tip() {
        let h = HandLandmarks::new(vec![VideoPoint::default(); 6]);
        assert!(h.thumb_tip().is_some());
        assert!(h.index_tip().is_none());
        assert!(!h.is_complete());
    }

    #[test]
    fn connections_cover_every_keypoint() {
        let mut seen = [false; LANDMARK_COUNT];
        for [a, b] in HAND_CONNECTIONS {
            seen[a] = true;
            seen[b] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn mirrored_flips_x_only() {
        let h = HandLandmarks::new(vec![VideoPoint::with_depth(100.0, 20.0, -3.0)]);
        let m = h.mirrored(640.0);
        assert_eq!(m.get(0), Some(VideoPoint::with_depth(540.0, 20.0, -3.0)));
    }
}
