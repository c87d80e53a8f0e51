//! # pinch_core
//!
//! The gesture-to-drawing core: turns a stream of hand-landmark detections
//! (or pointer samples) into connected stroke segments.
//!
//! ```text
//!  landmarks (video px) ──► mapper ──► classifier ──► StrokeController ──► SegmentSink
//!                          (canvas px)  (pinch/release)  (Idle/Pinching)     (raster)
//! ```
//!
//! * [`mapper`] rescales video-pixel keypoints into canvas pixels.
//! * [`classifier`] reduces thumb tip + index tip to a [`PinchState`].
//! * [`stroke`] is the two-state machine that emits [`StrokeSegment`]s.
//! * [`brush`] holds the live [`BrushConfig`] read at emission time.
//!
//! No I/O happens here; the drawing surface is anything implementing
//! [`SegmentSink`].
//!
//! ## Quick start
//!
//! ```rust
//! use pinch_core::{BrushConfig, CanvasPoint, PinchClassifier, StrokeController};
//!
//! let classifier = PinchClassifier::default();
//! let brush      = BrushConfig::default();
//! let mut ctl    = StrokeController::new();
//!
//! let a = classifier.classify(Some(CanvasPoint::new(100.0, 100.0)),
//!                             Some(CanvasPoint::new(130.0, 100.0)));
//! assert!(ctl.apply_pinch(a, &brush).is_none());     // pen down, anchor only
//!
//! let b = classifier.classify(Some(CanvasPoint::new(100.0, 140.0)),
//!                             Some(CanvasPoint::new(130.0, 140.0)));
//! let seg = ctl.apply_pinch(b, &brush).unwrap();
//! assert_eq!(seg.from, CanvasPoint::new(115.0, 100.0));
//! assert_eq!(seg.to,   CanvasPoint::new(115.0, 140.0));
//! ```

pub mod brush;
pub mod classifier;
pub mod error;
pub mod landmark;
pub mod mapper;
pub mod stroke;

pub use brush::{BrushConfig, BrushKind, LineCap, Rgba};
pub use classifier::{PinchClassifier, PinchState, DEFAULT_PINCH_THRESHOLD};
pub use error::CoreError;
pub use landmark::{HandLandmarks, VideoPoint, HAND_CONNECTIONS};
pub use mapper::{map_point, CanvasPoint, FrameDims};
pub use stroke::{SegmentSink, StrokeController, StrokeSegment, StrokeState};
