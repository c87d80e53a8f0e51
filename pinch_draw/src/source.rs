//! Hand-landmark sources, both simulated and from LeapMotion hardware.
//!
//! The detection cycle only sees the [`LandmarkSource`] trait. It doesn't
//! need to know whether keypoints came from a sensor or from the mouse.

use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};

use pinch_core::landmark::LANDMARK_COUNT;
use pinch_core::{HandLandmarks, VideoPoint};

use crate::camera::VideoFrame;
use crate::error::AppError;

// ════════════════════════════════════════════════════════════════════════════
// Detection types
// ════════════════════════════════════════════════════════════════════════════

/// Parameters handed to the model on every call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Mirror keypoints so they line up with a selfie-style display.
    pub flip_horizontal:       bool,
    /// Frames a model may track before re-running full detection.
    pub max_continuous_checks: u32,
    /// Detections scoring below this are dropped.
    pub detection_confidence:  f32,
    /// Overlap threshold for suppressing duplicate boxes.
    pub iou_threshold:         f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            flip_horizontal:       true,
            max_continuous_checks: 5,
            detection_confidence:  0.7,
            iou_threshold:         0.3,
        }
    }
}

/// One detected hand. Only the first detection of a frame is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct HandDetection {
    pub landmarks: HandLandmarks,
    pub score:     f32,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can turn a video frame into hand keypoints.
///
/// Runs on the detector thread, hence `Send`. An `Err` is a per-frame
/// failure; the caller treats it as "no hand" and keeps going.
pub trait LandmarkSource: Send {
    fn estimate_hands(
        &mut self,
        frame: &VideoFrame,
        cfg:   &DetectionConfig,
    ) -> Result<Vec<HandDetection>, AppError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Hand synthesised from the mouse cursor and the P key.
    #[default]
    Sim,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

/// Load the landmark model. `sim_rx` feeds the simulated hand and is
/// dropped for any other model.
pub fn load_model(
    kind:   ModelKind,
    sim_rx: Receiver<SimHandInput>,
) -> Result<Box<dyn LandmarkSource>, AppError> {
    tracing::info!(?kind, "loading hand landmark model");
    match kind {
        ModelKind::Sim  => Ok(Box::new(SimLandmarkSource::new(sim_rx))),
        #[cfg(feature = "leap")]
        ModelKind::Leap => Ok(Box::new(LeapLandmarkSource::open()?)),
        #[cfg(not(feature = "leap"))]
        ModelKind::Leap => Err(AppError::ModelLoadFailure(
            "built without the `leap` feature".into(),
        )),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource: mouse-driven hand (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Input from the window that steers the simulated hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimHandInput {
    /// Cursor position as a fraction of the drawing area, `0.0..=1.0`.
    MoveTo { u: f32, v: f32 },
    /// Cursor left the drawing area: hand out of view.
    Hide,
    /// Pinch key pressed or released.
    Pinch(bool),
}

/// Thumb–index gap as a fraction of frame width.
const PINCH_GAP: f32 = 0.01;
const OPEN_GAP:  f32 = 0.15;
/// Palm size as a fraction of frame width.
const HAND_SCALE: f32 = 0.1;
const SIM_SCORE:  f32 = 0.95;

/// A hand whose thumb and index tips straddle the cursor, pinched while
/// the pinch key is held.
pub struct SimLandmarkSource {
    rx:       Receiver<SimHandInput>,
    pos:      Option<(f32, f32)>,
    pinching: bool,
}

impl SimLandmarkSource {
    pub fn new(rx: Receiver<SimHandInput>) -> Self {
        SimLandmarkSource { rx, pos: None, pinching: false }
    }

    fn drain(&mut self) {
        while let Ok(input) = self.rx.try_recv() {
            match input {
                SimHandInput::MoveTo { u, v } => self.pos = Some((u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))),
                SimHandInput::Hide            => self.pos = None,
                SimHandInput::Pinch(on)       => self.pinching = on,
            }
        }
    }
}

impl LandmarkSource for SimLandmarkSource {
    fn estimate_hands(
        &mut self,
        frame: &VideoFrame,
        cfg:   &DetectionConfig,
    ) -> Result<Vec<HandDetection>, AppError> {
        self.drain();
        let Some((u, v)) = self.pos else { return Ok(Vec::new()) };

        let w   = frame.width  as f32;
        let h   = frame.height as f32;
        let gap = if self.pinching { PINCH_GAP } else { OPEN_GAP } * w;
        let mut hand = synth_hand(u * w, v * h, gap, w * HAND_SCALE);
        // The sensor sees the user un-mirrored.
        if !cfg.flip_horizontal {
            hand = hand.mirrored(w);
        }

        let det = HandDetection { landmarks: hand, score: SIM_SCORE };
        Ok(if det.score >= cfg.detection_confidence { vec![det] } else { Vec::new() })
    }
}

/// Build a plausible 21-point right hand whose thumb and index tips sit
/// `gap` apart, centred on `(cx, cy)`. `unit` is roughly the palm width.
pub fn synth_hand(cx: f32, cy: f32, gap: f32, unit: f32) -> HandLandmarks {
    let at = |dx: f32, dy: f32| VideoPoint::new(cx + dx * unit, cy + dy * unit);
    let thumb_tip = VideoPoint::new(cx - gap / 2.0, cy);
    let index_tip = VideoPoint::new(cx + gap / 2.0, cy);

    let mut pts = Vec::with_capacity(LANDMARK_COUNT);
    pts.push(at(0.2, 1.8));                                    // wrist
    let thumb_mcp = at(-0.6, 1.0);
    pts.extend([at(-0.3, 1.4), thumb_mcp, lerp(thumb_mcp, thumb_tip, 0.5), thumb_tip]);
    pts.extend(finger(at(0.3, 0.9), index_tip));
    pts.extend(finger(at(0.6, 0.95), at(0.7, -0.4)));         // middle
    pts.extend(finger(at(0.85, 1.05), at(1.0, -0.2)));        // ring
    pts.extend(finger(at(1.05, 1.2), at(1.3, 0.2)));          // pinky
    HandLandmarks::new(pts)
}

fn finger(mcp: VideoPoint, tip: VideoPoint) -> [VideoPoint; 4] {
    [mcp, lerp(mcp, tip, 1.0 / 3.0), lerp(mcp, tip, 2.0 / 3.0), tip]
}

fn lerp(a: VideoPoint, b: VideoPoint, t: f32) -> VideoPoint {
    VideoPoint::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// LeapC is polled on its own thread; each tracking frame is projected onto
/// the interaction box's front plane and sent here as normalised keypoints,
/// which [`estimate_hands`](LandmarkSource::estimate_hands) scales to the
/// frame size.
///
/// Keypoint order matches the 21-point convention: the palm centre stands
/// in for the wrist, then for each digit thumb→pinky the proximal base,
/// intermediate base, distal base and tip.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource {
    rx:     Receiver<Vec<HandLandmarks>>,
    latest: Vec<HandLandmarks>,
}

#[cfg(feature = "leap")]
impl LeapLandmarkSource {
    pub fn open() -> Result<Self, AppError> {
        use std::sync::mpsc;

        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || leap_thread(ready_tx, tx));

        match ready_rx.recv() {
            Ok(Ok(())) => {
                tracing::info!("LeapMotion connection open");
                Ok(LeapLandmarkSource { rx, latest: Vec::new() })
            }
            Ok(Err(e)) => Err(AppError::ModelLoadFailure(e)),
            Err(_)     => Err(AppError::ModelLoadFailure("LeapC thread exited".into())),
        }
    }
}

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn estimate_hands(
        &mut self,
        frame: &VideoFrame,
        cfg:   &DetectionConfig,
    ) -> Result<Vec<HandDetection>, AppError> {
        use std::sync::mpsc::TryRecvError;

        loop {
            match self.rx.try_recv() {
                Ok(hands)                       => self.latest = hands,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    return Err(AppError::DetectionTransientFailure("LeapC connection lost".into()));
                }
            }
        }

        let (w, h) = (frame.width as f32, frame.height as f32);
        Ok(self.latest.iter()
            .map(|norm| {
                let pts = norm.points().iter()
                    .map(|p| VideoPoint::with_depth(p.x * w, p.y * h, p.z))
                    .collect::<Vec<_>>();
                let hand = HandLandmarks::new(pts);
                let hand = if cfg.flip_horizontal { hand } else { hand.mirrored(w) };
                HandDetection { landmarks: hand, score: 1.0 }
            })
            .collect())
    }
}

#[cfg(feature = "leap")]
fn leap_thread(
    ready: std::sync::mpsc::Sender<Result<(), String>>,
    tx:    std::sync::mpsc::Sender<Vec<HandLandmarks>>,
) {
    use leaprs::*;

    // Interaction box, millimetres above the device.
    const SPAN_X: f32 = 400.0;
    const FLOOR:  f32 = 80.0;
    const SPAN_Y: f32 = 400.0;

    let project = |x: f32, y: f32, z: f32| VideoPoint::with_depth(
        ((x + SPAN_X / 2.0) / SPAN_X).clamp(0.0, 1.0),
        (1.0 - (y - FLOOR) / SPAN_Y).clamp(0.0, 1.0),
        z,
    );

    let mut connection = match Connection::create(ConnectionConfig::default()) {
        Ok(c)  => c,
        Err(e) => { let _ = ready.send(Err(format!("LeapC connection: {:?}", e))); return; }
    };
    if let Err(e) = connection.open() {
        let _ = ready.send(Err(format!("LeapMotion device: {:?}", e)));
        return;
    }
    let _ = ready.send(Ok(()));

    loop {
        let msg = match connection.poll(100) {
            Ok(m)  => m,
            Err(_) => continue,
        };

        if let Event::Tracking(frame) = msg.event() {
            let hands: Vec<HandLandmarks> = frame.hands()
                .map(|hand| {
                    let palm = hand.palm().position();
                    let mut pts = vec![project(palm.x, palm.y, palm.z)];
                    for digit in hand.digits() {
                        let joints = [
                            digit.proximal().prev_joint(),
                            digit.intermediate().prev_joint(),
                            digit.distal().prev_joint(),
                            digit.distal().next_joint(),
                        ];
                        pts.extend(joints.iter().map(|j| project(j.x, j.y, j.z)));
                    }
                    HandLandmarks::new(pts)
                })
                .collect();
            if tx.send(hands).is_err() { return; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
