//! The detection cycle: a worker thread running the landmark model, plus
//! the frame pacing used by the main loop.
//!
//! ```text
//!   main loop                         detector thread
//!   ─────────                         ───────────────
//!   submit(gen, frame) ──Detect──►    source.estimate_hands(frame)
//!        (busy = true)                         │
//!   poll() ◄──────────DetectOutcome────────────┘
//!        (busy = false, drop if gen is stale)
//! ```
//!
//! At most one request is in flight: [`Detector::submit`] refuses while the
//! previous result has not been collected. Every result carries the
//! generation it was submitted under, so results from a camera session
//! that has since ended can be recognised and dropped. A worker that has
//! exited (a panicking model, or a thread that never started) shows up as
//! [`AppError::DetectorStopped`] from [`Detector::poll`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::camera::VideoFrame;
use crate::error::AppError;
use crate::source::{DetectionConfig, HandDetection, LandmarkSource};

/// ~60 frames per second.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

// ════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════

enum DetectorCommand {
    Detect { generation: u64, frame: VideoFrame },
    Quit,
}

/// A finished detection, sent back to the main loop.
#[derive(Debug)]
pub struct DetectOutcome {
    pub generation: u64,
    pub frame:      VideoFrame,
    pub result:     Result<Vec<HandDetection>, AppError>,
}

// ════════════════════════════════════════════════════════════════════════════
// Detector: handle to the worker thread
// ════════════════════════════════════════════════════════════════════════════

pub struct Detector {
    cmd_tx:     Sender<DetectorCommand>,
    outcome_rx: Receiver<DetectOutcome>,
    in_flight:  bool,
    handle:     Option<JoinHandle<()>>,
}

impl Detector {
    /// Spawn the worker. `source` is moved onto the thread and never
    /// touched from the main loop again.
    pub fn spawn(source: Box<dyn LandmarkSource>, cfg: DetectionConfig) -> Self {
        let (cmd_tx, cmd_rx)         = mpsc::channel::<DetectorCommand>();
        let (outcome_tx, outcome_rx) = mpsc::channel::<DetectOutcome>();

        let handle = thread::Builder::new()
            .name("detector".into())
            .spawn(move || detector_thread(source, cfg, cmd_rx, outcome_tx))
            .map_err(|e| tracing::error!(%e, "could not spawn detector thread"))
            .ok();

        Detector { cmd_tx, outcome_rx, in_flight: false, handle }
    }

    pub fn is_busy(&self) -> bool { self.in_flight }

    /// Queue one frame. Returns `false` (and does nothing) while a previous
    /// request is still outstanding or the worker is gone.
    pub fn submit(&mut self, generation: u64, frame: VideoFrame) -> bool {
        if self.in_flight { return false; }
        if self.cmd_tx.send(DetectorCommand::Detect { generation, frame }).is_err() {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Collect a finished result without blocking. Fails once the worker
    /// is gone and every result it sent has been collected.
    pub fn poll(&mut self) -> Result<Option<DetectOutcome>, AppError> {
        match self.outcome_rx.try_recv() {
            Ok(o) => { self.in_flight = false; Ok(Some(o)) }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.in_flight = false;
                Err(AppError::DetectorStopped("detector thread exited".into()))
            }
        }
    }
}

impl Drop for Detector {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(DetectorCommand::Quit);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn detector_thread(
    mut source: Box<dyn LandmarkSource>,
    cfg:        DetectionConfig,
    cmd_rx:     Receiver<DetectorCommand>,
    outcome_tx: Sender<DetectOutcome>,
) {
    tracing::debug!(?cfg, "detector thread started");
    for cmd in cmd_rx {
        match cmd {
            DetectorCommand::Detect { generation, frame } => {
                let result = source.estimate_hands(&frame, &cfg);
                if outcome_tx.send(DetectOutcome { generation, frame, result }).is_err() {
                    return;
                }
            }
            DetectorCommand::Quit => break,
        }
    }
    tracing::debug!("detector thread stopped");
}

// ════════════════════════════════════════════════════════════════════════════
// Frame pacing
// ════════════════════════════════════════════════════════════════════════════

/// Paces the main loop, one call per iteration.
pub trait FrameScheduler {
    fn wait_next_frame(&mut self);
}

/// Sleeps out whatever is left of a fixed interval since the last frame.
pub struct IntervalScheduler {
    interval: Duration,
    last:     Option<Instant>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        IntervalScheduler { interval, last: None }
    }
}

impl Default for IntervalScheduler {
    fn default() -> Self { Self::new(FRAME_INTERVAL) }
}

impl FrameScheduler for IntervalScheduler {
    fn wait_next_frame(&mut self) {
        if let Some(last) = self.last {
            if let Some(rest) = self.interval.checked_sub(last.elapsed()) {
                thread::sleep(rest);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// No pacing at all.
#[derive(Default)]
pub struct ImmediateScheduler;

impl FrameScheduler for ImmediateScheduler {
    fn wait_next_frame(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_core::{HandLandmarks, VideoPoint};

    const WAIT: Duration = Duration::from_secs(2);

    /// Poll until something other than "not ready yet" comes back.
    fn wait(d: &mut Detector) -> Result<DetectOutcome, AppError> {
        let t0 = Instant::now();
        while t0.elapsed() < WAIT {
            if let Some(o) = d.poll()? { return Ok(o); }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("no detection result within {:?}", WAIT);
    }

    /// Echoes the frame sequence number back as the x of a one-point hand.
    struct EchoSource;

    impl LandmarkSource for EchoSource {
        fn estimate_hands(
            &mut self,
            frame: &VideoFrame,
            _cfg:  &DetectionConfig,
        ) -> Result<Vec<HandDetection>, AppError> {
            if frame.seq == 0 {
                return Err(AppError::DetectionTransientFailure("seq 0".into()));
            }
            let hand = HandLandmarks::new(vec![VideoPoint::new(frame.seq as f32, 0.0)]);
            Ok(vec![HandDetection { landmarks: hand, score: 1.0 }])
        }
    }

    /// Dies on the first frame.
    struct PanicSource;

    impl LandmarkSource for PanicSource {
        fn estimate_hands(
            &mut self,
            _frame: &VideoFrame,
            _cfg:   &DetectionConfig,
        ) -> Result<Vec<HandDetection>, AppError> {
            panic!("model crashed");
        }
    }

    fn frame(seq: u64) -> VideoFrame {
        VideoFrame { seq, width: 640, height: 480 }
    }

    #[test]
    fn result_comes_back_tagged() {
        let mut d = Detector::spawn(Box::new(EchoSource), DetectionConfig::default());
        assert!(d.submit(7, frame(3)));
        let out = wait(&mut d).unwrap();
        assert_eq!(out.generation, 7);
        assert_eq!(out.frame.seq, 3);
        assert_eq!(out.result.unwrap()[0].landmarks.get(0).unwrap().x, 3.0);
    }

    #[test]
    fn one_request_in_flight() {
        let mut d = Detector::spawn(Box::new(EchoSource), DetectionConfig::default());
        assert!(d.submit(1, frame(1)));
        assert!(d.is_busy());
        assert!(!d.submit(1, frame(2)));
        wait(&mut d).unwrap();
        assert!(!d.is_busy());
        assert!(d.submit(1, frame(2)));
    }

    #[test]
    fn errors_are_delivered_not_fatal() {
        let mut d = Detector::spawn(Box::new(EchoSource), DetectionConfig::default());
        d.submit(1, frame(0));
        assert!(wait(&mut d).unwrap().result.is_err());
        d.submit(1, frame(5));
        assert!(wait(&mut d).unwrap().result.is_ok());
    }

    #[test]
    fn poll_is_non_blocking() {
        let mut d = Detector::spawn(Box::new(EchoSource), DetectionConfig::default());
        assert!(d.poll().unwrap().is_none());
    }

    #[test]
    fn dead_worker_is_reported() {
        let mut d = Detector::spawn(Box::new(PanicSource), DetectionConfig::default());
        assert!(d.submit(1, frame(1)));
        assert!(matches!(wait(&mut d), Err(AppError::DetectorStopped(_))));
        assert!(!d.is_busy());
        // stays reported, and dropping the handle does not hang
        assert!(d.poll().is_err());
    }

    #[test]
    fn interval_scheduler_paces() {
        let mut s = IntervalScheduler::new(Duration::from_millis(10));
        let t0 = Instant::now();
        for _ in 0..4 { s.wait_next_frame(); }
        assert!(t0.elapsed() >= Duration::from_millis(30));
    }
}
