//! Top-level application state machine.
//!
//! `AppState` owns the canvas, the overlay, the brush, both stroke
//! controllers (hand and pointer), the camera and the detector handle. It
//! processes window actions and detection results and is rendered by the
//! visualizer each frame. Everything here runs on the main loop thread;
//! only the landmark model lives on the detector thread.

use std::path::PathBuf;
use std::sync::mpsc;

use pinch_canvas::{save_png, today_utc, Canvas, Overlay};
use pinch_core::{
    map_point, BrushConfig, BrushKind, CanvasPoint, FrameDims, PinchClassifier, PinchState,
    Rgba, SegmentSink, StrokeController, StrokeState,
};

use crate::camera::{CameraConstraints, SimCamera, VideoSource};
use crate::config::AppConfig;
use crate::detect::{DetectOutcome, Detector, FrameScheduler, IntervalScheduler};
use crate::error::AppError;
use crate::pointer::{PointerAdapter, PointerEvent};
use crate::source::{load_model, DetectionConfig, HandDetection, LandmarkSource, SimHandInput};
use crate::visualizer::{UiAction, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// Indicators
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel { Info, Ok, Busy, Error }

/// Status-bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub text:  String,
}

impl Status {
    fn new(level: StatusLevel, text: impl Into<String>) -> Self {
        Status { level, text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    Failed(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── drawing ───────────────────────────────────────────────────────────
    canvas:     Canvas,
    overlay:    Overlay,
    brush:      BrushConfig,
    palette:    Vec<Rgba>,
    palette_at: usize,

    // ── input paths ───────────────────────────────────────────────────────
    classifier: PinchClassifier,
    gesture:    StrokeController,
    pointer:    PointerAdapter,

    // ── camera + detection ────────────────────────────────────────────────
    camera:      Box<dyn VideoSource>,
    constraints: CameraConstraints,
    detection:   DetectionConfig,
    detector:    Option<Detector>,
    model:       ModelStatus,
    camera_on:   bool,
    /// Bumped on every camera start and stop.
    generation:  u64,

    // ── indicators ────────────────────────────────────────────────────────
    status:      Status,
    drawing_on:  bool,

    export_dir:  PathBuf,
}

impl AppState {
    /// `model` is the outcome of loading the landmark model; on failure the
    /// gesture path stays disabled but everything else works.
    pub fn new(
        cfg:           &AppConfig,
        canvas_width:  u32,
        canvas_height: u32,
        camera:        Box<dyn VideoSource>,
        model:         Result<Box<dyn LandmarkSource>, AppError>,
    ) -> Self {
        let mut app = Self::loading(cfg, canvas_width, canvas_height, camera);
        app.attach_model(model);
        app
    }

    /// An app still waiting for its landmark model. Pointer drawing already
    /// works; call [`attach_model`](Self::attach_model) once loading ends.
    pub fn loading(
        cfg:           &AppConfig,
        canvas_width:  u32,
        canvas_height: u32,
        camera:        Box<dyn VideoSource>,
    ) -> Self {
        AppState {
            canvas:      Canvas::new(canvas_width, canvas_height),
            overlay:     Overlay::new(canvas_width, canvas_height),
            brush:       cfg.initial_brush(),
            palette:     cfg.palette.clone(),
            palette_at:  0,
            classifier:  PinchClassifier::new(cfg.pinch_threshold),
            gesture:     StrokeController::new(),
            pointer:     PointerAdapter::new(),
            camera,
            constraints: cfg.camera,
            detection:   cfg.detection,
            detector:    None,
            model:       ModelStatus::Loading,
            camera_on:   false,
            generation:  0,
            status:      Status::new(StatusLevel::Busy, "loading model..."),
            drawing_on:  false,
            export_dir:  cfg.export_dir.clone(),
        }
    }

    pub fn attach_model(&mut self, model: Result<Box<dyn LandmarkSource>, AppError>) {
        match model {
            Ok(source) => {
                tracing::info!("hand landmark model loaded");
                self.detector = Some(Detector::spawn(source, self.detection));
                self.model    = ModelStatus::Ready;
                self.status   = Status::new(StatusLevel::Ok,
                    "model loaded - keep your hand 30-50 cm from the camera");
            }
            Err(e) => {
                tracing::error!(%e, "hand landmark model unavailable");
                self.detector = None;
                self.model    = ModelStatus::Failed(e.to_string());
                self.status   = Status::new(StatusLevel::Error,
                    "model failed to load - mouse drawing still works");
            }
        }
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn canvas(&self)        -> &Canvas       { &self.canvas }
    pub fn overlay(&self)       -> &Overlay      { &self.overlay }
    pub fn brush(&self)         -> &BrushConfig  { &self.brush }
    pub fn status(&self)        -> &Status       { &self.status }
    pub fn model_status(&self)  -> &ModelStatus  { &self.model }
    pub fn camera_on(&self)     -> bool          { self.camera_on }
    pub fn generation(&self)    -> u64           { self.generation }
    pub fn gesture_state(&self) -> StrokeState   { self.gesture.state() }

    /// Drawing-mode indicator: a pinch is currently held.
    pub fn drawing_active(&self) -> bool { self.drawing_on }

    // ── camera ────────────────────────────────────────────────────────────

    pub fn toggle_camera(&mut self) {
        if self.camera_on {
            self.stop_camera();
        } else {
            // failure is already reflected in the status bar
            let _ = self.start_camera();
        }
    }

    pub fn start_camera(&mut self) -> Result<(), AppError> {
        if self.camera_on { return Ok(()); }
        self.status = Status::new(StatusLevel::Busy, "starting camera...");
        if let Err(e) = self.camera.start(&self.constraints) {
            tracing::error!(%e, "camera start failed");
            self.status = Status::new(StatusLevel::Error, "camera access failed - check permissions");
            return Err(e);
        }
        self.camera_on = true;
        self.generation += 1;
        self.gesture.reset();
        self.status = match self.model {
            ModelStatus::Ready     => Status::new(StatusLevel::Ok, "camera on - pinch to draw"),
            ModelStatus::Loading   => Status::new(StatusLevel::Busy, "camera on - model still loading"),
            ModelStatus::Failed(_) => Status::new(StatusLevel::Error, "camera on, but no hand model"),
        };
        Ok(())
    }

    /// Halt detection synchronously. A result still in flight will arrive
    /// under the old generation and be dropped.
    pub fn stop_camera(&mut self) {
        self.camera.stop();
        self.camera_on = false;
        self.generation += 1;
        self.gesture.reset();
        self.drawing_on = false;
        self.overlay.clear();
        self.status = Status::new(StatusLevel::Info, "camera off");
    }

    // ── detection cycle ──────────────────────────────────────────────────

    /// One main-loop step of the detection cycle: collect a finished result,
    /// then request the next frame if the detector is idle.
    pub fn tick(&mut self) {
        while let Some(detector) = self.detector.as_mut() {
            match detector.poll() {
                Ok(Some(outcome)) => self.handle_detection(outcome),
                Ok(None)          => break,
                Err(e)            => self.detector_lost(e),
            }
        }

        if !self.camera_on { return; }
        let Some(detector) = self.detector.as_mut() else { return };
        if detector.is_busy() { return; }
        if let Some(frame) = self.camera.poll_frame() {
            detector.submit(self.generation, frame);
        }
    }

    pub fn handle_detection(&mut self, outcome: DetectOutcome) {
        if !self.camera_on || outcome.generation != self.generation {
            tracing::debug!(
                result_gen = outcome.generation, current_gen = self.generation,
                "discarding stale detection"
            );
            return;
        }

        let (hands, failed) = match outcome.result {
            Ok(hands) => (hands, false),
            Err(e) => {
                if e.is_transient() {
                    tracing::warn!(%e, seq = outcome.frame.seq, "detection failed, treating as no hand");
                } else {
                    tracing::error!(%e, seq = outcome.frame.seq, "detection failed, treating as no hand");
                }
                (Vec::new(), true)
            }
        };

        match hands.first() {
            None => {
                self.overlay.clear();
                self.apply_pinch(PinchState::Released);
                self.status = if failed {
                    Status::new(StatusLevel::Error, "detection error")
                } else {
                    Status::new(StatusLevel::Info, "no hand detected")
                };
            }
            Some(hand) => {
                let dims = FrameDims::new(
                    outcome.frame.width, outcome.frame.height,
                    self.canvas.width(), self.canvas.height(),
                );
                self.draw_overlay(hand, dims);
                match self.classifier.classify_hand(Some(&hand.landmarks), &dims) {
                    Ok(pinch) => {
                        self.apply_pinch(pinch);
                        self.status = Status::new(StatusLevel::Ok, "hand detected");
                    }
                    Err(e) => tracing::debug!(%e, seq = outcome.frame.seq, "frame skipped"),
                }
            }
        }
    }

    /// The worker is gone: end the gesture stroke as if the hand left, and
    /// fall back to pointer-only drawing.
    fn detector_lost(&mut self, e: AppError) {
        tracing::error!(%e, "hand detection stopped");
        self.detector = None;
        self.model    = ModelStatus::Failed(e.to_string());
        self.overlay.clear();
        self.apply_pinch(PinchState::Released);
        self.status = Status::new(StatusLevel::Error, "detection stopped - mouse drawing still works");
    }

    fn draw_overlay(&mut self, hand: &HandDetection, dims: FrameDims) {
        let dims = dims.with_canvas(self.overlay.layer().width(), self.overlay.layer().height());
        let points: Result<Vec<CanvasPoint>, _> = hand.landmarks.points().iter()
            .map(|&p| map_point(p, &dims))
            .collect();
        match points {
            Ok(points) => self.overlay.draw_hand(&points),
            Err(_)     => self.overlay.clear(),
        }
    }

    fn apply_pinch(&mut self, pinch: PinchState) {
        self.drawing_on = pinch.is_pinching();
        if let Some(seg) = self.gesture.apply_pinch(pinch, &self.brush) {
            SegmentSink::stamp_segment(&mut self.canvas, &seg);
        }
    }

    // ── pointer path ─────────────────────────────────────────────────────

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.pointer.handle(event, &self.brush, &mut self.canvas);
    }

    // ── canvas ────────────────────────────────────────────────────────────

    pub fn clear_canvas(&mut self) {
        self.canvas.clear();
        self.status = Status::new(StatusLevel::Info, "canvas cleared");
    }

    /// Save the drawing as `drawing-<date>.png` in the export directory.
    pub fn export(&mut self) -> Result<PathBuf, AppError> {
        match save_png(&self.canvas, &self.export_dir, today_utc()) {
            Ok(path) => {
                self.status = Status::new(StatusLevel::Ok, format!("saved {}", path.display()));
                Ok(path)
            }
            Err(e) => {
                tracing::error!(%e, dir = %self.export_dir.display(), "export failed");
                self.status = Status::new(StatusLevel::Error, "save failed - please try again");
                Err(e.into())
            }
        }
    }

    /// Canvas and overlay follow the window. Resizing wipes the drawing and
    /// ends any stroke in progress.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.canvas.width(), self.canvas.height()) { return; }
        self.canvas.resize(width, height);
        self.overlay.resize(width, height);
        self.gesture.reset();
        self.pointer.cancel();
    }

    // ── brush ─────────────────────────────────────────────────────────────

    pub fn set_color(&mut self, color: Rgba) {
        self.brush.color = color;
    }

    pub fn cycle_color(&mut self) {
        if self.palette.is_empty() { return; }
        self.palette_at = (self.palette_at + 1) % self.palette.len();
        self.brush.color = self.palette[self.palette_at];
    }

    pub fn adjust_brush_size(&mut self, delta: f32) {
        self.brush.adjust_width(delta);
    }

    pub fn set_brush_kind(&mut self, kind: BrushKind) {
        self.brush.kind = kind;
    }

    // ── window actions ───────────────────────────────────────────────────

    /// Apply one action from the window. Returns `false` on quit.
    pub fn handle_action(&mut self, action: UiAction) -> bool {
        match action {
            UiAction::Quit            => return false,
            UiAction::ToggleCamera    => self.toggle_camera(),
            UiAction::Clear           => self.clear_canvas(),
            UiAction::Save            => { let _ = self.export(); }
            UiAction::BrushKind(k)    => self.set_brush_kind(k),
            UiAction::BrushSize(d)    => self.adjust_brush_size(d),
            UiAction::NextColor       => self.cycle_color(),
            UiAction::Pointer(ev)     => self.handle_pointer(ev),
            UiAction::Resize(w, h)    => self.resize(w, h),
        }
        true
    }

    pub fn shutdown(&mut self) {
        if self.camera_on {
            self.stop_camera();
        }
        self.detector = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Main loop
// ════════════════════════════════════════════════════════════════════════════

/// What the main loop needs from a window.
pub trait Frontend {
    fn is_open(&self) -> bool;
    /// Input gathered since the last frame.
    fn poll_input(&mut self, camera_on: bool) -> Vec<UiAction>;
    fn render(&mut self, app: &AppState);
}

/// Drive `app` until the frontend closes or asks to quit. `scheduler`
/// paces every iteration; the stop flag is checked before each one.
/// Returns the number of frames rendered.
pub fn run_loop(
    app:       &mut AppState,
    frontend:  &mut dyn Frontend,
    scheduler: &mut dyn FrameScheduler,
) -> u64 {
    let mut frames  = 0;
    let mut running = true;
    while running && frontend.is_open() {
        scheduler.wait_next_frame();

        // 1. Window input
        for action in frontend.poll_input(app.camera_on()) {
            if !app.handle_action(action) {
                running = false;
                break;
            }
        }
        if !running { break; }

        // 2. Detection cycle
        app.tick();

        // 3. Render
        frontend.render(app);
        frames += 1;
    }
    frames
}

/// Open the window and drive the main loop until the user quits.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    // ── Visualizer (owns the window and the sim input sender) ────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimHandInput>();
    let mut vis = Visualizer::new(&cfg, sim_tx)?;
    let (w, h) = vis.canvas_size();

    // ── App state, shown while the model loads ──────────────────────────
    let mut app = AppState::loading(&cfg, w, h, Box::new(SimCamera::new()));
    vis.render(&app);
    app.attach_model(load_model(cfg.model, sim_rx));

    // ── Main loop ─────────────────────────────────────────────────────────
    let frames = run_loop(&mut app, &mut vis, &mut IntervalScheduler::default());

    app.shutdown();
    tracing::info!(frames, "window closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::VideoFrame;
    use pinch_core::landmark::{INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
    use pinch_core::{HandLandmarks, VideoPoint};

    /// A source that is never asked anything; tests feed outcomes directly.
    struct Idle;

    impl LandmarkSource for Idle {
        fn estimate_hands(
            &mut self,
            _frame: &VideoFrame,
            _cfg:   &DetectionConfig,
        ) -> Result<Vec<HandDetection>, AppError> {
            Ok(Vec::new())
        }
    }

    fn make_app() -> AppState {
        AppState::new(&AppConfig::default(), 640, 480, Box::new(SimCamera::new()), Ok(Box::new(Idle)))
    }

    fn hand(thumb: (f32, f32), index: (f32, f32)) -> HandDetection {
        let mut pts = vec![VideoPoint::new(320.0, 400.0); LANDMARK_COUNT];
        pts[THUMB_TIP] = VideoPoint::new(thumb.0, thumb.1);
        pts[INDEX_TIP] = VideoPoint::new(index.0, index.1);
        HandDetection { landmarks: HandLandmarks::new(pts), score: 1.0 }
    }

    fn outcome(app: &AppState, hands: Vec<HandDetection>) -> DetectOutcome {
        DetectOutcome {
            generation: app.generation(),
            frame:      VideoFrame { seq: 1, width: 640, height: 480 },
            result:     Ok(hands),
        }
    }

    // ── camera ───────────────────────────────────────────────────────────

    #[test]
    fn starts_with_camera_off_and_model_ready() {
        let app = make_app();
        assert!(!app.camera_on());
        assert_eq!(app.model_status(), &ModelStatus::Ready);
    }

    #[test]
    fn loading_then_attach() {
        let mut app = AppState::loading(&AppConfig::default(), 640, 480, Box::new(SimCamera::new()));
        assert_eq!(app.model_status(), &ModelStatus::Loading);
        assert_eq!(app.status().level, StatusLevel::Busy);
        assert_eq!(app.status().text, "loading model...");

        app.attach_model(Ok(Box::new(Idle)));
        assert_eq!(app.model_status(), &ModelStatus::Ready);
        assert_eq!(app.status().level, StatusLevel::Ok);
    }

    #[test]
    fn camera_can_start_before_model_is_ready() {
        let mut app = AppState::loading(&AppConfig::default(), 640, 480, Box::new(SimCamera::new()));
        app.start_camera().unwrap();
        app.tick();
        assert_eq!(app.status().level, StatusLevel::Busy);
        assert_eq!(app.gesture_state(), StrokeState::Idle);
    }

    #[test]
    fn toggle_flips_camera_and_bumps_generation() {
        let mut app = make_app();
        app.toggle_camera();
        assert!(app.camera_on());
        assert_eq!(app.generation(), 1);
        app.toggle_camera();
        assert!(!app.camera_on());
        assert_eq!(app.generation(), 2);
        assert_eq!(app.status().text, "camera off");
    }

    #[test]
    fn stop_camera_resets_stroke_and_overlay() {
        let mut app = make_app();
        app.start_camera().unwrap();
        let o = outcome(&app, vec![hand((100.0, 100.0), (110.0, 100.0))]);
        app.handle_detection(o);
        assert!(matches!(app.gesture_state(), StrokeState::Pinching { .. }));
        assert!(!app.overlay().layer().is_blank());

        app.stop_camera();
        assert_eq!(app.gesture_state(), StrokeState::Idle);
        assert!(app.overlay().layer().is_blank());
        assert!(!app.drawing_active());
    }

    // ── detection results ────────────────────────────────────────────────

    #[test]
    fn results_ignored_while_camera_off() {
        let mut app = make_app();
        let o = outcome(&app, vec![hand((100.0, 100.0), (110.0, 100.0))]);
        app.handle_detection(o);
        assert_eq!(app.gesture_state(), StrokeState::Idle);
    }

    #[test]
    fn open_hand_does_not_draw() {
        let mut app = make_app();
        app.start_camera().unwrap();
        for y in [100.0, 150.0] {
            let o = outcome(&app, vec![hand((100.0, y), (300.0, y))]);
            app.handle_detection(o);
        }
        assert!(app.canvas().is_blank());
        assert_eq!(app.status().text, "hand detected");
    }

    #[test]
    fn detection_error_counts_as_no_hand() {
        let mut app = make_app();
        app.start_camera().unwrap();
        let o = outcome(&app, vec![hand((100.0, 100.0), (110.0, 100.0))]);
        app.handle_detection(o);

        let mut o = outcome(&app, Vec::new());
        o.result = Err(AppError::DetectionTransientFailure("boom".into()));
        app.handle_detection(o);

        assert_eq!(app.gesture_state(), StrokeState::Idle);
        assert_eq!(app.status().level, StatusLevel::Error);
        assert!(app.camera_on());
    }

    #[test]
    fn missing_dimensions_skip_the_frame() {
        let mut app = make_app();
        app.start_camera().unwrap();
        let o = outcome(&app, vec![hand((100.0, 100.0), (110.0, 100.0))]);
        app.handle_detection(o);
        let before = app.gesture_state();

        let mut o = outcome(&app, vec![hand((400.0, 400.0), (410.0, 400.0))]);
        o.frame.width = 0;
        o.frame.height = 0;
        app.handle_detection(o);

        assert_eq!(app.gesture_state(), before);
        assert!(app.canvas().is_blank());
    }

    // ── brush / canvas ───────────────────────────────────────────────────

    #[test]
    fn colour_cycles_through_palette() {
        let mut app = make_app();
        assert_eq!(app.brush().color, Rgba::BLACK);
        app.cycle_color();
        assert_eq!(app.brush().color, Rgba::RED);
        for _ in 0..AppConfig::default().palette.len() - 1 { app.cycle_color(); }
        assert_eq!(app.brush().color, Rgba::BLACK);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut app = make_app();
        app.adjust_brush_size(-100.0);
        assert_eq!(app.brush().width, 1.0);
        app.adjust_brush_size(1000.0);
        assert_eq!(app.brush().width, 50.0);
    }

    #[test]
    fn brush_kind_changes_cap() {
        let mut app = make_app();
        app.set_brush_kind(BrushKind::Line);
        assert_eq!(app.brush().cap(), pinch_core::LineCap::Butt);
    }

    #[test]
    fn clear_wipes_pointer_strokes() {
        let mut app = make_app();
        app.handle_pointer(PointerEvent::Down(CanvasPoint::new(10.0, 10.0)));
        app.handle_pointer(PointerEvent::Move(CanvasPoint::new(60.0, 10.0)));
        assert!(!app.canvas().is_blank());
        app.clear_canvas();
        assert!(app.canvas().is_blank());
    }

    #[test]
    fn resize_follows_window() {
        let mut app = make_app();
        app.handle_action(UiAction::Resize(800, 600));
        assert_eq!((app.canvas().width(), app.canvas().height()), (800, 600));
        assert_eq!(app.overlay().layer().width(), 800);
    }

    #[test]
    fn quit_action_stops_loop() {
        let mut app = make_app();
        assert!(app.handle_action(UiAction::NextColor));
        assert!(!app.handle_action(UiAction::Quit));
    }
}
