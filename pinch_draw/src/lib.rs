//! # pinch_draw
//!
//! Draw in the air: pinch thumb and index finger together in front of the
//! camera and move the hand to paint onto a canvas, or drag with the mouse.
//! The drawing can be cleared and saved as a PNG.
//!
//! ## Gesture → Action mapping
//!
//! | Hand | Action |
//! |---|---|
//! | Thumb tip and index tip closer than the pinch threshold | Pen down at their midpoint |
//! | Pinch held while moving | Line segments follow the midpoint |
//! | Fingers apart, or hand out of view | Pen up |
//!
//! ## Detection cycle
//!
//! The landmark model runs on a worker thread ([`detect::Detector`]); the
//! main loop submits one frame at a time and collects the result on a later
//! iteration. Stopping the camera bumps a generation counter so a result
//! still in flight is dropped on arrival.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the hand follows the mouse cursor and
//!   pinches while `P` is held.
//! * `leap`: **Hardware mode**: hand landmarks from a LeapMotion controller
//!   via LeapC.
//!
//! ### Keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `Space` | Camera on / off |
//! | `P` (held) | Simulated pinch |
//! | Left mouse drag | Draw with the pointer |
//! | `C` | Clear canvas |
//! | `S` | Save `drawing-YYYY-MM-DD.png` |
//! | `1` / `2` / `3` | Round / square / line brush |
//! | `[` / `]` | Brush size down / up |
//! | `K` | Next colour |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod camera;
pub mod config;
pub mod detect;
pub mod error;
pub mod pointer;
pub mod source;
pub mod visualizer;

pub use app::{run, run_loop, AppState, Frontend, ModelStatus, Status, StatusLevel};
pub use config::AppConfig;
pub use error::AppError;
