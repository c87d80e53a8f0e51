//! `pinch_draw.toml` handling.
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the stock setup:
//!
//! ```toml
//! window_width    = 1024
//! window_height   = 640
//! pinch_threshold = 60.0
//! export_dir      = "."
//! model           = "sim"
//!
//! [brush]
//! color = "#000000"
//! width = 5.0
//! kind  = "round"
//!
//! [detection]
//! flip_horizontal       = true
//! max_continuous_checks = 5
//! detection_confidence  = 0.7
//! iou_threshold         = 0.3
//!
//! [camera]
//! width         = { min = 640, ideal = 1280, max = 1920 }
//! height        = { min = 480, ideal = 720,  max = 1080 }
//! facing        = "user"
//! warmup_frames = 3
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pinch_core::{BrushConfig, Rgba, DEFAULT_PINCH_THRESHOLD};

use crate::camera::CameraConstraints;
use crate::error::AppError;
use crate::source::{DetectionConfig, ModelKind};

pub const DEFAULT_CONFIG_FILE: &str = "pinch_draw.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window_width:    usize,
    pub window_height:   usize,
    /// Thumb–index distance, in canvas pixels, below which a hand pinches.
    pub pinch_threshold: f32,
    pub model:           ModelKind,
    /// Where exported PNGs are written.
    pub export_dir:      PathBuf,
    /// Colours cycled through with the colour key.
    pub palette:         Vec<Rgba>,
    pub brush:           BrushConfig,
    pub detection:       DetectionConfig,
    pub camera:          CameraConstraints,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            window_width:    1024,
            window_height:   640,
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            model:           ModelKind::Sim,
            export_dir:      PathBuf::from("."),
            palette:         default_palette(),
            brush:           BrushConfig::default(),
            detection:       DetectionConfig::default(),
            camera:          CameraConstraints::default(),
        }
    }
}

fn default_palette() -> Vec<Rgba> {
    vec![
        Rgba::BLACK,
        Rgba::RED,
        Rgba::opaque(0xFB, 0x8C, 0x00),
        Rgba::opaque(0xFD, 0xD8, 0x35),
        Rgba::opaque(0x43, 0xA0, 0x47),
        Rgba::opaque(0x1E, 0x88, 0xE5),
        Rgba::opaque(0x8E, 0x24, 0xAA),
    ]
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        let cfg: AppConfig = toml::from_str(s).map_err(|e| AppError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        match fs::read_to_string(path) {
            Ok(s) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                Self::from_toml_str(&s)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(AppError::Config(format!("{}: {}", path.display(), e))),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Reject values no window or brush can work with. Brush width is
    /// clamped rather than rejected.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(AppError::Config("window size must be non-zero".into()));
        }
        if !(self.pinch_threshold > 0.0) {
            return Err(AppError::Config(format!(
                "pinch_threshold must be positive, got {}", self.pinch_threshold
            )));
        }
        if self.palette.is_empty() {
            return Err(AppError::Config("palette must hold at least one colour".into()));
        }
        Ok(())
    }

    /// The brush as it should be used: width clamped into range.
    pub fn initial_brush(&self) -> BrushConfig {
        let mut b = self.brush;
        b.set_width(b.width);
        b
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use pinch_core::BrushKind;

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml_str(r##"
            pinch_threshold = 45.0
            model = "leap"

            [brush]
            color = "#ff0000"
            kind  = "square"

            [camera]
            warmup_frames = 0
        "##).unwrap();

        assert_eq!(cfg.pinch_threshold, 45.0);
        assert_eq!(cfg.model, ModelKind::Leap);
        assert_eq!(cfg.brush.color, Rgba::opaque(0xFF, 0, 0));
        assert_eq!(cfg.brush.kind, BrushKind::Square);
        assert_eq!(cfg.brush.width, 5.0);
        assert_eq!(cfg.camera.warmup_frames, 0);
        assert_eq!(cfg.camera.width.ideal, 1280);
        assert!(cfg.detection.flip_horizontal);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = AppConfig::default();
        let text = cfg.to_toml_string().unwrap();
        assert_eq!(AppConfig::from_toml_str(&text).unwrap(), cfg);
    }

    #[test]
    fn bad_colour_is_config_error() {
        let err = AppConfig::from_toml_str("[brush]\ncolor = \"blue-ish\"").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn non_positive_threshold_rejected() {
        assert!(AppConfig::from_toml_str("pinch_threshold = 0.0").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("pinch_draw_no_such_config.toml");
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn oversized_brush_is_clamped() {
        let cfg = AppConfig::from_toml_str("[brush]\nwidth = 500.0").unwrap();
        assert_eq!(cfg.initial_brush().width, pinch_core::brush::MAX_BRUSH);
    }
}
