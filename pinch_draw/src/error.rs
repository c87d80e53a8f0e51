//! Application-level errors.
//!
//! | Variant | Raised by | Recovery |
//! |---|---|---|
//! | `DeviceUnavailable` | camera start | status shows failure, camera stays off |
//! | `ModelLoadFailure` | [`load_model`](crate::source::load_model) | gesture path disabled, pointer drawing still works |
//! | `DetectionTransientFailure` | one detection call | frame treated as "no hand", loop continues |
//! | `DetectorStopped` | detector worker gone | treated as "no hand", gesture path disabled |
//! | `DimensionUnavailable` | mapping before metadata is ready | frame skipped |
//! | `ExportFailure` | PNG save | status asks to retry, drawing untouched |

use pinch_canvas::ExportError;
use pinch_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("hand landmark model failed to load: {0}")]
    ModelLoadFailure(String),

    #[error("hand detection failed: {0}")]
    DetectionTransientFailure(String),

    #[error("hand detector stopped: {0}")]
    DetectorStopped(String),

    #[error(transparent)]
    DimensionUnavailable(#[from] CoreError),

    #[error("export failed: {0}")]
    ExportFailure(#[from] ExportError),

    #[error("window error: {0}")]
    Window(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Errors the app recovers from without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::DetectionTransientFailure(_) | AppError::DimensionUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_error_converts() {
        let e: AppError = CoreError::DimensionUnavailable { video_width: 0, video_height: 0 }.into();
        assert!(matches!(e, AppError::DimensionUnavailable(_)));
        assert!(e.is_transient());
    }

    #[test]
    fn export_error_converts() {
        let e: AppError = ExportError::EmptyCanvas.into();
        assert!(matches!(e, AppError::ExportFailure(ExportError::EmptyCanvas)));
        assert!(!e.is_transient());
    }

    #[test]
    fn stopped_detector_is_not_transient() {
        assert!(!AppError::DetectorStopped("gone".into()).is_transient());
        assert!(AppError::DetectionTransientFailure("blip".into()).is_transient());
    }
}
