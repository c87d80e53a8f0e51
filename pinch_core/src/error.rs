use thiserror::Error;

/// Errors raised by the pure core.
///
/// Absence of a hand is *not* an error; it classifies as released.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CoreError {
    /// The video stream has not reported its dimensions yet.
    #[error("video dimensions unavailable ({video_width}x{video_height})")]
    DimensionUnavailable { video_width: u32, video_height: u32 },
}
