//! Error types for camera configuration.

use thiserror::Error;

/// Errors that can occur while configuring a camera controller.
#[derive(Error, Debug)]
pub enum CameraError {
    /// A configuration value is outside its allowed range.
    #[error("invalid camera config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Configuration or bookmark JSON could not be parsed.
    #[error("camera json error: {0}")]
    Json(#[from] serde_json::Error),
}
