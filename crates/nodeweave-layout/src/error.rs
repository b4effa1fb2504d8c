//! Error types for layout configuration.

use thiserror::Error;

/// Errors that can occur while building a layout engine.
///
/// Stepping the simulation never fails; only configuration is validated.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A configuration value is outside its allowed range.
    #[error("invalid layout config `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Configuration JSON could not be parsed.
    #[error("layout config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LayoutError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
