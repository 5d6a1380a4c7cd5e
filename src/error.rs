//! Error type for developer-facing configuration mistakes.
//!
//! Only registration and import paths return these. Hooks and lookups never
//! fail: they log a warning and fall back to a safe default so decorative
//! motion can never take the page down with it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("unknown animation preset `{0}`")]
    UnknownPreset(String),

    #[error("animation `{id}` has invalid duration {value}ms (must be finite and >= 0)")]
    InvalidDuration { id: String, value: f32 },

    #[error("unknown easing `{0}`")]
    UnknownEasing(String),

    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("an animation with id `{0}` is already registered")]
    DuplicateId(String),

    #[error("`{0}` is a built-in preset and cannot be modified")]
    ReadOnlyPreset(String),

    #[error("failed to (de)serialize motion data: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = MotionError> = std::result::Result<T, E>;
