//! Error types
//!
//! The simulation itself has no failure paths: capacity overflow is eviction and
//! degenerate numbers are clamped at construction. Errors only come from parsing
//! caller input (pattern names, settings files).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FireworkError {
    /// Pattern names are a closed set
    #[error("invalid firework pattern `{0}` (expected sphere, heart or ring)")]
    InvalidPattern(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
}
