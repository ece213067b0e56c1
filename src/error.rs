//! Error types for the progress widget and its window host.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for progress widget operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the widget model, font loading and the window host.
#[derive(Debug, Error)]
pub enum Error {
    /// The range leaves no room between minimum and maximum.
    #[error("invalid range: maximum {max} must exceed minimum {min} by at least 1")]
    InvalidRange { min: i32, max: i32 },

    /// None of the candidate font files could be read.
    #[error("no usable font found (tried {tried:?})")]
    FontUnavailable { tried: Vec<PathBuf> },

    /// A font file was read but could not be parsed.
    #[error("failed to parse font {path}")]
    FontParse { path: PathBuf },

    /// The winit event loop failed to start or exited with an error.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// The window could not be created.
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// The pixel surface could not be created or presented.
    #[error("surface error: {0}")]
    Surface(#[from] pixels::Error),
}
