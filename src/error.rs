//! Error Types Module
//!
//! Errors surfaced by the spacing calculator and the diagram renderer.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An input lies outside its documented domain.
    #[error("{name} must be {expected}, got {value}")]
    OutOfRange { name: &'static str, expected: &'static str, value: f64 },

    /// The noon sun is at or below the horizon, so no spacing exists.
    #[error("invalid solar altitude — check latitude")]
    InvalidGeometry { solar_altitude: f64 },

    /// The diagram could not be built; numeric results are unaffected.
    #[error("diagram could not be generated: {0}")]
    RenderFailure(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::RenderFailure(format!("{:#}", err))
    }
}
