//! Error types.
//!
//! Rendering itself never fails: malformed points, empty point sets and odd
//! option values all degrade to best-effort output. The variants here cover
//! the few entry points that can reject their input.

use thiserror::Error;

/// Result type alias for heatmap operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No surface is registered under the given identifier.
    #[error("surface not found: {0}")]
    SurfaceNotFound(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// A compositing operation name is not recognized.
    #[error("unknown composite operation: {0:?}")]
    UnknownCompOp(String),
}
