//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `GtError` as one variant.

use thiserror::Error;

/// Errors raised while constructing `gt-core` values.
#[derive(Debug, Error)]
pub enum GtError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// Shorthand result type for `gt-core`.
pub type GtResult<T> = Result<T, GtError>;
