//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum TypesError {
    /// The identifier is well-formed but the registry has no definition for it.
    #[error("unknown CRS: {0}")]
    UnknownCrs(String),
    /// The identifier cannot be parsed as a CRS code.
    #[error("invalid CRS identifier: {0}")]
    InvalidCrsCode(String),
    /// UTM zone outside of `1..=60`.
    #[error("invalid UTM zone: {0}")]
    InvalidUtmZone(u8),
    /// Projection engine refused the definition.
    #[error("projection definition rejected: {0}")]
    Projection(String),
}
