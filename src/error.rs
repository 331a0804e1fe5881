//! Error taxonomy shared by every stage of the pipeline.
//!
//! All failures are precondition violations reported synchronously; nothing
//! here is transient or worth retrying with the same inputs.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsingError {
    /// A parameter or cell value outside its admissible domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A cell lookup outside the grid.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} lattice")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Two grids, layers or metric sequences that should share a shape do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: String, found: String },
}

impl IsingError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        IsingError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape_mismatch(expected: (usize, usize), found: (usize, usize)) -> Self {
        IsingError::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            found: format!("{}x{}", found.0, found.1),
        }
    }
}

pub type Result<T> = std::result::Result<T, IsingError>;
