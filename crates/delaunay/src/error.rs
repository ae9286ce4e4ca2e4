//! Error kinds shared across the crate.
//!
//! All geometric failures funnel into [`Error`]; the triangulation entry
//! points surface them unchanged to the caller. There is no automatic
//! retry anywhere: a caller that hits [`Error::GeneralPosition`] is
//! expected to jitter its input and rebuild.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Arithmetic across vectors/points/matrices of unequal lengths,
    /// or a column matrix assembled from ragged columns.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Zero-length point, vector, or matrix.
    #[error("empty input")]
    EmptyInput,

    /// Inverse or linear solve on a singular matrix.
    #[error("singular matrix")]
    SingularMatrix,

    /// A predicate returned 0 at a step that requires strict sidedness.
    /// The triangulation is left in an undefined state.
    #[error("points not in general position")]
    GeneralPosition,

    /// Index past the extent of a point, vector, or matrix.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
}
