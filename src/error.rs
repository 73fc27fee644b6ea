//! Crate-wide error taxonomy.
//!
//! Input validation fails before any optimization state is built.
//! Infeasible soft constraints (a constraint class with more members
//! than groups) are deliberately *not* errors: the engine degrades to
//! spreading the excess members as evenly as possible.

use crate::ilp::SolverStatus;
use thiserror::Error;

/// Errors surfaced by the anticlustering engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed data, out-of-range K, or mismatched vector lengths.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An objective was requested on a path that cannot express it
    /// (variance-family objectives are not linearizable for the ILP).
    #[error("objective not linearizable: {0}")]
    ObjectiveMismatch(String),

    /// The exact method was requested but no external solver is
    /// reachable. A configuration error; never retried internally.
    #[error("ILP solver unavailable: {0}")]
    SolverUnavailable(String),

    /// The external solver ran but returned no usable solution.
    /// Propagated unmodified to the caller.
    #[error("ILP solver returned no solution: {0}")]
    SolverFailed(SolverStatus),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for an [`Error::InvalidInput`] with a formatted reason.
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }
}
