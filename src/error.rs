use thiserror::Error;

/// Result alias for `crnai`.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
///
/// Callers that only need to decide whether to retry with other parameters,
/// skip an input, or give up can match on this instead of on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input shape or arity.
    InvalidArgument,
    /// A parameter lies outside its mathematically valid range.
    Domain,
    /// Two related collections disagree in size.
    Dimension,
    /// A structural precondition does not hold.
    Logic,
    /// A search exhausted its candidates.
    NotFound,
    /// A numerical procedure did not converge.
    Runtime,
}

/// Errors returned by the clustering, assignment, outlier and search primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// A matrix that must be square is not.
    #[error("matrix is not square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        /// Offending row.
        row: usize,
        /// Expected row length.
        expected: usize,
        /// Actual row length.
        found: usize,
    },

    /// Malformed argument value.
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Parameter outside of its valid range.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Size mismatch between related collections.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Not enough items for the requested operation.
    #[error("not enough items: need more than {required}, found {found}")]
    TooFewItems {
        /// Minimum count that must be exceeded.
        required: usize,
        /// Number of items available.
        found: usize,
    },

    /// No path connects the start and goal states.
    #[error("no path found")]
    PathNotFound,

    /// Iterative procedure did not converge within its iteration limit.
    #[error("did not converge after {iterations} iterations")]
    ConvergenceFailure {
        /// Number of iterations attempted.
        iterations: usize,
    },
}

impl Error {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyInput | Error::NotSquare { .. } | Error::InvalidArgument { .. } => {
                ErrorKind::InvalidArgument
            }
            Error::InvalidParameter { .. } => ErrorKind::Domain,
            Error::DimensionMismatch { .. } => ErrorKind::Dimension,
            Error::TooFewItems { .. } => ErrorKind::Logic,
            Error::PathNotFound => ErrorKind::NotFound,
            Error::ConvergenceFailure { .. } => ErrorKind::Runtime,
        }
    }
}
