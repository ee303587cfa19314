use thiserror::Error;

/// Decomposition/exchange engine error type.
///
/// Every fallible entry point in this crate returns one of these three
/// kinds, never a bare `Success`: a `Result::Ok` stands in for success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecompError {
    /// Null required input, an impossible policy, or a detected
    /// inconsistency in the global element ID set (e.g. a duplicate).
    #[error("invalid argument")]
    InvalidArgument,

    /// An allocation inside the engine could not be satisfied.
    #[error("allocation failed")]
    MallocFailure,

    /// An MPI collective or point-to-point primitive returned failure.
    #[error("MPI error (code={0})")]
    MpiError(i32),
}

impl From<i32> for DecompError {
    fn from(mpi_error_code: i32) -> Self {
        DecompError::MpiError(mpi_error_code)
    }
}
