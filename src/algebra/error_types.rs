use thiserror::Error;

/// Error type returned by the dense factorization kernels.
#[derive(Error, Debug)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Cholesky factorization failed: matrix is not positive definite (pivot {0})")]
    Cholesky(usize),
    #[error("Eigendecomposition failed to converge")]
    Eigen,
}
