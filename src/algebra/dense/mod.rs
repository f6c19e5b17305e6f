mod cholesky;
mod core;
mod eigen;
mod matrix_math;

pub use self::core::*;
pub use cholesky::*;
pub use eigen::*;
pub use matrix_math::*;
