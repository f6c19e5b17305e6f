mod cholesky;
mod core;

pub use self::core::*;
pub use cholesky::*;
