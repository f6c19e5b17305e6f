//! Numeric foundation of the solver.
//!
//! Everything is generic over the scalar trait [`FloatT`], with a native
//! `f64` implementation and the MPFR-backed [`MpFloat`] for extended
//! precision.  The dense and block-diagonal kernels are hand-written so
//! that the same code serves both scalar types; there is no LAPACK path.

mod block;
mod dense;
mod error_types;
mod floats;
mod vecmath;

pub use block::*;
pub use dense::*;
pub use error_types::*;
pub use floats::*;
pub use vecmath::*;

// the FloatT supertraits, so that T::zero()/T::one() resolve wherever the
// algebra is glob-imported
pub use num_traits::{One, Zero};
