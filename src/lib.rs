//! # bootsdp
//!
//! An arbitrary-precision primal-dual interior-point solver for the
//! polynomial-matrix semidefinite programs that arise in the conformal
//! bootstrap.  The search direction is a Mehrotra-style predictor-corrector
//! pair built on a Schur-complement reduction; all linear algebra runs at a
//! run-time-chosen precision (hundreds of bits via MPFR, or native `f64`).
//!
//! ```no_run
//! use bootsdp::algebra::{set_default_precision, MpFloat};
//! use bootsdp::io::{read_sdp, save_solution};
//! use bootsdp::solver::{SdpSolver, Settings};
//! use bootsdp::timers::Timers;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::<MpFloat>::default();
//! set_default_precision(settings.precision);
//!
//! let sdp = read_sdp(Path::new("sdp_dir"))?;
//! let mut solver = SdpSolver::new(sdp, settings);
//! let mut timers = Timers::new();
//! let reason = solver.run(None, &mut timers)?;
//! save_solution(&solver, reason, Path::new("out_dir"))?;
//! # Ok(())
//! # }
//! ```

//Rust hates greek characters
#![allow(confusable_idents)]

pub mod algebra;
pub mod io;
pub mod solver;
pub mod timers;
