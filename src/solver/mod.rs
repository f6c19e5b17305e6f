//! The primal-dual interior-point solver core.
//!
//! [`Sdp`] is the immutable problem description, [`Settings`] the run
//! configuration, [`SdpSolver`] the iterate plus its per-iteration caches.
//! [`SdpSolver::run`] drives predictor-corrector iterations until one of
//! the [`TerminateReason`] conditions fires.

mod directions;
mod info;
mod pairings;
mod residuals;
mod schur;
mod sdp;
mod sdp_solver;
mod settings;
mod steplength;

pub use info::*;
pub use sdp::*;
pub use sdp_solver::*;
pub use settings::*;
