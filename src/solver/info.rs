use crate::algebra::*;
use crate::solver::residuals::Residuals;
use crate::solver::Settings;

// ---------------------------------
// Solver status type
// ---------------------------------

/// Why a run stopped.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TerminateReason {
    PrimalDualOptimal,
    PrimalFeasibleJumpDetected,
    DualFeasibleJumpDetected,
    MaxIterationsExceeded,
    MaxRuntimeExceeded,
    MaxComplementarityExceeded,
    Infeasible,
}

impl std::fmt::Display for TerminateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            TerminateReason::PrimalDualOptimal => "found primal-dual optimal solution",
            TerminateReason::PrimalFeasibleJumpDetected => "primal feasible jump detected",
            TerminateReason::DualFeasibleJumpDetected => "dual feasible jump detected",
            TerminateReason::MaxIterationsExceeded => "maxIterations exceeded",
            TerminateReason::MaxRuntimeExceeded => "maxRuntime exceeded",
            TerminateReason::MaxComplementarityExceeded => "maxComplementarity exceeded",
            TerminateReason::Infeasible => "primal or dual infeasibility detected",
        };
        write!(f, "{}", msg)
    }
}

// ---------------------------------
// Per-iteration scalar snapshot
// ---------------------------------

/// Scalar state of the run: objectives, errors, step data and the final
/// termination reason.  Also owns the verbose console reporting.
#[derive(Debug, Clone)]
pub struct SolverInfo<T> {
    pub iteration: u32,
    pub mu: T,
    pub primal_objective: T,
    pub dual_objective: T,
    pub duality_gap: T,
    pub primal_error: T,
    pub dual_error: T,
    pub primal_step: T,
    pub dual_step: T,
    pub beta_corrector: T,
    pub solve_time: f64,
    pub reason: Option<TerminateReason>,
}

impl<T> SolverInfo<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            iteration: 0,
            mu: T::zero(),
            primal_objective: T::zero(),
            dual_objective: T::zero(),
            duality_gap: T::zero(),
            primal_error: T::zero(),
            dual_error: T::zero(),
            primal_step: T::zero(),
            dual_step: T::zero(),
            beta_corrector: T::zero(),
            solve_time: 0.0,
            reason: None,
        }
    }

    pub(crate) fn take_residues(&mut self, residuals: &Residuals<T>) {
        self.mu = residuals.μ.clone();
        self.primal_objective = residuals.primal_objective.clone();
        self.dual_objective = residuals.dual_objective.clone();
        self.duality_gap = residuals.duality_gap.clone();
        self.primal_error = residuals.primal_error.clone();
        self.dual_error = residuals.dual_error.clone();
    }

    pub(crate) fn print_header(&self, settings: &Settings<T>) {
        if !settings.verbose {
            return;
        }
        println!(
            "\n{:>4} {:>9}  {:>10} {:>14} {:>14} {:>10} {:>10} {:>10}  {:>8} {:>8} {:>8}",
            "iter", "time(s)", "mu", "P-obj", "D-obj", "gap", "P-err", "D-err", "P-step", "D-step", "beta",
        );
        println!("{}", "-".repeat(120));
    }

    pub(crate) fn print_iteration(&self, settings: &Settings<T>) {
        if !settings.verbose {
            return;
        }
        println!(
            "{:>4} {:>9.2}  {:>10.2e} {:>14.6e} {:>14.6e} {:>10.2e} {:>10.2e} {:>10.2e}  {:>8.5} {:>8.5} {:>8.5}",
            self.iteration,
            self.solve_time,
            self.mu,
            self.primal_objective,
            self.dual_objective,
            self.duality_gap,
            self.primal_error,
            self.dual_error,
            self.primal_step.to_f64(),
            self.dual_step.to_f64(),
            self.beta_corrector.to_f64(),
        );
    }

    pub(crate) fn print_footer(&self, settings: &Settings<T>) {
        if !settings.verbose {
            return;
        }
        if let Some(reason) = self.reason {
            println!("\n-----{:-<115}", format!("{}", reason));
        }
        println!("primalObjective = {}", self.primal_objective);
        println!("dualObjective   = {}", self.dual_objective);
        println!("dualityGap      = {:e}", self.duality_gap);
        println!("primalError     = {:e}", self.primal_error);
        println!("dualError       = {:e}", self.dual_error);
    }
}

impl<T: FloatT> Default for SolverInfo<T> {
    fn default() -> Self {
        Self::new()
    }
}
