#![allow(non_snake_case)]
//Rust hates greek characters
#![allow(confusable_idents)]

use crate::algebra::*;
use crate::io::CheckpointError;
use crate::solver::directions::{corrector_centering_parameter, predictor_centering_parameter};
use crate::solver::pairings::compute_bilinear_pairings;
use crate::solver::residuals::Residuals;
use crate::solver::schur::SchurComplement;
use crate::solver::steplength::{step_length, StepLengthWorkspace};
use crate::solver::{Sdp, Settings, SolverInfo, TerminateReason};
use crate::timers::Timers;
use std::path::Path;
use std::time::Instant;

/// Primal-dual interior-point solver state for one SDP.
///
/// One thread drives the iteration and owns all of this; the block-level
/// kernels underneath parallelize internally.  The iterate is (x, X, Y);
/// the free dual vector y is the diagonal part of Y.  Everything else is
/// per-iteration scratch, allocated once here and overwritten in place.
pub struct SdpSolver<T: FloatT> {
    pub(crate) sdp: Sdp<T>,
    pub(crate) settings: Settings<T>,
    pub info: SolverInfo<T>,

    // iterate
    pub(crate) x: Vec<T>,
    pub(crate) X: BlockDiagMatrix<T>,
    pub(crate) Y: BlockDiagMatrix<T>,

    // per-iteration caches
    pub(crate) residuals: Residuals<T>,
    pub(crate) dx: Vec<T>,
    pub(crate) dX: BlockDiagMatrix<T>,
    pub(crate) dY: BlockDiagMatrix<T>,
    pub(crate) R: BlockDiagMatrix<T>,
    pub(crate) Z: BlockDiagMatrix<T>,
    pub(crate) X_inv: BlockDiagMatrix<T>,
    pub(crate) X_inv_cholesky: BlockDiagMatrix<T>,
    pub(crate) Y_inv_cholesky: BlockDiagMatrix<T>,
    pub(crate) bilinear_pairings_X_inv: BlockDiagMatrix<T>,
    pub(crate) bilinear_pairings_Y: BlockDiagMatrix<T>,
    pub(crate) x_inv_y_diag: Vec<T>,
    pub(crate) schur: SchurComplement<T>,

    bilinear_workspace: Vec<Matrix<T>>,
    step_workspace: StepLengthWorkspace<T>,
}

impl<T> SdpSolver<T>
where
    T: FloatT,
{
    pub fn new(sdp: Sdp<T>, settings: Settings<T>) -> Self {
        let psd_dims = sdp.psd_matrix_block_dims();
        let pairing_dims = sdp.bilinear_pairing_block_dims();
        let N = sdp.dual_dimension();
        let P = sdp.num_constraints();

        let X = BlockDiagMatrix::new(N, &psd_dims);
        let pairings = BlockDiagMatrix::new(0, &pairing_dims);
        let bilinear_workspace = psd_dims
            .iter()
            .zip(pairing_dims.iter())
            .map(|(&rows, &cols)| Matrix::zeros((rows, cols)))
            .collect();
        let max_block_dim = psd_dims.iter().copied().max().unwrap_or(0);
        let residuals = Residuals::new(&sdp);

        let mut solver = Self {
            x: vec![T::zero(); P],
            X: X.clone(),
            Y: X.clone(),
            residuals,
            dx: vec![T::zero(); P],
            dX: X.clone(),
            dY: X.clone(),
            R: X.clone(),
            Z: X.clone(),
            X_inv: X.clone(),
            X_inv_cholesky: X.clone(),
            Y_inv_cholesky: X.clone(),
            bilinear_pairings_X_inv: pairings.clone(),
            bilinear_pairings_Y: pairings,
            x_inv_y_diag: vec![T::zero(); N],
            schur: SchurComplement::new(P),
            bilinear_workspace,
            step_workspace: StepLengthWorkspace::new(max_block_dim),
            info: SolverInfo::new(),
            sdp,
            settings,
        };
        solver.initialize();
        solver
    }

    /// Reset the iterate to the standard starting point: x = 0, X a
    /// Hilbert-like symmetric matrix shifted by 2I, Y the identity, both
    /// scaled by their configured initial scales.
    pub fn initialize(&mut self) {
        self.x.set(&T::zero());

        self.X.set_zero();
        for block in &mut self.X.blocks {
            for c in 0..block.ncols() {
                for r in 0..=c {
                    let elt = T::from_f64(1.0 + (r + c) as f64).recip();
                    block[(r, c)] = elt.clone();
                    block[(c, r)] = elt;
                }
            }
        }
        self.X.add_diagonal(&T::from_f64(2.0));
        self.X.scale(&self.settings.initial_matrix_scale_primal);

        self.Y.set_identity();
        self.Y.scale(&self.settings.initial_matrix_scale_dual);

        self.info = SolverInfo::new();
    }

    /// The problem being solved.
    pub fn sdp(&self) -> &Sdp<T> {
        &self.sdp
    }

    pub fn settings(&self) -> &Settings<T> {
        &self.settings
    }

    /// Lagrange multipliers of the primal equality constraints.
    pub fn x(&self) -> &[T] {
        &self.x
    }

    /// Free dual variables: the diagonal part of Y.
    pub fn y(&self) -> &[T] {
        &self.Y.diag
    }

    pub fn primal_matrix(&self) -> &BlockDiagMatrix<T> {
        &self.X
    }

    pub fn dual_matrix(&self) -> &BlockDiagMatrix<T> {
        &self.Y
    }

    /// Drive the iteration until a termination condition fires.  If
    /// `checkpoint_dir` is given, the iterate is saved there every
    /// `checkpoint_interval` seconds and once more on exit; checkpoint
    /// write failures abort the run.
    pub fn run(
        &mut self,
        checkpoint_dir: Option<&Path>,
        timers: &mut Timers,
    ) -> Result<TerminateReason, CheckpointError> {
        let start = Instant::now();
        let mut last_checkpoint = Instant::now();
        self.info.reason = None;
        self.info.print_header(&self.settings);

        let mut consecutive_failures = 0u32;
        let mut stagnant_iterations = 0u32;
        let mut last_step: Option<(T, T)> = None;

        let reason = loop {
            let factored = {
                let _span = timers.scope("run.factorize");
                self.factorize()
            };
            if factored.is_err() {
                consecutive_failures += 1;
                if consecutive_failures >= 2 || !self.roll_back_half_step(&mut last_step) {
                    break TerminateReason::Infeasible;
                }
                continue;
            }
            consecutive_failures = 0;

            {
                let _span = timers.scope("run.residuals");
                self.residuals.compute(
                    &self.sdp,
                    &self.x,
                    &self.X,
                    &self.Y,
                    &self.bilinear_pairings_Y,
                );
            }
            self.info.take_residues(&self.residuals);
            self.info.solve_time = start.elapsed().as_secs_f64();

            if self.residuals.is_optimal(&self.settings) {
                break TerminateReason::PrimalDualOptimal;
            }
            if self.residuals.μ > self.settings.max_complementarity {
                break TerminateReason::MaxComplementarityExceeded;
            }
            if self.info.iteration >= self.settings.max_iterations {
                break TerminateReason::MaxIterationsExceeded;
            }
            if self.info.solve_time > self.settings.max_runtime {
                break TerminateReason::MaxRuntimeExceeded;
            }

            let is_feasible = self.residuals.is_primal_feasible(&self.settings)
                && self.residuals.is_dual_feasible(&self.settings);

            {
                let _span = timers.scope("run.predictor");
                let beta = predictor_centering_parameter(&self.settings, is_feasible);
                self.compute_predictor_r_matrix(&beta);
                self.compute_search_direction_with_r();
            }

            {
                let _span = timers.scope("run.corrector");
                let beta = corrector_centering_parameter(
                    &self.settings,
                    &self.X,
                    &self.dX,
                    &self.Y,
                    &self.dY,
                    is_feasible,
                );
                self.info.beta_corrector = beta.clone();
                self.compute_corrector_r_matrix(&beta);
                self.compute_search_direction_with_r();
            }

            let steps = {
                let _span = timers.scope("run.stepLength");
                self.compute_step_lengths()
            };
            let (alpha_p, alpha_d) = match steps {
                Ok(steps) => steps,
                Err(_) => {
                    consecutive_failures += 1;
                    if consecutive_failures >= 2 || !self.roll_back_half_step(&mut last_step) {
                        break TerminateReason::Infeasible;
                    }
                    continue;
                }
            };
            self.info.primal_step = alpha_p.clone();
            self.info.dual_step = alpha_d.clone();
            self.info.print_iteration(&self.settings);

            // a collapsing step on one side while the other is feasible
            // signals a feasibility jump; collapse on both sides while
            // infeasible signals divergence
            let tiny = &self.settings.min_terminate_step_length;
            if self.residuals.is_primal_feasible(&self.settings) && alpha_d < *tiny {
                break TerminateReason::PrimalFeasibleJumpDetected;
            }
            if self.residuals.is_dual_feasible(&self.settings) && alpha_p < *tiny {
                break TerminateReason::DualFeasibleJumpDetected;
            }
            if !is_feasible && alpha_p < *tiny && alpha_d < *tiny {
                stagnant_iterations += 1;
                if stagnant_iterations >= 2 {
                    break TerminateReason::Infeasible;
                }
            } else {
                stagnant_iterations = 0;
            }

            {
                let _span = timers.scope("run.update");
                self.x.add_scaled(&alpha_p, &self.dx);
                self.X.add_scaled(&alpha_p, &self.dX);
                self.Y.add_scaled(&alpha_d, &self.dY);
            }
            last_step = Some((alpha_p, alpha_d));
            self.info.iteration += 1;

            if let Some(dir) = checkpoint_dir {
                if last_checkpoint.elapsed().as_secs() >= self.settings.checkpoint_interval {
                    let _span = timers.scope("run.checkpoint");
                    crate::io::save_checkpoint(self, dir)?;
                    last_checkpoint = Instant::now();
                }
            }
        };

        self.info.reason = Some(reason);
        self.info.solve_time = start.elapsed().as_secs_f64();
        if let Some(dir) = checkpoint_dir {
            let _span = timers.scope("run.checkpoint");
            crate::io::save_checkpoint(self, dir)?;
        }
        self.info.print_footer(&self.settings);
        Ok(reason)
    }

    // Cholesky work for the iteration: X^-1 and its Cholesky, the Cholesky
    // of Y (for the dual step length), both pairing caches, and the Schur
    // complement.  Any failure here is a loss of positive definiteness.
    pub(crate) fn factorize(&mut self) -> Result<(), DenseFactorizationError> {
        inverse_cholesky_and_inverse(&self.X, &mut self.X_inv_cholesky, &mut self.X_inv)?;
        inverse_cholesky(&self.Y, &mut self.Y_inv_cholesky)?;

        compute_bilinear_pairings(
            &self.X_inv,
            &self.sdp.bilinear_bases,
            &mut self.bilinear_workspace,
            &mut self.bilinear_pairings_X_inv,
        );
        compute_bilinear_pairings(
            &self.Y,
            &self.sdp.bilinear_bases,
            &mut self.bilinear_workspace,
            &mut self.bilinear_pairings_Y,
        );

        self.x_inv_y_diag
            .set_product(&self.X_inv.diag, &self.Y.diag);
        self.schur.compute(
            &self.sdp,
            &self.x_inv_y_diag,
            &self.bilinear_pairings_X_inv,
            &self.bilinear_pairings_Y,
        )
    }

    fn compute_step_lengths(&mut self) -> Result<(T, T), DenseFactorizationError> {
        let alpha_p = step_length(
            &mut self.step_workspace,
            &self.X_inv_cholesky,
            &self.dX,
            &self.settings.step_length_reduction,
        )?;
        let alpha_d = step_length(
            &mut self.step_workspace,
            &self.Y_inv_cholesky,
            &self.dY,
            &self.settings.step_length_reduction,
        )?;
        Ok((alpha_p, alpha_d))
    }

    // Undo half of the previous accepted step.  Returns false when there
    // is no step to roll back, in which case the caller gives up.
    fn roll_back_half_step(&mut self, last_step: &mut Option<(T, T)>) -> bool {
        match last_step.take() {
            None => false,
            Some((alpha_p, alpha_d)) => {
                let half = T::from_f64(0.5);
                let hp = -(alpha_p * &half);
                let hd = -(alpha_d * &half);
                self.x.add_scaled(&hp, &self.dx);
                self.X.add_scaled(&hp, &self.dX);
                self.Y.add_scaled(&hd, &self.dY);
                true
            }
        }
    }
}
