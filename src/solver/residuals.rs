#![allow(non_snake_case)]
//Rust hates greek characters
#![allow(confusable_idents)]

use crate::algebra::*;
use crate::solver::pairings::constraint_matrix_weighted_sum;
use crate::solver::{Sdp, Settings};

/// Residues, objectives and the complementarity measure for the current
/// iterate; refreshed once per iteration.
pub(crate) struct Residuals<T> {
    /// dual residue vector d, length P
    pub dual_residues: Vec<T>,
    /// primal residue matrix, block structure of X
    pub primal_residues: BlockDiagMatrix<T>,

    pub primal_error: T,
    pub dual_error: T,
    pub duality_gap: T,
    pub primal_objective: T,
    pub dual_objective: T,
    /// complementarity <X,Y>_F / dim(X)
    pub μ: T,
}

impl<T> Residuals<T>
where
    T: FloatT,
{
    pub fn new(sdp: &Sdp<T>) -> Self {
        Self {
            dual_residues: vec![T::zero(); sdp.num_constraints()],
            primal_residues: BlockDiagMatrix::new(
                sdp.dual_dimension(),
                &sdp.psd_matrix_block_dims(),
            ),
            primal_error: T::zero(),
            dual_error: T::zero(),
            duality_gap: T::zero(),
            primal_objective: T::zero(),
            dual_objective: T::zero(),
            μ: T::zero(),
        }
    }

    pub fn compute(
        &mut self,
        sdp: &Sdp<T>,
        x: &[T],
        X: &BlockDiagMatrix<T>,
        Y: &BlockDiagMatrix<T>,
        pairings_Y: &BlockDiagMatrix<T>,
    ) {
        compute_dual_residues(sdp, Y, pairings_Y, &mut self.dual_residues);
        compute_primal_residues(sdp, x, X, &mut self.primal_residues);

        self.primal_error = self.primal_residues.max_abs();
        self.dual_error = self.dual_residues.norm_inf();

        // y is the diagonal part of Y
        self.primal_objective =
            sdp.objective_const.clone() + sdp.primal_objective_c.dot(x);
        self.dual_objective =
            sdp.objective_const.clone() + sdp.dual_objective_b.dot(&Y.diag);
        self.duality_gap =
            duality_gap(&self.primal_objective, &self.dual_objective);

        self.μ = block_frobenius_product_symmetric(X, Y)
            / crate::algebra::AsFloatT::<T>::as_T(&X.dim());
    }

    /// max(|Rp|_inf, |d|_inf)
    pub fn feasibility_error(&self) -> T {
        self.primal_error.clone().max(self.dual_error.clone())
    }

    pub fn is_primal_feasible(&self, settings: &Settings<T>) -> bool {
        self.primal_error < settings.primal_error_threshold
    }

    pub fn is_dual_feasible(&self, settings: &Settings<T>) -> bool {
        self.dual_error < settings.dual_error_threshold
    }

    pub fn is_optimal(&self, settings: &Settings<T>) -> bool {
        self.is_primal_feasible(settings)
            && self.is_dual_feasible(settings)
            && self.duality_gap < settings.duality_gap_threshold
    }
}

/// d_p = c_p - Tr(F_p Y), expanded over the pairing cache and the
/// free-variable coupling.
fn compute_dual_residues<T: FloatT>(
    sdp: &Sdp<T>,
    Y: &BlockDiagMatrix<T>,
    pairings_Y: &BlockDiagMatrix<T>,
    dual_residues: &mut [T],
) {
    let half = T::from_f64(0.5);
    let F = &sdp.free_var_matrix;

    for j in 0..sdp.num_groups() {
        let ej = sdp.degrees[j] + 1;

        for t in &sdp.constraint_indices[j] {
            let p = t.p;
            let ej_r = t.r * ej;
            let ej_s = t.s * ej;
            let k = t.k;

            let mut acc = T::zero();
            for &b in &sdp.blocks[j] {
                let PY = &pairings_Y.blocks[b];
                acc -= &PY[(ej_r + k, ej_s + k)];
                acc -= &PY[(ej_s + k, ej_r + k)];
            }
            acc *= &half;

            for (n, y) in Y.diag.iter().enumerate() {
                acc -= y.clone() * &F[(p, n)];
            }
            acc += &sdp.primal_objective_c[p];
            dual_residues[p] = acc;
        }
    }
}

/// Rp = sum_p x_p F_p - X - F_0, with F_0 carrying the dual objective on
/// the diagonal part.
pub(crate) fn compute_primal_residues<T: FloatT>(
    sdp: &Sdp<T>,
    x: &[T],
    X: &BlockDiagMatrix<T>,
    primal_residues: &mut BlockDiagMatrix<T>,
) {
    constraint_matrix_weighted_sum(sdp, x, primal_residues);
    primal_residues.sub_assign(X);
    primal_residues.add_diag_part(&sdp.dual_objective_b, &(-T::one()));
}

fn duality_gap<T: FloatT>(obj_primal: &T, obj_dual: &T) -> T {
    let two_inv = T::from_f64(0.5);
    let denom = ((obj_primal.abs() + obj_dual.abs()) * &two_inv).max(T::one());
    (obj_primal.clone() - obj_dual).abs() / denom
}
