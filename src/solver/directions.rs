#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::pairings::{
    bilinear_block_pairing, constraint_matrix_weighted_sum,
};
use crate::solver::{Sdp, SdpSolver, Settings};

// Predictor/corrector search directions.  Both reduce to the same
// four-stage reconstruction against an R matrix; only R and the centering
// parameter differ.

/// beta for the predictor: zero once feasible, otherwise the infeasible
/// centering parameter.
pub(crate) fn predictor_centering_parameter<T: FloatT>(
    settings: &Settings<T>,
    is_primal_dual_feasible: bool,
) -> T {
    if is_primal_dual_feasible {
        T::zero()
    } else {
        settings.infeasible_centering_parameter.clone()
    }
}

/// beta for the corrector, from the relative complementarity of the
/// predictor trial point.
pub(crate) fn corrector_centering_parameter<T: FloatT>(
    settings: &Settings<T>,
    X: &BlockDiagMatrix<T>,
    dX: &BlockDiagMatrix<T>,
    Y: &BlockDiagMatrix<T>,
    dY: &BlockDiagMatrix<T>,
    is_primal_dual_feasible: bool,
) -> T {
    let r = block_frobenius_product_of_sums(X, dX, Y, dY)
        / block_frobenius_product_symmetric(X, Y);
    let beta_aux = r.clone() * &r;

    if beta_aux > T::one() {
        T::one()
    } else if is_primal_dual_feasible {
        settings.feasible_centering_parameter.clone().max(beta_aux)
    } else {
        settings.infeasible_centering_parameter.clone().max(beta_aux)
    }
}

impl<T> SdpSolver<T>
where
    T: FloatT,
{
    /// R = beta mu I - X Y
    pub(crate) fn compute_predictor_r_matrix(&mut self, beta: &T) {
        block_scale_multiply_add(&-T::one(), &self.X, &self.Y, &T::zero(), &mut self.R);
        self.R.add_diagonal(&(beta.clone() * &self.residuals.μ));
    }

    /// R = beta mu I - X Y - dX dY, with (dX, dY) the predictor direction
    pub(crate) fn compute_corrector_r_matrix(&mut self, beta: &T) {
        block_scale_multiply_add(&-T::one(), &self.X, &self.Y, &T::zero(), &mut self.R);
        block_scale_multiply_add(&-T::one(), &self.dX, &self.dY, &T::one(), &mut self.R);
        self.R.add_diagonal(&(beta.clone() * &self.residuals.μ));
    }

    /// Reconstruct (dx, dX, dY) for the R matrix currently in place.
    pub(crate) fn compute_search_direction_with_r(&mut self) {
        // Z = Symmetrize(X^{-1} (Rp Y - R))
        block_scale_multiply_add(
            &T::one(),
            &self.residuals.primal_residues,
            &self.Y,
            &T::zero(),
            &mut self.Z,
        );
        self.Z.sub_assign(&self.R);
        solve_with_inverse_cholesky(&self.X_inv_cholesky, &mut self.Z);
        self.Z.symmetrize();

        // dx = S^{-1} (-d - Tr(F Z))
        compute_schur_rhs(&self.sdp, &self.residuals.dual_residues, &self.Z, &mut self.dx);
        self.schur.solve_in_place(&mut self.dx);

        // dX = sum_p dx_p F_p + Rp
        constraint_matrix_weighted_sum(&self.sdp, &self.dx, &mut self.dX);
        self.dX.add_assign(&self.residuals.primal_residues);

        // dY = Symmetrize(X^{-1} (R - dX Y))
        block_scale_multiply_add(&T::one(), &self.dX, &self.Y, &T::zero(), &mut self.dY);
        self.dY.sub_assign(&self.R);
        solve_with_inverse_cholesky(&self.X_inv_cholesky, &mut self.dY);
        self.dY.symmetrize();
        self.dY.scale(&-T::one());
    }
}

// rhs_p = -d_p - Tr(F_p Z)
fn compute_schur_rhs<T: FloatT>(
    sdp: &Sdp<T>,
    dual_residues: &[T],
    Z: &BlockDiagMatrix<T>,
    rhs: &mut [T],
) {
    let F = &sdp.free_var_matrix;
    for (p, out) in rhs.iter_mut().enumerate() {
        let mut acc = -dual_residues[p].clone();
        for (n, z) in Z.diag.iter().enumerate() {
            acc -= F[(p, n)].clone() * z;
        }
        *out = acc;
    }

    for j in 0..sdp.num_groups() {
        for t in &sdp.constraint_indices[j] {
            for &b in &sdp.blocks[j] {
                let basis = &sdp.bilinear_bases[b];
                let delta = basis.nrows();
                let q = basis.col_slice(t.k);
                rhs[t.p] -= bilinear_block_pairing(q, delta, &Z.blocks[b], t.r, t.s);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::residuals::compute_primal_residues;

    // two independent normalization-style constraints with identity bases
    // and F = I
    fn two_group_sdp() -> Sdp<f64> {
        Sdp::new(
            vec![Matrix::identity(1), Matrix::identity(1)],
            Matrix::identity(2),
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            0.0,
            vec![1, 1],
            vec![0, 0],
            vec![vec![0], vec![1]],
        )
        .unwrap()
    }

    #[test]
    fn test_direction_vanishes_at_centered_kkt_point() {
        // a point on the central path: Rp = 0, d = 0 and X Y = mu I with
        // mu = 2/3 (see the arithmetic in the assertions below)
        let sdp = two_group_sdp();
        let settings = Settings::<f64>::default();
        let mut solver = SdpSolver::new(sdp, settings);

        solver.x = vec![2.0, 2.0];
        solver.X.diag = vec![1.0, 1.0];
        solver.X.blocks[0][(0, 0)] = 2.0;
        solver.X.blocks[1][(0, 0)] = 2.0;
        solver.Y.diag = vec![2.0 / 3.0, 2.0 / 3.0];
        solver.Y.blocks[0][(0, 0)] = 1.0 / 3.0;
        solver.Y.blocks[1][(0, 0)] = 1.0 / 3.0;

        solver.factorize().unwrap();
        solver.residuals.compute(
            &solver.sdp,
            &solver.x,
            &solver.X,
            &solver.Y,
            &solver.bilinear_pairings_Y,
        );

        assert!(solver.residuals.primal_error < 1e-14);
        assert!(solver.residuals.dual_error < 1e-14);
        assert!((solver.residuals.μ - 2.0 / 3.0).abs() < 1e-14);

        // with beta = 1 the R matrix vanishes and so must the direction
        solver.compute_predictor_r_matrix(&1.0);
        assert!(solver.R.max_abs() < 1e-14);
        solver.compute_search_direction_with_r();

        assert!(solver.dx.norm_inf() < 1e-12);
        assert!(solver.dX.max_abs() < 1e-12);
        assert!(solver.dY.max_abs() < 1e-12);
    }

    #[test]
    fn test_predictor_cancels_primal_residues() {
        // from any iterate, dX - sum_p dx_p F_p = Rp by construction, so a
        // full step annihilates the primal residues
        let sdp = two_group_sdp();
        let settings = Settings::<f64>::default();
        let mut solver = SdpSolver::new(sdp, settings);

        solver.x = vec![0.5, -0.25];
        solver.X.diag = vec![2.0, 1.0];
        solver.X.blocks[0][(0, 0)] = 3.0;
        solver.X.blocks[1][(0, 0)] = 1.5;
        solver.Y.diag = vec![1.0, 2.0];
        solver.Y.blocks[0][(0, 0)] = 0.5;
        solver.Y.blocks[1][(0, 0)] = 2.5;

        solver.factorize().unwrap();
        solver.residuals.compute(
            &solver.sdp,
            &solver.x,
            &solver.X,
            &solver.Y,
            &solver.bilinear_pairings_Y,
        );
        assert!(solver.residuals.primal_error > 1e-3);

        solver.compute_predictor_r_matrix(&0.0);
        solver.compute_search_direction_with_r();

        let mut x_new = solver.x.clone();
        x_new.add_scaled(&1.0, &solver.dx);
        let mut X_new = solver.X.clone();
        X_new.add_assign(&solver.dX);

        let mut rp = solver.residuals.primal_residues.clone();
        compute_primal_residues(&solver.sdp, &x_new, &X_new, &mut rp);
        assert!(rp.max_abs() < 1e-12);
    }
}
