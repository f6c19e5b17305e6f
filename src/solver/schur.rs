#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::pairings::diagonal_congruence_transpose;
use crate::solver::Sdp;

/// The dense P x P Schur complement of the KKT linearization, together
/// with its Cholesky factor.  Assembled fresh every iteration from the
/// bilinear pairing caches.
pub(crate) struct SchurComplement<T> {
    pub S: Matrix<T>,
    cholesky: CholeskyEngine<T>,
}

impl<T> SchurComplement<T>
where
    T: FloatT,
{
    pub fn new(num_constraints: usize) -> Self {
        Self {
            S: Matrix::zeros((num_constraints, num_constraints)),
            cholesky: CholeskyEngine::new(num_constraints),
        }
    }

    /// Assemble S and factor it.  `x_inv_y_diag` is the elementwise product
    /// of the diagonal parts of X^-1 and Y.
    pub fn compute(
        &mut self,
        sdp: &Sdp<T>,
        x_inv_y_diag: &[T],
        pairings_X_inv: &BlockDiagMatrix<T>,
        pairings_Y: &BlockDiagMatrix<T>,
    ) -> Result<(), DenseFactorizationError> {
        self.assemble(sdp, x_inv_y_diag, pairings_X_inv, pairings_Y);
        self.cholesky.factor(&self.S)
    }

    /// Assembly only, factorization-free; used by tests that inspect S.
    pub fn assemble(
        &mut self,
        sdp: &Sdp<T>,
        x_inv_y_diag: &[T],
        pairings_X_inv: &BlockDiagMatrix<T>,
        pairings_Y: &BlockDiagMatrix<T>,
    ) {
        // free-variable contribution F diag(d) F^T covers every entry, so
        // no prior zeroing is needed
        diagonal_congruence_transpose(x_inv_y_diag, &sdp.free_var_matrix, 0, 0, &mut self.S);
        add_schur_blocks(sdp, pairings_X_inv, pairings_Y, &mut self.S);
    }

    /// b := S^-1 b through the Cholesky factor.
    pub fn solve_in_place(&self, b: &mut [T]) {
        self.cholesky.solve_in_place(b);
    }
}

// S_{p1 p2} += 1/4 sum over the group's blocks of the four pairing
// cross-terms.  Entries with p1, p2 in different groups stay untouched
// (they are exactly the free-variable part already in place).
fn add_schur_blocks<T: FloatT>(
    sdp: &Sdp<T>,
    pairings_X_inv: &BlockDiagMatrix<T>,
    pairings_Y: &BlockDiagMatrix<T>,
    S: &mut Matrix<T>,
) {
    let quarter = T::from_f64(0.25);

    for j in 0..sdp.num_groups() {
        let ej = sdp.degrees[j] + 1;

        for t1 in &sdp.constraint_indices[j] {
            let ej_r1 = t1.r * ej;
            let ej_s1 = t1.s * ej;
            let k1 = t1.k;

            for t2 in &sdp.constraint_indices[j] {
                if t2.p > t1.p {
                    break;
                }
                let ej_r2 = t2.r * ej;
                let ej_s2 = t2.s * ej;
                let k2 = t2.k;

                let mut tmp = T::zero();
                for &b in &sdp.blocks[j] {
                    let PX = &pairings_X_inv.blocks[b];
                    let PY = &pairings_Y.blocks[b];
                    tmp += PX[(ej_s1 + k1, ej_r2 + k2)].clone() * &PY[(ej_s2 + k2, ej_r1 + k1)];
                    tmp += PX[(ej_r1 + k1, ej_r2 + k2)].clone() * &PY[(ej_s2 + k2, ej_s1 + k1)];
                    tmp += PX[(ej_s1 + k1, ej_s2 + k2)].clone() * &PY[(ej_r2 + k2, ej_r1 + k1)];
                    tmp += PX[(ej_r1 + k1, ej_s2 + k2)].clone() * &PY[(ej_r2 + k2, ej_s1 + k1)];
                }
                tmp *= &quarter;

                S[(t1.p, t2.p)] += &tmp;
                if t2.p != t1.p {
                    S[(t2.p, t1.p)] += &tmp;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::pairings::compute_bilinear_pairings;

    // a one-group, dim 2, degree 1 problem exercising off-diagonal tiles
    fn pairing_fixture() -> (Sdp<f64>, BlockDiagMatrix<f64>, BlockDiagMatrix<f64>) {
        let basis = Matrix::new_from_rows((2, 2), &[1., 1., 1., 2.]);
        // P = 3 * 2 = 6
        let sdp = Sdp::new(
            vec![basis],
            Matrix::new_from_rows((6, 1), &[1., 0., 2., 0., 1., 1.]),
            vec![1.0; 6],
            vec![1.0],
            0.0,
            vec![2],
            vec![1],
            vec![vec![0]],
        )
        .unwrap();

        // X block dim = rows * dim = 4; pairing dim = cols * dim = 4
        let mut X_inv = BlockDiagMatrix::new(1, &[4]);
        X_inv.set_identity();
        X_inv.diag[0] = 0.5;
        X_inv.blocks[0][(0, 1)] = 0.25;
        X_inv.blocks[0][(1, 0)] = 0.25;

        let mut Y = BlockDiagMatrix::new(1, &[4]);
        Y.set_identity();
        Y.blocks[0][(2, 3)] = -0.125;
        Y.blocks[0][(3, 2)] = -0.125;

        let mut pairings_X_inv = BlockDiagMatrix::new(0, &[4]);
        let mut pairings_Y = BlockDiagMatrix::new(0, &[4]);
        let mut work = vec![Matrix::zeros((4, 4))];
        compute_bilinear_pairings(&X_inv, &sdp.bilinear_bases, &mut work, &mut pairings_X_inv);
        compute_bilinear_pairings(&Y, &sdp.bilinear_bases, &mut work, &mut pairings_Y);

        let mut x_inv_y_diag = vec![0.0];
        x_inv_y_diag.set_product(&X_inv.diag, &Y.diag);

        let mut schur = SchurComplement::new(6);
        schur.assemble(&sdp, &x_inv_y_diag, &pairings_X_inv, &pairings_Y);
        let S = schur.S.clone();

        // return the ingredients for reuse plus check symmetry right here
        for p in 0..6 {
            for q in 0..6 {
                assert!((S[(p, q)] - S[(q, p)]).abs() < 1e-13 * S.max_abs());
            }
        }
        (sdp, pairings_X_inv, pairings_Y)
    }

    #[test]
    fn test_schur_symmetry() {
        let _ = pairing_fixture();
    }

    #[test]
    fn test_schur_refactorization_idempotent() {
        let (sdp, pairings_X_inv, pairings_Y) = pairing_fixture();
        let x_inv_y_diag = vec![0.5];

        let mut first = SchurComplement::new(6);
        first.assemble(&sdp, &x_inv_y_diag, &pairings_X_inv, &pairings_Y);
        let mut second = SchurComplement::new(6);
        second.assemble(&sdp, &x_inv_y_diag, &pairings_X_inv, &pairings_Y);

        // bitwise equality: assembly is deterministic
        assert_eq!(first.S.data(), second.S.data());
    }

    #[test]
    fn test_schur_solve_roundtrip() {
        let (sdp, pairings_X_inv, pairings_Y) = pairing_fixture();
        let x_inv_y_diag = vec![0.5];

        let mut schur = SchurComplement::new(6);
        schur
            .compute(&sdp, &x_inv_y_diag, &pairings_X_inv, &pairings_Y)
            .unwrap();

        let b = vec![1.0, -1.0, 2.0, 0.5, 0.0, 1.0];
        let mut v = b.clone();
        schur.solve_in_place(&mut v);
        let mut back = vec![0.0; 6];
        schur.S.gemv(&mut back, &v, &1.0, &0.0);
        for (a, e) in back.iter().zip(b.iter()) {
            assert!((a - e).abs() < 1e-10);
        }
    }
}
