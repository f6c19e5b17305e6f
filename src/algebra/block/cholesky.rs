#![allow(non_snake_case)]

use crate::algebra::*;
use rayon::prelude::*;

// Cholesky-based inversion of a symmetric positive definite block-diagonal
// matrix.  The diagonal-scalar part inverts pointwise; each dense block
// goes through potrf + triangular inversion.  Failure of any block is the
// "lost positive definiteness" signal the driver acts on.

/// inv_cholesky := cholesky(A)^-1 (lower triangular per block) and
/// inverse := A^-1.
pub fn inverse_cholesky_and_inverse<T: FloatT>(
    A: &BlockDiagMatrix<T>,
    inv_cholesky: &mut BlockDiagMatrix<T>,
    inverse: &mut BlockDiagMatrix<T>,
) -> Result<(), DenseFactorizationError> {
    A.assert_same_shape(inv_cholesky);
    A.assert_same_shape(inverse);

    invert_diag_part(A, inv_cholesky, Some(inverse))?;

    (&A.blocks, &mut inv_cholesky.blocks, &mut inverse.blocks)
        .into_par_iter()
        .try_for_each(|(a, inv_chol, inv)| {
            let mut engine = CholeskyEngine::new(a.nrows());
            engine.factor(a)?;
            inverse_lower_triangular(&engine.L, inv_chol);
            // inverse = invChol' * invChol
            inv.copy_from(inv_chol);
            inv_chol.lower_trmm_trans(inv);
            Ok(())
        })
}

/// inv_cholesky := cholesky(A)^-1 only, for when the full inverse is not
/// needed (the dual step length).
pub fn inverse_cholesky<T: FloatT>(
    A: &BlockDiagMatrix<T>,
    inv_cholesky: &mut BlockDiagMatrix<T>,
) -> Result<(), DenseFactorizationError> {
    A.assert_same_shape(inv_cholesky);

    invert_diag_part(A, inv_cholesky, None)?;

    (&A.blocks, &mut inv_cholesky.blocks)
        .into_par_iter()
        .try_for_each(|(a, inv_chol)| {
            let mut engine = CholeskyEngine::new(a.nrows());
            engine.factor(a)?;
            inverse_lower_triangular(&engine.L, inv_chol);
            Ok(())
        })
}

fn invert_diag_part<T: FloatT>(
    A: &BlockDiagMatrix<T>,
    inv_cholesky: &mut BlockDiagMatrix<T>,
    inverse: Option<&mut BlockDiagMatrix<T>>,
) -> Result<(), DenseFactorizationError> {
    for (i, d) in A.diag.iter().enumerate() {
        if !(*d > T::zero()) || !d.is_finite() {
            return Err(DenseFactorizationError::Cholesky(i));
        }
        inv_cholesky.diag[i] = d.sqrt().recip();
    }
    if let Some(inverse) = inverse {
        for (i, d) in A.diag.iter().enumerate() {
            inverse.diag[i] = d.recip();
        }
    }
    Ok(())
}

/// X := invChol' * invChol * X = A^-1 * X, given invChol = cholesky(A)^-1.
pub fn solve_with_inverse_cholesky<T: FloatT>(
    inv_cholesky: &BlockDiagMatrix<T>,
    X: &mut BlockDiagMatrix<T>,
) {
    inv_cholesky.assert_same_shape(X);

    for (x, ic) in X.diag.iter_mut().zip(inv_cholesky.diag.iter()) {
        *x *= ic.clone() * ic;
    }

    (&inv_cholesky.blocks, &mut X.blocks)
        .into_par_iter()
        .for_each(|(ic, x)| {
            ic.lower_trmm(x);
            ic.lower_trmm_trans(x);
        });
}
