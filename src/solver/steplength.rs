#![allow(non_snake_case)]
//Rust hates greek characters
#![allow(confusable_idents)]

use crate::algebra::*;

// Below this dimension the Lanczos machinery costs more than it saves and
// a direct eigensolve is used instead.
const SMALL_BLOCK_DIM: usize = 4;

/// Workspace for the minimum-eigenvalue bound behind the step-length
/// selection.  Sized once for the largest block of the problem.
pub(crate) struct StepLengthWorkspace<T> {
    q: Vec<T>,
    qold: Vec<T>,
    r: Vec<T>,
    w: Vec<T>,
    tmp: Vec<T>,
    diag: Vec<T>,
    offdiag: Vec<T>,
    steqr: SteqrEngine<T>,
}

impl<T> StepLengthWorkspace<T>
where
    T: FloatT,
{
    pub fn new(max_block_dim: usize) -> Self {
        let n = max_block_dim;
        Self {
            q: vec![T::zero(); n],
            qold: vec![T::zero(); n],
            r: vec![T::zero(); n],
            w: vec![T::zero(); n],
            tmp: vec![T::zero(); n],
            diag: vec![T::zero(); n],
            offdiag: vec![T::zero(); n],
            steqr: SteqrEngine::new(),
        }
    }

    /// Lower bound on the minimum eigenvalue of L A L', for lower
    /// triangular L and symmetric A.
    pub fn min_eigenvalue(
        &mut self,
        L: &Matrix<T>,
        A: &Matrix<T>,
    ) -> Result<T, DenseFactorizationError> {
        let dim = A.nrows();
        assert_eq!(L.nrows(), dim);

        if dim <= SMALL_BLOCK_DIM {
            return min_eigenvalue_via_qr(L, A);
        }
        self.min_eigenvalue_via_lanczos(L, A)
    }

    // Lanczos iteration on L A L', stopping once the smallest Ritz value
    // stabilizes.  The tridiagonal eigenproblem runs on a cadence that
    // thins out as k grows; `error` is the last component of the Ritz
    // vector and bounds the residual of the estimate.
    fn min_eigenvalue_via_lanczos(
        &mut self,
        L: &Matrix<T>,
        A: &Matrix<T>,
    ) -> Result<T, DenseFactorizationError> {
        let dim = A.nrows();
        let sqrt_dim = (dim as f64).sqrt();

        let mut min = T::from_f64(1.0e51);
        let mut min_old = T::from_f64(1.0e52);
        let min_min = T::from_f64(1.0e50);
        let mut error = T::from_f64(1.0e10);

        let Self {
            q,
            qold,
            r,
            w,
            tmp,
            diag,
            offdiag,
            steqr,
        } = self;
        let q = &mut q[..dim];
        let qold = &mut qold[..dim];
        let r = &mut r[..dim];
        let w = &mut w[..dim];
        let tmp = &mut tmp[..dim];
        let diag = &mut diag[..dim];
        let offdiag = &mut offdiag[..dim];

        diag.set(&min_min);
        offdiag.set(&T::zero());
        q.set(&T::zero());
        r.set(&T::one());

        let mut beta = T::from_f64(dim as f64).sqrt(); // norm of r
        let beta_floor = T::from_f64(1.0e-16);
        let stab_rel = T::from_f64(1.0e-5);
        let stab_abs = T::from_f64(1.0e-8);
        let err_rel = T::from_f64(1.0e-2);
        let err_abs = T::from_f64(1.0e-4);

        let mut k = 0usize;
        let mut kk = 0usize;

        loop {
            let stabilized = {
                let drift = (min.clone() - &min_old).abs();
                let residual = (error.clone() * &beta).abs();
                drift <= stab_rel.clone() * &min.abs() + &stab_abs
                    && residual <= err_rel.clone() * &min.abs() + &err_abs
            };
            if k >= dim || (k as f64) >= sqrt_dim + 10.0 || beta <= beta_floor || stabilized {
                break;
            }

            qold.copy_from(q);
            let beta_inv = beta.recip();
            for (qi, ri) in q.iter_mut().zip(r.iter()) {
                *qi = ri.clone() * &beta_inv;
            }

            // w = L A L' q
            w.copy_from(q);
            L.lower_trmv_trans(w);
            A.gemv(tmp, w, &T::one(), &T::zero());
            w.copy_from(tmp);
            L.lower_trmv(w);

            let alpha = q.dot(w);
            diag[k] = alpha.clone();

            // r = w - alpha q - beta qold
            r.copy_from(w);
            r.add_scaled(&-alpha, q);
            r.add_scaled(&-beta.clone(), qold);

            if (kk as f64) >= (k as f64).sqrt() || k == dim - 1 || (k as f64) > (dim as f64 + 9.0).sqrt()
            {
                kk = 0;
                steqr.factor(&diag[..=k], &offdiag[..k])?;
                min_old = min;
                min = steqr.λ[0].clone();
                error = steqr.Q[(k, 0)].clone();
            }

            beta = r.dot(r).sqrt();
            offdiag[k] = beta.clone();
            k += 1;
            kk += 1;
        }

        Ok(min - (error * &beta).abs())
    }
}

// Direct route for small blocks: form M = L A L' and take its smallest
// eigenvalue by the dense symmetric solver.
fn min_eigenvalue_via_qr<T: FloatT>(
    L: &Matrix<T>,
    A: &Matrix<T>,
) -> Result<T, DenseFactorizationError> {
    let n = A.nrows();
    let mut M = Matrix::<T>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut acc = T::zero();
            for p in 0..=i {
                for q in 0..=j {
                    acc += L[(i, p)].clone() * &A[(p, q)] * &L[(j, q)];
                }
            }
            M[(i, j)] = acc.clone();
            M[(j, i)] = acc;
        }
    }

    let mut engine = EigEngine::new(n);
    engine.eigvals(&M)?;
    Ok(engine.λ[0].clone())
}

/// Largest fraction of the step direction `d` that keeps the matrix with
/// inverse Cholesky factor `inv_cholesky` positive definite, shrunk by
/// gamma.  Returns 1 whenever the direction itself is positive
/// semidefinite in the scaled frame.
pub(crate) fn step_length<T: FloatT>(
    workspace: &mut StepLengthWorkspace<T>,
    inv_cholesky: &BlockDiagMatrix<T>,
    d: &BlockDiagMatrix<T>,
    gamma: &T,
) -> Result<T, DenseFactorizationError> {
    inv_cholesky.assert_same_shape(d);

    // diagonal-scalar part: L^-1 d L^-T reduces to d_i / a_i
    let mut lambda_min: Option<T> = None;
    for (di, ic) in d.diag.iter().zip(inv_cholesky.diag.iter()) {
        let v = di.clone() * ic * ic;
        lambda_min = Some(match lambda_min {
            None => v,
            Some(cur) => cur.min(v),
        });
    }

    for (ic, db) in inv_cholesky.blocks.iter().zip(d.blocks.iter()) {
        let v = workspace.min_eigenvalue(ic, db)?;
        lambda_min = Some(match lambda_min {
            None => v,
            Some(cur) => cur.min(v),
        });
    }

    let lambda_min = match lambda_min {
        Some(v) => v,
        None => return Ok(T::one()),
    };

    if lambda_min >= T::zero() {
        Ok(T::one())
    } else {
        Ok((gamma.clone() / lambda_min.abs()).min(T::one()))
    }
}
