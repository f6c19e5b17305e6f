#![allow(non_snake_case)]

use crate::algebra::*;

/// Lower Cholesky factorization engine with an owned factor.
///
/// The factor routine reads only the lower triangle of its input, so a
/// matrix holding valid data on one triangle only is acceptable.
pub struct CholeskyEngine<T> {
    /// lower triangular factor (stored as square dense)
    pub L: Matrix<T>,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let L = Matrix::<T>::zeros((n, n));
        Self { L }
    }

    /// Compute the lower Cholesky factor of symmetric positive definite A.
    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if A.size() != self.L.size() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        let L = &mut self.L;

        for j in 0..n {
            let mut d = A[(j, j)].clone();
            for k in 0..j {
                d -= L[(j, k)].clone() * &L[(j, k)];
            }
            if !(d > T::zero()) || !d.is_finite() {
                return Err(DenseFactorizationError::Cholesky(j));
            }
            let ljj = d.sqrt();
            let ljj_inv = ljj.recip();
            L[(j, j)] = ljj;

            for i in j + 1..n {
                let mut s = A[(i, j)].clone();
                for k in 0..j {
                    s -= L[(i, k)].clone() * &L[(j, k)];
                }
                L[(i, j)] = s * &ljj_inv;
            }
            for i in 0..j {
                L[(i, j)] = T::zero();
            }
        }
        Ok(())
    }

    /// b := L'^{-1} L^{-1} b = A^{-1} b
    pub fn solve_in_place(&self, b: &mut [T]) {
        self.L.lower_trsv(b);
        self.L.lower_trsv_trans(b);
    }
}

/// result := L^{-1} for lower triangular L, via L * result = I.
pub fn inverse_lower_triangular<T: FloatT>(L: &Matrix<T>, result: &mut Matrix<T>) {
    assert!(L.is_square());
    assert_eq!(L.size(), result.size());

    result.set_identity();
    L.lower_trsm(result);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cholesky() {
        #[rustfmt::skip]
        let S = Matrix::<f64>::new_from_rows((3, 3),
            &[ 8., -2., 4.,
              -2., 12., 2.,
               4.,  2., 6.]);

        let mut eng = CholeskyEngine::<f64>::new(3);
        assert!(eng.factor(&S).is_ok());

        // L L' must reproduce S
        let mut Lt = Matrix::<f64>::zeros((3, 3));
        for r in 0..3 {
            for c in 0..3 {
                Lt[(r, c)] = eng.L[(c, r)];
            }
        }
        let mut M = Matrix::<f64>::zeros((3, 3));
        M.mul(&eng.L, &Lt, &1.0, &0.0);
        for (a, b) in M.data().iter().zip(S.data().iter()) {
            assert!((a - b).abs() < 1e-12);
        }

        // solve against a known rhs
        let mut b = vec![1.0, 2.0, 3.0];
        eng.solve_in_place(&mut b);
        let mut back = vec![0.0; 3];
        S.gemv(&mut back, &b, &1.0, &0.0);
        assert!((back[0] - 1.0).abs() < 1e-12);
        assert!((back[1] - 2.0).abs() < 1e-12);
        assert!((back[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_not_pd() {
        let S = Matrix::<f64>::new_from_rows((2, 2), &[1., 2., 2., 1.]);
        let mut eng = CholeskyEngine::<f64>::new(2);
        assert!(matches!(
            eng.factor(&S),
            Err(DenseFactorizationError::Cholesky(1))
        ));
    }

    #[test]
    fn test_inverse_lower_triangular() {
        let mut L = Matrix::<f64>::zeros((2, 2));
        L[(0, 0)] = 2.0;
        L[(1, 0)] = 1.0;
        L[(1, 1)] = 4.0;
        let mut Linv = Matrix::<f64>::zeros((2, 2));
        inverse_lower_triangular(&L, &mut Linv);

        let mut I = Matrix::<f64>::zeros((2, 2));
        I.mul(&L, &Linv, &1.0, &0.0);
        assert!((I[(0, 0)] - 1.0).abs() < 1e-15);
        assert!((I[(1, 1)] - 1.0).abs() < 1e-15);
        assert!(I[(1, 0)].abs() < 1e-15);
        assert!(I[(0, 1)].abs() < 1e-15);
    }
}
