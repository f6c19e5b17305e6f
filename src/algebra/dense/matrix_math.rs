#![allow(non_snake_case)]

use crate::algebra::*;
use num_traits::Zero;

// Hand-written replacements for the BLAS level-2/3 calls the solver needs.
// Everything is generic over FloatT so the same code paths serve f64 and
// MPFR operands.

impl<T> Matrix<T>
where
    T: FloatT,
{
    /// C := alpha * A * B + beta * C
    pub fn mul(&mut self, A: &Matrix<T>, B: &Matrix<T>, alpha: &T, beta: &T) {
        assert_eq!(A.ncols(), B.nrows());
        assert_eq!(A.nrows(), self.nrows());
        assert_eq!(B.ncols(), self.ncols());

        self.scale(beta);
        for j in 0..self.n {
            for k in 0..A.n {
                let t = alpha.clone() * &B[(k, j)];
                if t.is_zero() {
                    continue;
                }
                for i in 0..self.m {
                    self[(i, j)] += A[(i, k)].clone() * &t;
                }
            }
        }
    }

    /// y := alpha * A * x + beta * y
    pub fn gemv(&self, y: &mut [T], x: &[T], alpha: &T, beta: &T) {
        assert_eq!(self.n, x.len());
        assert_eq!(self.m, y.len());

        y.scale(beta);
        for j in 0..self.n {
            let t = alpha.clone() * &x[j];
            if t.is_zero() {
                continue;
            }
            for (yi, aij) in y.iter_mut().zip(self.col_slice(j)) {
                *yi += aij.clone() * &t;
            }
        }
    }

    /// v := L * v, taking self as lower triangular
    pub fn lower_trmv(&self, v: &mut [T]) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(v.len(), n);

        for i in (0..n).rev() {
            let mut sum = T::zero();
            for k in 0..=i {
                sum += self[(i, k)].clone() * &v[k];
            }
            v[i] = sum;
        }
    }

    /// v := L' * v, taking self as lower triangular
    pub fn lower_trmv_trans(&self, v: &mut [T]) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(v.len(), n);

        for i in 0..n {
            let mut sum = T::zero();
            for k in i..n {
                sum += self[(k, i)].clone() * &v[k];
            }
            v[i] = sum;
        }
    }

    /// b := L \ b (forward substitution), taking self as lower triangular
    pub fn lower_trsv(&self, b: &mut [T]) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(b.len(), n);

        for i in 0..n {
            let mut sum = b[i].clone();
            for k in 0..i {
                sum -= self[(i, k)].clone() * &b[k];
            }
            b[i] = sum / &self[(i, i)];
        }
    }

    /// b := L' \ b (backward substitution), taking self as lower triangular
    pub fn lower_trsv_trans(&self, b: &mut [T]) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(b.len(), n);

        for i in (0..n).rev() {
            let mut sum = b[i].clone();
            for k in i + 1..n {
                sum -= self[(k, i)].clone() * &b[k];
            }
            b[i] = sum / &self[(i, i)];
        }
    }

    /// B := L * B, taking self as lower triangular
    pub fn lower_trmm(&self, B: &mut Matrix<T>) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(B.nrows(), n);

        for j in 0..B.ncols() {
            // rows above i are still the original values when we reach them
            for i in (0..n).rev() {
                let mut sum = T::zero();
                for k in 0..=i {
                    sum += self[(i, k)].clone() * &B[(k, j)];
                }
                B[(i, j)] = sum;
            }
        }
    }

    /// B := L' * B, taking self as lower triangular
    pub fn lower_trmm_trans(&self, B: &mut Matrix<T>) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(B.nrows(), n);

        for j in 0..B.ncols() {
            for i in 0..n {
                let mut sum = T::zero();
                for k in i..n {
                    sum += self[(k, i)].clone() * &B[(k, j)];
                }
                B[(i, j)] = sum;
            }
        }
    }

    /// B := L \ B column by column, taking self as lower triangular
    pub fn lower_trsm(&self, B: &mut Matrix<T>) {
        let n = self.nrows();
        assert!(self.is_square());
        assert_eq!(B.nrows(), n);

        for j in 0..B.ncols() {
            for i in 0..n {
                let mut sum = B[(i, j)].clone();
                for k in 0..i {
                    sum -= self[(i, k)].clone() * &B[(k, j)];
                }
                B[(i, j)] = sum / &self[(i, i)];
            }
        }
    }
}

/// Frobenius product of two symmetric matrices, using only the upper
/// triangle of each.
pub fn frobenius_product_symmetric<T: FloatT>(A: &Matrix<T>, B: &Matrix<T>) -> T {
    assert_eq!(A.size(), B.size());
    assert!(A.is_square());

    let mut result = T::zero();
    for c in 0..A.ncols() {
        for r in 0..c {
            result += A[(r, c)].clone() * &B[(r, c)];
        }
    }
    result *= T::from_f64(2.0);

    for r in 0..A.nrows() {
        result += A[(r, r)].clone() * &B[(r, r)];
    }
    result
}

/// (X + dX) . (Y + dY) where all four are symmetric and '.' is the
/// Frobenius product.
pub fn frobenius_product_of_sums<T: FloatT>(
    X: &Matrix<T>,
    dX: &Matrix<T>,
    Y: &Matrix<T>,
    dY: &Matrix<T>,
) -> T {
    let mut result = T::zero();
    for c in 0..X.ncols() {
        for r in 0..c {
            result += (X[(r, c)].clone() + &dX[(r, c)]) * (Y[(r, c)].clone() + &dY[(r, c)]);
        }
    }
    result *= T::from_f64(2.0);

    for r in 0..X.nrows() {
        result += (X[(r, r)].clone() + &dX[(r, r)]) * (Y[(r, r)].clone() + &dY[(r, r)]);
    }
    result
}
