#![allow(non_snake_case)]

use crate::algebra::*;
use rayon::prelude::*;

/// Block-diagonal matrix: an optional diagonal-scalar prefix (formally a
/// run of 1x1 blocks, stored flat) followed by dense square blocks.
///
/// Mismatched block structures between operands are programmer errors and
/// panic; the solver fixes every structure at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDiagMatrix<T> {
    /// diagonal-scalar part
    pub diag: Vec<T>,
    /// dense square blocks
    pub blocks: Vec<Matrix<T>>,
    dim: usize,
}

impl<T> BlockDiagMatrix<T>
where
    T: FloatT,
{
    pub fn new(diag_dim: usize, block_dims: &[usize]) -> Self {
        let diag = vec![T::zero(); diag_dim];
        let blocks: Vec<Matrix<T>> = block_dims
            .iter()
            .map(|&d| Matrix::zeros((d, d)))
            .collect();
        let dim = diag_dim + block_dims.iter().sum::<usize>();
        Self { diag, blocks, dim }
    }

    /// Total dimension: diagonal length plus the sum of block dimensions.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn set_zero(&mut self) {
        self.diag.set(&T::zero());
        for b in &mut self.blocks {
            b.set_zero();
        }
    }

    pub fn set_identity(&mut self) {
        self.set_zero();
        self.add_diagonal(&T::one());
    }

    pub fn add_diagonal(&mut self, c: &T) {
        for d in &mut self.diag {
            *d += c;
        }
        for b in &mut self.blocks {
            b.add_diagonal(c);
        }
    }

    /// diag part += alpha * v
    pub fn add_diag_part(&mut self, v: &[T], alpha: &T) {
        self.diag.add_scaled(alpha, v);
    }

    pub fn copy_from(&mut self, A: &Self) {
        self.assert_same_shape(A);
        self.diag.copy_from(&A.diag);
        for (b, a) in self.blocks.iter_mut().zip(A.blocks.iter()) {
            b.copy_from(a);
        }
    }

    /// self += A
    pub fn add_assign(&mut self, A: &Self) {
        self.assert_same_shape(A);
        self.diag.add_scaled(&T::one(), &A.diag);
        for (b, a) in self.blocks.iter_mut().zip(A.blocks.iter()) {
            b.add_assign(a);
        }
    }

    /// self -= A
    pub fn sub_assign(&mut self, A: &Self) {
        self.assert_same_shape(A);
        self.diag.add_scaled(&(-T::one()), &A.diag);
        for (b, a) in self.blocks.iter_mut().zip(A.blocks.iter()) {
            b.sub_assign(a);
        }
    }

    /// self += a * A
    pub fn add_scaled(&mut self, a: &T, A: &Self) {
        self.assert_same_shape(A);
        self.diag.add_scaled(a, &A.diag);
        for (b, ab) in self.blocks.iter_mut().zip(A.blocks.iter()) {
            b.add_scaled(a, ab);
        }
    }

    pub fn scale(&mut self, c: &T) {
        self.diag.scale(c);
        for b in &mut self.blocks {
            b.scale(c);
        }
    }

    pub fn symmetrize(&mut self) {
        for b in &mut self.blocks {
            b.symmetrize();
        }
    }

    pub fn max_abs(&self) -> T {
        let mut max = self.diag.norm_inf();
        for b in &self.blocks {
            let tmp = b.max_abs();
            if tmp > max {
                max = tmp;
            }
        }
        max
    }

    pub(crate) fn assert_same_shape(&self, A: &Self) {
        assert_eq!(self.diag.len(), A.diag.len());
        assert_eq!(self.blocks.len(), A.blocks.len());
        for (b, a) in self.blocks.iter().zip(A.blocks.iter()) {
            assert_eq!(b.size(), a.size());
        }
    }
}

/// C := alpha * A * B + beta * C, block by block; the diagonal part
/// multiplies elementwise.
pub fn block_scale_multiply_add<T: FloatT>(
    alpha: &T,
    A: &BlockDiagMatrix<T>,
    B: &BlockDiagMatrix<T>,
    beta: &T,
    C: &mut BlockDiagMatrix<T>,
) {
    A.assert_same_shape(B);
    A.assert_same_shape(C);

    for (c, (a, b)) in C.diag.iter_mut().zip(A.diag.iter().zip(B.diag.iter())) {
        *c = alpha.clone() * a * b + beta.clone() * &*c;
    }

    (&A.blocks, &B.blocks, &mut C.blocks)
        .into_par_iter()
        .for_each(|(a, b, c)| c.mul(a, b, alpha, beta));
}

/// Frobenius product of two symmetric block-diagonal matrices.
pub fn block_frobenius_product_symmetric<T: FloatT>(
    A: &BlockDiagMatrix<T>,
    B: &BlockDiagMatrix<T>,
) -> T {
    A.assert_same_shape(B);
    let mut result = A.diag.dot(&B.diag);
    for (a, b) in A.blocks.iter().zip(B.blocks.iter()) {
        result += frobenius_product_symmetric(a, b);
    }
    result
}

/// (X + dX) . (Y + dY) for symmetric block-diagonal operands, without
/// forming the sums.
pub fn block_frobenius_product_of_sums<T: FloatT>(
    X: &BlockDiagMatrix<T>,
    dX: &BlockDiagMatrix<T>,
    Y: &BlockDiagMatrix<T>,
    dY: &BlockDiagMatrix<T>,
) -> T {
    let mut result = T::zero();
    for i in 0..X.diag.len() {
        result += (X.diag[i].clone() + &dX.diag[i]) * (Y.diag[i].clone() + &dY.diag[i]);
    }
    for b in 0..X.blocks.len() {
        result += frobenius_product_of_sums(&X.blocks[b], &dX.blocks[b], &Y.blocks[b], &dY.blocks[b]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> BlockDiagMatrix<f64> {
        let mut A = BlockDiagMatrix::<f64>::new(2, &[2]);
        A.diag[0] = 1.0;
        A.diag[1] = 2.0;
        A.blocks[0][(0, 0)] = 3.0;
        A.blocks[0][(0, 1)] = 1.0;
        A.blocks[0][(1, 0)] = 1.0;
        A.blocks[0][(1, 1)] = 4.0;
        A
    }

    #[test]
    fn test_dims() {
        let A = example();
        assert_eq!(A.dim(), 4);
    }

    #[test]
    fn test_block_multiply_identity() {
        let A = example();
        let mut I = BlockDiagMatrix::<f64>::new(2, &[2]);
        I.set_identity();
        let mut C = BlockDiagMatrix::<f64>::new(2, &[2]);
        block_scale_multiply_add(&1.0, &A, &I, &0.0, &mut C);
        assert_eq!(C, A);
    }

    #[test]
    fn test_frobenius_of_sums_decomposes() {
        let X = example();
        let mut dX = example();
        dX.scale(&0.5);
        let mut Y = example();
        Y.add_diagonal(&1.0);
        let dY = example();

        // property: product-of-sums equals the symmetric product of the
        // explicitly formed sums
        let mut Xs = X.clone();
        Xs.add_assign(&dX);
        let mut Ys = Y.clone();
        Ys.add_assign(&dY);

        let lhs = block_frobenius_product_of_sums(&X, &dX, &Y, &dY);
        let rhs = block_frobenius_product_symmetric(&Xs, &Ys);
        assert!((lhs - rhs).abs() < 1e-12);
    }

    #[test]
    fn test_diag_only_reduces_to_dot() {
        let mut X = BlockDiagMatrix::<f64>::new(3, &[]);
        let mut Y = BlockDiagMatrix::<f64>::new(3, &[]);
        X.diag.copy_from(&[1.0, 2.0, 3.0]);
        Y.diag.copy_from(&[4.0, 5.0, 6.0]);
        assert_eq!(block_frobenius_product_symmetric(&X, &Y), 32.0);
    }
}
