#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::Sdp;
use rayon::prelude::*;

// Congruence kernels that exploit the tensor structure of the constraint
// matrices.  These feed the Schur complement assembly and the residues, and
// are the only places the bilinear bases are touched each iteration.

/// result := b'^T a b', where b' = b ⊗ 1 in the tile layout that treats
/// `a` as a stacked sequence of copies of the square base.
///
/// - `a`      : (l*m) x (l*m) symmetric
/// - `b`      : l x n
/// - `work`   : (l*m) x (n*m)
/// - `result` : (n*m) x (n*m) symmetric
pub fn tensor_matrix_congruence<T: FloatT>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    work: &mut Matrix<T>,
    result: &mut Matrix<T>,
) {
    let m = a.nrows() / b.nrows();

    assert_eq!(result.nrows(), b.ncols() * m);
    assert_eq!(result.ncols(), b.ncols() * m);
    assert_eq!(work.nrows(), a.nrows());
    assert_eq!(work.ncols(), result.ncols());

    // work = a b'
    for c in 0..work.ncols() {
        let b_col = c % b.ncols();
        let a_col_offset = (c / b.ncols()) * b.nrows();

        for r in 0..work.nrows() {
            let mut tmp = T::zero();
            for k in 0..b.nrows() {
                tmp += a[(r, a_col_offset + k)].clone() * &b[(k, b_col)];
            }
            work[(r, c)] = tmp;
        }
    }

    // result = b'^T work; result is symmetric, so compute the upper
    // triangle and mirror
    for c in 0..result.ncols() {
        for r in 0..=c {
            let b_col = r % b.ncols();
            let work_row_offset = (r / b.ncols()) * b.nrows();

            let mut tmp = T::zero();
            for k in 0..b.nrows() {
                tmp += b[(k, b_col)].clone() * &work[(work_row_offset + k, c)];
            }

            result[(r, c)] = tmp.clone();
            if c != r {
                result[(c, r)] = tmp;
            }
        }
    }
}

/// Fill `result` with the congruence of every block of `A` against its
/// bilinear basis.  Block b of A pairs with basis b; the workspace holds
/// one scratch matrix per block.
pub fn compute_bilinear_pairings<T: FloatT>(
    A: &BlockDiagMatrix<T>,
    bilinear_bases: &[Matrix<T>],
    workspace: &mut [Matrix<T>],
    result: &mut BlockDiagMatrix<T>,
) {
    assert_eq!(A.blocks.len(), bilinear_bases.len());
    assert_eq!(A.blocks.len(), workspace.len());
    assert_eq!(A.blocks.len(), result.blocks.len());

    (
        &A.blocks,
        bilinear_bases,
        &mut workspace[..],
        &mut result.blocks,
    )
        .into_par_iter()
        .for_each(|(a, basis, work, out)| tensor_matrix_congruence(a, basis, work, out));
}

/// Write V diag(d) V^T into the (block_row, block_col) tile of `result`,
/// upper triangle mirrored within the tile.
pub fn diagonal_congruence_transpose<T: FloatT>(
    d: &[T],
    V: &Matrix<T>,
    block_row: usize,
    block_col: usize,
    result: &mut Matrix<T>,
) {
    assert!(d.len() >= V.ncols());

    for p in 0..V.nrows() {
        for q in 0..=p {
            let mut tmp = T::zero();
            for n in 0..V.ncols() {
                tmp += d[n].clone() * &V[(p, n)] * &V[(q, n)];
            }

            result[(block_row * V.nrows() + p, block_col * V.nrows() + q)] = tmp.clone();
            if p != q {
                result[(block_row * V.nrows() + q, block_col * V.nrows() + p)] = tmp;
            }
        }
    }
}

/// v^T A' v, where A' is the (block_row, block_col) dim x dim tile of A.
pub fn bilinear_block_pairing<T: FloatT>(
    v: &[T],
    dim: usize,
    A: &Matrix<T>,
    block_row: usize,
    block_col: usize,
) -> T {
    assert!(v.len() >= dim);

    let mut result = T::zero();
    for r in 0..dim {
        let mut tmp = T::zero();
        for c in 0..dim {
            tmp += v[c].clone() * &A[(block_row * dim + r, block_col * dim + c)];
        }
        result += v[r].clone() * &tmp;
    }
    result
}

/// result := sum_p x_p F_p, the constraint-matrix weighted sum.  The
/// diagonal part accumulates through the free-variable matrix; each dense
/// block accumulates rank-one congruences of the bilinear bases.
pub fn constraint_matrix_weighted_sum<T: FloatT>(
    sdp: &Sdp<T>,
    x: &[T],
    result: &mut BlockDiagMatrix<T>,
) {
    assert_eq!(x.len(), sdp.num_constraints());

    // stale mirror tiles from a previous call must not leak through the
    // final symmetrize
    result.set_zero();

    let F = &sdp.free_var_matrix;
    for (n, out) in result.diag.iter_mut().enumerate() {
        let mut acc = T::zero();
        for (p, xp) in x.iter().enumerate() {
            acc += xp.clone() * &F[(p, n)];
        }
        *out = acc;
    }

    let mut p = 0;
    for j in 0..sdp.num_groups() {
        let dj = sdp.degrees[j];
        for s in 0..sdp.dimensions[j] {
            for r in 0..=s {
                for &b in &sdp.blocks[j] {
                    diagonal_congruence_transpose(
                        &x[p..p + dj + 1],
                        &sdp.bilinear_bases[b],
                        r,
                        s,
                        &mut result.blocks[b],
                    );
                }
                p += dj + 1;
            }
        }
    }
    debug_assert_eq!(p, x.len());

    // off-diagonal (r,s) tiles were written once; the mirror halves them
    // into the symmetric constraint-matrix convention
    result.symmetrize();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_congruence_identity_input() {
        // with a = I the congruence must equal Q^T Q lifted to the tensor
        // layout: tile (i,j) is delta_ij * (Q^T Q)
        let l = 2;
        let m = 2;
        let n = 3;
        let a = Matrix::<f64>::identity(l * m);
        let q = Matrix::new_from_rows((l, n), &[2., 4., 6., 3., 5., 7.]);
        let mut work = Matrix::zeros((l * m, n * m));
        let mut result = Matrix::zeros((n * m, n * m));

        tensor_matrix_congruence(&a, &q, &mut work, &mut result);

        let mut qtq = Matrix::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                qtq[(i, j)] = q.col_slice(i).dot(q.col_slice(j));
            }
        }
        for bi in 0..m {
            for bj in 0..m {
                for i in 0..n {
                    for j in 0..n {
                        let expect = if bi == bj { qtq[(i, j)] } else { 0.0 };
                        assert!((result[(bi * n + i, bj * n + j)] - expect).abs() < 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_diagonal_congruence() {
        // V diag(d) V^T against a direct computation
        let V = Matrix::new_from_rows((2, 3), &[1., 2., 3., 4., 5., 6.]);
        let d = vec![1.0, 0.5, 2.0];
        let mut result = Matrix::<f64>::zeros((2, 2));
        diagonal_congruence_transpose(&d, &V, 0, 0, &mut result);

        for p in 0..2 {
            for q in 0..2 {
                let expect: f64 =
                    (0..3).map(|n| d[n] * V[(p, n)] * V[(q, n)]).sum();
                assert!((result[(p, q)] - expect).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_bilinear_block_pairing() {
        let A = Matrix::new_from_rows((2, 2), &[1., 2., 2., 5.]);
        let v = vec![3.0, -1.0];
        // v^T A v = 9*1 + 2*3*(-1)*2 + 1*5 = 9 - 12 + 5 = 2
        assert!((bilinear_block_pairing(&v, 2, &A, 0, 0) - 2.0).abs() < 1e-14);
    }
}
