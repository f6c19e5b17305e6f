#![allow(non_snake_case)]
//Rust hates greek characters
#![allow(confusable_idents)]

use crate::algebra::*;
use num_traits::Zero;
use std::cmp::Ordering;

const MAX_JACOBI_SWEEPS: usize = 60;
const MAX_QL_ITERATIONS: usize = 60;

// NR-style sign transfer: |a| carrying the sign of b
fn sign<T: FloatT>(a: &T, b: &T) -> T {
    if *b < T::zero() {
        -a.abs()
    } else {
        a.abs()
    }
}

fn hypot<T: FloatT>(a: &T, b: &T) -> T {
    (a.clone() * a + b.clone() * b).sqrt()
}

/// Symmetric dense eigenvalue engine (the `syev` kernel).
///
/// Cyclic Jacobi sweeps; eigenvalues only, ascending.  Works at any scalar
/// precision, which rules out the usual LAPACK route.
pub struct EigEngine<T> {
    /// Computed eigenvalues in ascending order
    pub λ: Vec<T>,

    // workspace copy of the input
    work: Matrix<T>,
}

impl<T> EigEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            λ: vec![T::zero(); n],
            work: Matrix::zeros((n, n)),
        }
    }

    /// Eigenvalues of symmetric A, ascending.  A is read only.
    pub fn eigvals(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if !A.is_square() || A.nrows() != self.λ.len() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        self.work.copy_from(A);
        let W = &mut self.work;

        let two = T::from_f64(2.0);
        let mut converged = false;

        for _sweep in 0..MAX_JACOBI_SWEEPS {
            let mut off = T::zero();
            let mut norm = T::zero();
            for p in 0..n {
                norm += W[(p, p)].clone() * &W[(p, p)];
                for q in p + 1..n {
                    off += W[(p, q)].clone() * &W[(p, q)];
                }
            }
            norm += off.clone() * &two;
            // off-diagonal mass at the rounding floor; MPFR never
            // underflows to exact zero, so the test must be relative
            let floor = T::epsilon() * &norm.sqrt() * T::from_f64(n as f64);
            if off.sqrt() <= floor {
                converged = true;
                break;
            }

            for p in 0..n {
                for q in p + 1..n {
                    let apq = W[(p, q)].clone();
                    if apq.is_zero() {
                        continue;
                    }
                    let θ = (W[(q, q)].clone() - &W[(p, p)]) / (apq.clone() * &two);
                    let t = {
                        let mag = θ.abs();
                        let tt = (mag.clone() + (mag.clone() * &mag + T::one()).sqrt()).recip();
                        if θ < T::zero() {
                            -tt
                        } else {
                            tt
                        }
                    };
                    let c = (t.clone() * &t + T::one()).sqrt().recip();
                    let s = t.clone() * &c;
                    let τ = s.clone() / (T::one() + &c);

                    let tapq = t.clone() * &apq;
                    W[(p, p)] -= &tapq;
                    W[(q, q)] += &tapq;
                    W[(p, q)] = T::zero();
                    W[(q, p)] = T::zero();

                    for r in 0..n {
                        if r == p || r == q {
                            continue;
                        }
                        let arp = W[(r, p)].clone();
                        let arq = W[(r, q)].clone();
                        let new_rp =
                            arp.clone() - s.clone() * &(arq.clone() + τ.clone() * &arp);
                        let new_rq = arq.clone() + s.clone() * &(arp - τ.clone() * &arq);
                        W[(r, p)] = new_rp.clone();
                        W[(p, r)] = new_rp;
                        W[(r, q)] = new_rq.clone();
                        W[(q, r)] = new_rq;
                    }
                }
            }
        }
        if !converged && n > 1 {
            return Err(DenseFactorizationError::Eigen);
        }

        for i in 0..n {
            self.λ[i] = W[(i, i)].clone();
        }
        self.λ
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        Ok(())
    }
}

/// Symmetric tridiagonal eigensolver (the `steqr` kernel): implicit QL
/// with Wilkinson shifts, accumulating the rotations into `Q`.
/// Eigenvalues come back ascending with matching `Q` columns.
pub struct SteqrEngine<T> {
    /// Computed eigenvalues in ascending order
    pub λ: Vec<T>,

    /// Eigenvector matrix, one column per eigenvalue
    pub Q: Matrix<T>,

    d: Vec<T>,
    e: Vec<T>,
}

impl<T> SteqrEngine<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            λ: Vec::new(),
            Q: Matrix::zeros((0, 0)),
            d: Vec::new(),
            e: Vec::new(),
        }
    }

    /// Factor the tridiagonal matrix with diagonal `diag` (length n) and
    /// subdiagonal `offdiag` (at least n-1 entries).
    pub fn factor(
        &mut self,
        diag: &[T],
        offdiag: &[T],
    ) -> Result<(), DenseFactorizationError> {
        let n = diag.len();
        if n == 0 || offdiag.len() + 1 < n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }

        self.d = diag.to_vec();
        self.e = offdiag[..n - 1].to_vec();
        self.e.push(T::zero());
        self.Q = Matrix::identity(n);

        self.ql_implicit(n)?;
        self.sort_ascending(n);
        self.λ = self.d.clone();
        Ok(())
    }

    fn ql_implicit(&mut self, n: usize) -> Result<(), DenseFactorizationError> {
        let d = &mut self.d;
        let e = &mut self.e;
        let Q = &mut self.Q;
        let two = T::from_f64(2.0);

        for l in 0..n {
            let mut iter = 0;
            loop {
                // find the first negligible subdiagonal element at or after l
                let mut m = l;
                while m + 1 < n {
                    let dd = d[m].abs() + d[m + 1].abs();
                    if e[m].abs() <= T::epsilon() * &dd {
                        break;
                    }
                    m += 1;
                }
                if m == l {
                    break;
                }
                iter += 1;
                if iter > MAX_QL_ITERATIONS {
                    return Err(DenseFactorizationError::Eigen);
                }

                // Wilkinson shift
                let mut g = (d[l + 1].clone() - &d[l]) / (e[l].clone() * &two);
                let mut r = hypot(&g, &T::one());
                g = d[m].clone() - &d[l] + e[l].clone() / (g.clone() + &sign(&r, &g));
                let mut s = T::one();
                let mut c = T::one();
                let mut p = T::zero();

                let mut underflow = false;
                for i in (l..m).rev() {
                    let f = s.clone() * &e[i];
                    let b = c.clone() * &e[i];
                    r = hypot(&f, &g);
                    e[i + 1] = r.clone();
                    if r.is_zero() {
                        d[i + 1] -= &p;
                        e[m] = T::zero();
                        underflow = true;
                        break;
                    }
                    s = f.clone() / &r;
                    c = g.clone() / &r;
                    g = d[i + 1].clone() - &p;
                    let r2 = (d[i].clone() - &g) * &s + c.clone() * &b * &two;
                    p = s.clone() * &r2;
                    d[i + 1] = g.clone() + &p;
                    g = c.clone() * &r2 - &b;

                    for k in 0..n {
                        let fk = Q[(k, i + 1)].clone();
                        Q[(k, i + 1)] = s.clone() * &Q[(k, i)] + c.clone() * &fk;
                        Q[(k, i)] = c.clone() * &Q[(k, i)] - s.clone() * &fk;
                    }
                }
                if underflow {
                    continue;
                }
                d[l] -= &p;
                e[l] = g;
                e[m] = T::zero();
            }
        }
        Ok(())
    }

    fn sort_ascending(&mut self, n: usize) {
        for i in 0..n {
            let mut k = i;
            for j in i + 1..n {
                if self.d[j] < self.d[k] {
                    k = j;
                }
            }
            if k != i {
                self.d.swap(i, k);
                for row in 0..n {
                    let tmp = self.Q[(row, i)].clone();
                    self.Q[(row, i)] = self.Q[(row, k)].clone();
                    self.Q[(row, k)] = tmp;
                }
            }
        }
    }
}

impl<T: FloatT> Default for SteqrEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}
