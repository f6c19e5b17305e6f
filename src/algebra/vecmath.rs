use super::FloatT;
use itertools::izip;
use num_traits::Zero;
use std::iter::zip;

/// Vector operations on slices of [`FloatT`](crate::algebra::FloatT)
pub trait VectorMath<T> {
    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// set all elements to the same value
    fn set(&mut self, c: &T) -> &mut Self;

    /// Elementwise scaling.
    fn scale(&mut self, c: &T) -> &mut Self;

    /// Elementwise negation.
    fn negate(&mut self) -> &mut Self;

    /// Elementwise product, `self[i] = x[i] * y[i]`
    fn set_product(&mut self, x: &Self, y: &Self) -> &mut Self;

    /// `self += a * x`
    fn add_scaled(&mut self, a: &T, x: &Self) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> T;

    /// Maximum absolute element.  Zero for an empty slice.
    fn norm_inf(&self) -> T;
}

impl<T: FloatT> VectorMath<T> for [T] {
    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.clone_from_slice(src);
        self
    }

    fn set(&mut self, c: &T) -> &mut Self {
        for x in &mut *self {
            *x = c.clone();
        }
        self
    }

    fn scale(&mut self, c: &T) -> &mut Self {
        for x in &mut *self {
            *x *= c;
        }
        self
    }

    fn negate(&mut self) -> &mut Self {
        for x in &mut *self {
            *x = -x.clone();
        }
        self
    }

    fn set_product(&mut self, x: &[T], y: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        assert_eq!(self.len(), y.len());
        for (out, x, y) in izip!(&mut *self, x, y) {
            *out = x.clone() * y;
        }
        self
    }

    fn add_scaled(&mut self, a: &T, x: &[T]) -> &mut Self {
        assert_eq!(self.len(), x.len());
        for (out, x) in zip(&mut *self, x) {
            *out += a.clone() * x;
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        let mut out = T::zero();
        for (x, y) in zip(self, y) {
            out += x.clone() * y;
        }
        out
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for x in self {
            let a = x.abs();
            if a > out {
                out = a;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_norms() {
        let x = vec![1.0, -2.0, 3.0];
        let y = vec![2.0, 1.0, -1.0];
        assert_eq!(x.dot(&y), -3.0);
        assert_eq!(x.norm_inf(), 3.0);
    }

    #[test]
    fn test_add_scaled() {
        let mut x = vec![1.0, 2.0];
        x.add_scaled(&2.0, &[3.0, -1.0]);
        assert_eq!(x, vec![7.0, 0.0]);
    }

    #[test]
    fn test_set_product() {
        let mut out = vec![0.0; 3];
        out.set_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_eq!(out, vec![4.0, 10.0, 18.0]);
    }
}
