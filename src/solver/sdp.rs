use crate::algebra::*;
use thiserror::Error;

/// One entry of the constraint index table: flat constraint index `p`
/// together with its (r, s, k) position inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexTuple {
    pub p: usize,
    pub r: usize,
    pub s: usize,
    pub k: usize,
}

/// Error type returned when problem data fails validation at construction.
#[derive(Error, Debug)]
pub enum SdpError {
    #[error("dimensions, degrees and blocks must have one entry per group")]
    GroupCountMismatch,
    #[error("group {group} has dimension zero")]
    EmptyGroup { group: usize },
    #[error(
        "constraint count mismatch: the groups enumerate {expected} constraints \
         but the primal objective has {actual} entries"
    )]
    ConstraintCountMismatch { expected: usize, actual: usize },
    #[error(
        "free variable matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}"
    )]
    FreeVarMatrixShape {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
    #[error("group block lists must enumerate the bilinear bases 0..{count} in order")]
    BlockIndexOrder { count: usize },
    #[error(
        "bilinear basis {index} has {cols} columns but its group has degree {degree}"
    )]
    BasisShape {
        index: usize,
        cols: usize,
        degree: usize,
    },
}

/// The read-only problem description.
///
/// A problem is a collection of J constraint groups; group j carries a
/// matrix dimension, a polynomial degree, and the bilinear basis blocks
/// that encode its positivity constraint.  The free-variable matrix couples
/// every constraint to the N free dual variables.  Immutable once built.
#[derive(Debug, Clone)]
pub struct Sdp<T> {
    pub bilinear_bases: Vec<Matrix<T>>,
    /// P x N coupling to the free dual variables
    pub free_var_matrix: Matrix<T>,
    /// length P
    pub primal_objective_c: Vec<T>,
    /// length N
    pub dual_objective_b: Vec<T>,
    pub objective_const: T,
    pub dimensions: Vec<usize>,
    pub degrees: Vec<usize>,
    /// per group: indices into `bilinear_bases`
    pub blocks: Vec<Vec<usize>>,
    /// per group: (p, r, s, k) tuples, p strictly increasing across groups
    pub constraint_indices: Vec<Vec<IndexTuple>>,
}

impl<T> Sdp<T>
where
    T: FloatT,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bilinear_bases: Vec<Matrix<T>>,
        free_var_matrix: Matrix<T>,
        primal_objective_c: Vec<T>,
        dual_objective_b: Vec<T>,
        objective_const: T,
        dimensions: Vec<usize>,
        degrees: Vec<usize>,
        blocks: Vec<Vec<usize>>,
    ) -> Result<Self, SdpError> {
        let num_groups = dimensions.len();
        if degrees.len() != num_groups || blocks.len() != num_groups {
            return Err(SdpError::GroupCountMismatch);
        }

        let mut expected = 0;
        for (j, (&dim, &deg)) in dimensions.iter().zip(degrees.iter()).enumerate() {
            if dim == 0 {
                return Err(SdpError::EmptyGroup { group: j });
            }
            expected += dim * (dim + 1) / 2 * (deg + 1);
        }
        if primal_objective_c.len() != expected {
            return Err(SdpError::ConstraintCountMismatch {
                expected,
                actual: primal_objective_c.len(),
            });
        }
        if free_var_matrix.nrows() != expected
            || free_var_matrix.ncols() != dual_objective_b.len()
        {
            return Err(SdpError::FreeVarMatrixShape {
                rows: free_var_matrix.nrows(),
                cols: free_var_matrix.ncols(),
                expected_rows: expected,
                expected_cols: dual_objective_b.len(),
            });
        }

        // the PSD-block index of X doubles as the bilinear basis index, so
        // the group lists must walk the bases exactly once, in order
        let mut next = 0;
        for group in &blocks {
            for &b in group {
                if b != next {
                    return Err(SdpError::BlockIndexOrder {
                        count: bilinear_bases.len(),
                    });
                }
                next += 1;
            }
        }
        if next != bilinear_bases.len() {
            return Err(SdpError::BlockIndexOrder {
                count: bilinear_bases.len(),
            });
        }

        for (j, group) in blocks.iter().enumerate() {
            for &b in group {
                let cols = bilinear_bases[b].ncols();
                if cols != degrees[j] + 1 {
                    return Err(SdpError::BasisShape {
                        index: b,
                        cols,
                        degree: degrees[j],
                    });
                }
            }
        }

        let mut constraint_indices = Vec::with_capacity(num_groups);
        let mut p = 0;
        for j in 0..num_groups {
            let mut tuples =
                Vec::with_capacity(dimensions[j] * (dimensions[j] + 1) / 2 * (degrees[j] + 1));
            for s in 0..dimensions[j] {
                for r in 0..=s {
                    for k in 0..=degrees[j] {
                        tuples.push(IndexTuple { p, r, s, k });
                        p += 1;
                    }
                }
            }
            constraint_indices.push(tuples);
        }

        Ok(Self {
            bilinear_bases,
            free_var_matrix,
            primal_objective_c,
            dual_objective_b,
            objective_const,
            dimensions,
            degrees,
            blocks,
            constraint_indices,
        })
    }

    /// P, the number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.primal_objective_c.len()
    }

    /// N, the number of free dual variables.
    pub fn dual_dimension(&self) -> usize {
        self.dual_objective_b.len()
    }

    pub fn num_groups(&self) -> usize {
        self.dimensions.len()
    }

    /// Dimensions of the dense blocks of X and Y.
    pub fn psd_matrix_block_dims(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.bilinear_bases.len());
        for (j, group) in self.blocks.iter().enumerate() {
            for &b in group {
                dims.push(self.bilinear_bases[b].nrows() * self.dimensions[j]);
            }
        }
        dims
    }

    /// Dimensions of the blocks of the bilinear pairing caches.
    pub fn bilinear_pairing_block_dims(&self) -> Vec<usize> {
        let mut dims = Vec::with_capacity(self.bilinear_bases.len());
        for (j, group) in self.blocks.iter().enumerate() {
            for &b in group {
                dims.push(self.bilinear_bases[b].ncols() * self.dimensions[j]);
            }
        }
        dims
    }

    /// Flat constraint range of group j.
    pub fn group_range(&self, j: usize) -> std::ops::Range<usize> {
        let tuples = &self.constraint_indices[j];
        let first = tuples[0].p;
        first..first + tuples.len()
    }
}
