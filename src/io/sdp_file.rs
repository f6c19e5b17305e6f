use crate::algebra::*;
use crate::io::reader::LineReader;
use crate::io::ReadError;
use crate::solver::{Sdp, SdpError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type returned by [`read_sdp`].
#[derive(Error, Debug)]
pub enum SdpReadError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("{}: {detail}", .path.display())]
    Inconsistent { path: PathBuf, detail: String },
    #[error("invalid problem data: {0}")]
    Invalid(#[from] SdpError),
}

/// Read an SDP from its on-disk directory layout.
///
/// The directory holds `objectives` (the objective constant followed by
/// the dual objective vector), then per group j the files
/// `primal_objective_c.<j>`, `free_var_matrix.<j>` and
/// `bilinear_bases.<j>`, and `blocks.<i>` files enumerating the groups.
/// All numbers are one-per-line decimal text with round-trip precision.
pub fn read_sdp<T: FloatT>(dir: &Path) -> Result<Sdp<T>, SdpReadError> {
    // objectives: the constant, then all of b
    let mut reader = LineReader::open(&dir.join("objectives"))?;
    let objective_const: T = reader.next_scalar()?;
    let mut dual_objective_b: Vec<T> = Vec::new();
    while let Some(line) = reader.try_next_line()? {
        let value = T::parse_decimal(&line).ok_or_else(|| {
            SdpReadError::Inconsistent {
                path: reader.path().to_path_buf(),
                detail: format!("cannot parse `{}` as a number", line),
            }
        })?;
        dual_objective_b.push(value);
    }

    // blocks.<i>: group dimension/degree/basis-index records
    let mut dimensions = Vec::new();
    let mut degrees = Vec::new();
    let mut blocks = Vec::new();
    let mut i = 0;
    loop {
        let path = dir.join(format!("blocks.{}", i));
        if !path.exists() {
            break;
        }
        let mut reader = LineReader::open(&path)?;
        let num_groups = reader.next_usize()?;
        for _ in 0..num_groups {
            dimensions.push(reader.next_usize()?);
            degrees.push(reader.next_usize()?);
            let num_bases = reader.next_usize()?;
            let mut indices = Vec::with_capacity(num_bases);
            for _ in 0..num_bases {
                indices.push(reader.next_usize()?);
            }
            blocks.push(indices);
        }
        i += 1;
    }
    if dimensions.is_empty() {
        return Err(SdpReadError::Inconsistent {
            path: dir.join("blocks.0"),
            detail: "no constraint groups found".into(),
        });
    }

    // per-group payloads
    let n = dual_objective_b.len();
    let mut primal_objective_c: Vec<T> = Vec::new();
    let mut free_var_rows: Vec<T> = Vec::new();
    let mut bilinear_bases: Vec<Matrix<T>> = Vec::new();

    for j in 0..dimensions.len() {
        let mut reader = LineReader::open(&dir.join(format!("primal_objective_c.{}", j)))?;
        let len = reader.next_usize()?;
        for _ in 0..len {
            primal_objective_c.push(reader.next_scalar()?);
        }

        let path = dir.join(format!("free_var_matrix.{}", j));
        let mut reader = LineReader::open(&path)?;
        let (rows, cols) = reader.next_usize_pair()?;
        if rows != len || cols != n {
            return Err(SdpReadError::Inconsistent {
                path,
                detail: format!(
                    "header {}x{} does not match {} constraints and {} dual variables",
                    rows, cols, len, n
                ),
            });
        }
        for _ in 0..rows * cols {
            free_var_rows.push(reader.next_scalar()?);
        }

        let mut reader = LineReader::open(&dir.join(format!("bilinear_bases.{}", j)))?;
        let num_matrices = reader.next_usize()?;
        for _ in 0..num_matrices {
            let (rows, cols) = reader.next_usize_pair()?;
            let mut entries = Vec::with_capacity(rows * cols);
            for _ in 0..rows * cols {
                entries.push(reader.next_scalar()?);
            }
            bilinear_bases.push(Matrix::new_from_rows((rows, cols), &entries));
        }
    }

    let num_constraints = primal_objective_c.len();
    let free_var_matrix = Matrix::new_from_rows((num_constraints, n), &free_var_rows);

    Ok(Sdp::new(
        bilinear_bases,
        free_var_matrix,
        primal_objective_c,
        dual_objective_b,
        objective_const,
        dimensions,
        degrees,
        blocks,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("bootsdp-tests")
            .join(format!("{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn write_tiny_sdp(dir: &Path) {
        write_file(dir, "objectives", "0\n1\n");
        write_file(dir, "blocks.0", "1\n1\n0\n1\n0\n");
        write_file(dir, "primal_objective_c.0", "1\n1\n");
        write_file(dir, "free_var_matrix.0", "1 1\n1\n");
        write_file(dir, "bilinear_bases.0", "1\n1 1\n1\n");
    }

    #[test]
    fn test_read_tiny_sdp() {
        let dir = scratch_dir("read-tiny");
        write_tiny_sdp(&dir);

        let sdp: Sdp<f64> = read_sdp(&dir).unwrap();
        assert_eq!(sdp.num_constraints(), 1);
        assert_eq!(sdp.dual_dimension(), 1);
        assert_eq!(sdp.dimensions, vec![1]);
        assert_eq!(sdp.degrees, vec![0]);
        assert_eq!(sdp.blocks, vec![vec![0]]);
        assert_eq!(sdp.primal_objective_c, vec![1.0]);
        assert_eq!(sdp.dual_objective_b, vec![1.0]);
        assert_eq!(sdp.free_var_matrix[(0, 0)], 1.0);
    }

    #[test]
    fn test_truncated_file_is_fatal() {
        let dir = scratch_dir("read-truncated");
        write_tiny_sdp(&dir);
        write_file(&dir, "free_var_matrix.0", "1 1\n");

        let result: Result<Sdp<f64>, _> = read_sdp(&dir);
        assert!(matches!(
            result,
            Err(SdpReadError::Read(ReadError::Truncated { .. }))
        ));
    }

    #[test]
    fn test_inconsistent_header_is_fatal() {
        let dir = scratch_dir("read-inconsistent");
        write_tiny_sdp(&dir);
        write_file(&dir, "free_var_matrix.0", "2 1\n1\n1\n");

        let result: Result<Sdp<f64>, _> = read_sdp(&dir);
        assert!(matches!(result, Err(SdpReadError::Inconsistent { .. })));
    }

    #[test]
    fn test_garbage_number_is_fatal() {
        let dir = scratch_dir("read-garbage");
        write_tiny_sdp(&dir);
        write_file(&dir, "primal_objective_c.0", "1\nnot-a-number\n");

        let result: Result<Sdp<f64>, _> = read_sdp(&dir);
        assert!(matches!(
            result,
            Err(SdpReadError::Read(ReadError::Parse { .. }))
        ));
    }
}
