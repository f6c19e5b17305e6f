#![allow(non_snake_case)]

use crate::algebra::*;
use crate::io::reader::LineReader;
use crate::io::ReadError;
use crate::solver::{SdpSolver, SolverInfo, TerminateReason};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for checkpoint and solution I/O.  Write failures are fatal
/// for the run; a partially written checkpoint is simply rewritten on the
/// next attempt and never resumed from.
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error("checkpoint was written at precision {found}, run is configured for {expected}")]
    PrecisionMismatch { found: u32, expected: u32 },
    #[error("{}: header does not match the problem shape", .path.display())]
    Shape { path: PathBuf },
}

// ---------------------------------
// writing
// ---------------------------------

fn write_file<F>(path: PathBuf, body: F) -> Result<(), CheckpointError>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let inner = || -> std::io::Result<()> {
        let mut w = BufWriter::new(File::create(&path)?);
        body(&mut w)?;
        w.flush()
    };
    inner().map_err(|source| CheckpointError::Write { path, source })
}

fn write_vector<T: FloatT>(w: &mut impl Write, v: &[T]) -> std::io::Result<()> {
    writeln!(w, "{}", v.len())?;
    for x in v {
        writeln!(w, "{}", x.to_decimal())?;
    }
    Ok(())
}

fn write_matrix<T: FloatT>(w: &mut impl Write, m: &Matrix<T>) -> std::io::Result<()> {
    writeln!(w, "{} {}", m.nrows(), m.ncols())?;
    for r in 0..m.nrows() {
        for c in 0..m.ncols() {
            writeln!(w, "{}", m[(r, c)].to_decimal())?;
        }
    }
    Ok(())
}

/// Save the iterate (x, X, y, Y) under `dir`, one file per block, with
/// full decimal precision.
pub fn save_checkpoint<T: FloatT>(
    solver: &SdpSolver<T>,
    dir: &Path,
) -> Result<(), CheckpointError> {
    fs::create_dir_all(dir).map_err(|source| CheckpointError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let sdp = solver.sdp();
    let num_groups = sdp.num_groups();
    let num_blocks = solver.X.blocks.len();

    write_file(dir.join("meta.ck"), |w| {
        writeln!(w, "{}", solver.settings.precision)?;
        writeln!(w, "{}", num_groups)?;
        writeln!(w, "{}", num_blocks)?;
        writeln!(w, "{}", sdp.dual_dimension())
    })?;

    for j in 0..num_groups {
        let range = sdp.group_range(j);
        write_file(dir.join(format!("x_{}.ck", j)), |w| {
            write_vector(w, &solver.x[range])
        })?;
    }
    write_file(dir.join("X_diag.ck"), |w| write_vector(w, &solver.X.diag))?;
    write_file(dir.join("y.ck"), |w| write_vector(w, &solver.Y.diag))?;

    for b in 0..num_blocks {
        write_file(dir.join(format!("X_matrix_{}.ck", b)), |w| {
            write_matrix(w, &solver.X.blocks[b])
        })?;
        write_file(dir.join(format!("Y_matrix_{}.ck", b)), |w| {
            write_matrix(w, &solver.Y.blocks[b])
        })?;
    }
    Ok(())
}

// ---------------------------------
// reading
// ---------------------------------

fn read_vector_into<T: FloatT>(path: &Path, out: &mut [T]) -> Result<(), CheckpointError> {
    let mut reader = LineReader::open(path)?;
    let len = reader.next_usize()?;
    if len != out.len() {
        return Err(CheckpointError::Shape {
            path: path.to_path_buf(),
        });
    }
    for x in out {
        *x = reader.next_scalar()?;
    }
    Ok(())
}

fn read_matrix_into<T: FloatT>(path: &Path, out: &mut Matrix<T>) -> Result<(), CheckpointError> {
    let mut reader = LineReader::open(path)?;
    let (rows, cols) = reader.next_usize_pair()?;
    if (rows, cols) != out.size() {
        return Err(CheckpointError::Shape {
            path: path.to_path_buf(),
        });
    }
    for r in 0..rows {
        for c in 0..cols {
            out[(r, c)] = reader.next_scalar()?;
        }
    }
    Ok(())
}

/// Restore the iterate from a checkpoint directory written by
/// [`save_checkpoint`].  The checkpoint must have been written at the
/// configured precision; anything else is a fatal load error.
pub fn load_checkpoint<T: FloatT>(
    solver: &mut SdpSolver<T>,
    dir: &Path,
) -> Result<(), CheckpointError> {
    let meta_path = dir.join("meta.ck");
    let mut reader = LineReader::open(&meta_path)?;
    let precision = reader.next_usize()? as u32;
    if precision != solver.settings.precision {
        return Err(CheckpointError::PrecisionMismatch {
            found: precision,
            expected: solver.settings.precision,
        });
    }
    let num_groups = reader.next_usize()?;
    let num_blocks = reader.next_usize()?;
    let diag_dim = reader.next_usize()?;
    if num_groups != solver.sdp.num_groups()
        || num_blocks != solver.X.blocks.len()
        || diag_dim != solver.sdp.dual_dimension()
    {
        return Err(CheckpointError::Shape { path: meta_path });
    }

    for j in 0..num_groups {
        let range = solver.sdp.group_range(j);
        read_vector_into(&dir.join(format!("x_{}.ck", j)), &mut solver.x[range])?;
    }
    read_vector_into(&dir.join("X_diag.ck"), &mut solver.X.diag)?;
    read_vector_into(&dir.join("y.ck"), &mut solver.Y.diag)?;

    for b in 0..num_blocks {
        read_matrix_into(
            &dir.join(format!("X_matrix_{}.ck", b)),
            &mut solver.X.blocks[b],
        )?;
        read_matrix_into(
            &dir.join(format!("Y_matrix_{}.ck", b)),
            &mut solver.Y.blocks[b],
        )?;
    }

    solver.info = SolverInfo::new();
    Ok(())
}

// ---------------------------------
// solution output
// ---------------------------------

/// Write `out.txt` (termination reason and final scalars) plus whichever
/// parts of the iterate the `write_solution` setting selects.
pub fn save_solution<T: FloatT>(
    solver: &SdpSolver<T>,
    reason: TerminateReason,
    dir: &Path,
) -> Result<(), CheckpointError> {
    fs::create_dir_all(dir).map_err(|source| CheckpointError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let info = &solver.info;
    write_file(dir.join("out.txt"), |w| {
        writeln!(w, "terminateReason = \"{}\";", reason)?;
        writeln!(w, "primalObjective = {};", info.primal_objective.to_decimal())?;
        writeln!(w, "dualObjective   = {};", info.dual_objective.to_decimal())?;
        writeln!(w, "dualityGap      = {};", info.duality_gap.to_decimal())?;
        writeln!(w, "primalError     = {};", info.primal_error.to_decimal())?;
        writeln!(w, "dualError       = {};", info.dual_error.to_decimal())
    })?;

    let which = &solver.settings.write_solution;
    let sdp = solver.sdp();

    if which.x {
        for j in 0..sdp.num_groups() {
            let range = sdp.group_range(j);
            write_file(dir.join(format!("x_{}.txt", j)), |w| {
                write_vector(w, &solver.x[range])
            })?;
        }
    }
    if which.y {
        write_file(dir.join("y.txt"), |w| write_vector(w, &solver.Y.diag))?;
    }
    if which.X {
        write_file(dir.join("X_diag.txt"), |w| write_vector(w, &solver.X.diag))?;
        for (b, block) in solver.X.blocks.iter().enumerate() {
            write_file(dir.join(format!("X_matrix_{}.txt", b)), |w| {
                write_matrix(w, block)
            })?;
        }
    }
    if which.Y {
        for (b, block) in solver.Y.blocks.iter().enumerate() {
            write_file(dir.join(format!("Y_matrix_{}.txt", b)), |w| {
                write_matrix(w, block)
            })?;
        }
    }
    Ok(())
}
