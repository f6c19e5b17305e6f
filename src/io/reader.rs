use crate::algebra::FloatT;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type shared by the line-oriented readers underneath the SDP and
/// checkpoint loaders.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: unexpected end of file", .path.display())]
    Truncated { path: PathBuf },
    #[error("{}:{}: cannot parse `{}`", .path.display(), .line, .token)]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
}

// All on-disk numbers are ASCII, one value (or one short header) per line.
pub(crate) struct LineReader {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line: usize,
}

impl LineReader {
    pub fn open(path: &Path) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.to_path_buf(),
            line: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Next non-blank line, or None at end of file.
    pub fn try_next_line(&mut self) -> Result<Option<String>, ReadError> {
        loop {
            match self.lines.next() {
                None => return Ok(None),
                Some(Err(source)) => {
                    return Err(ReadError::Io {
                        path: self.path.clone(),
                        source,
                    })
                }
                Some(Ok(line)) => {
                    self.line += 1;
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Ok(Some(trimmed.to_string()));
                    }
                }
            }
        }
    }

    pub fn next_line(&mut self) -> Result<String, ReadError> {
        self.try_next_line()?.ok_or_else(|| ReadError::Truncated {
            path: self.path.clone(),
        })
    }

    pub fn next_scalar<T: FloatT>(&mut self) -> Result<T, ReadError> {
        let line = self.next_line()?;
        T::parse_decimal(&line).ok_or_else(|| ReadError::Parse {
            path: self.path.clone(),
            line: self.line,
            token: line,
        })
    }

    pub fn next_usize(&mut self) -> Result<usize, ReadError> {
        let line = self.next_line()?;
        line.parse().map_err(|_| ReadError::Parse {
            path: self.path.clone(),
            line: self.line,
            token: line,
        })
    }

    /// A "ROWS COLS"-style header: whitespace-separated integers on one
    /// line.
    pub fn next_usize_pair(&mut self) -> Result<(usize, usize), ReadError> {
        let line = self.next_line()?;
        let mut it = line.split_whitespace();
        let parse = |tok: Option<&str>, this: &Self, line: &str| {
            tok.and_then(|t| t.parse().ok())
                .ok_or_else(|| ReadError::Parse {
                    path: this.path.clone(),
                    line: this.line,
                    token: line.to_string(),
                })
        };
        let rows = parse(it.next(), self, &line)?;
        let cols = parse(it.next(), self, &line)?;
        Ok((rows, cols))
    }
}
