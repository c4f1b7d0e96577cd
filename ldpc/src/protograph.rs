//! Protograph (base graph) description and lifting into a parity-check matrix.
//!
//! Each protograph cell is either empty or a circulant shift `s`. Lifting by a factor
//! `z` replaces the cell with a `z`x`z` identity cyclically shifted by `s mod z`
//! columns, and empty cells with the `z`x`z` zero block.

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{BitMatrix, MatrixError};

/// Cell value denoting "no edge" in the integer form of a protograph.
pub const NO_EDGE: i64 = -1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Protograph has no cells")]
    Empty,
    #[error("Protograph row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid shift value: {0}")]
    InvalidShift(i64),
    #[error("Invalid protograph text: {0}")]
    Parse(String),
    #[error("Unsupported lifting parameters: {0}")]
    Unsupported(String),
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// A `p`x`q` grid of circulant shifts, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtoGraph {
    n_rows: usize,
    n_cols: usize,
    cells: Vec<Option<usize>>,
}

impl ProtoGraph {
    /// Build from rows of integers where [`NO_EDGE`] marks an empty cell.
    pub fn new<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self, GraphError> {
        let n_cols = rows.first().map_or(0, |row| row.as_ref().len());
        if rows.is_empty() || n_cols == 0 {
            return Err(GraphError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(GraphError::RaggedRows {
                    row: i,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            for &value in row {
                cells.push(match value {
                    NO_EDGE => None,
                    shift if shift >= 0 => Some(shift as usize),
                    shift => return Err(GraphError::InvalidShift(shift)),
                });
            }
        }

        Ok(Self {
            n_rows: rows.len(),
            n_cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.n_rows
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// Shift of cell `(i, j)`, `None` for an empty cell or an index past the grid.
    pub fn shift(&self, i: usize, j: usize) -> Option<usize> {
        if i >= self.n_rows || j >= self.n_cols {
            return None;
        }
        self.cells[i * self.n_cols + j]
    }

    pub fn max_shift(&self) -> Option<usize> {
        self.cells.iter().flatten().copied().max()
    }

    /// Smallest lifting factor covering an `m`x`n` parity-check matrix.
    ///
    /// `z = max(m / p, max(m, k) / (q / 2)) + 1` with `k = n - m`, which over-provisions
    /// both the row count and the information region left of the crop window.
    pub fn lifting_factor(&self, m: usize, n: usize) -> Result<usize, GraphError> {
        if m > n {
            return Err(GraphError::Unsupported(format!(
                "{m} checks exceed codeword length {n}"
            )));
        }
        let half = self.n_cols / 2;
        if half == 0 {
            return Err(GraphError::Unsupported(format!(
                "protograph with {} column(s) has no parity half",
                self.n_cols
            )));
        }

        let k = n - m;
        Ok((m / self.n_rows).max(m.max(k) / half) + 1)
    }

    /// Expand every cell into a `z`x`z` circulant block.
    pub fn lift(&self, z: usize) -> Result<BitMatrix, GraphError> {
        let mut lifted = BitMatrix::zeros(self.n_rows * z, self.n_cols * z);

        for i in 0..self.n_rows {
            for j in 0..self.n_cols {
                let Some(shift) = self.shift(i, j) else {
                    continue;
                };
                for t in 0..z {
                    lifted.set(i * z + t, j * z + (t + shift) % z, true)?;
                }
            }
        }

        Ok(lifted)
    }

    /// Lift the protograph and crop the exact `m`x`n` parity-check matrix.
    ///
    /// The crop window starts at row 0 and column `p * z / 2 - k`.
    pub fn derive_check_matrix(&self, m: usize, n: usize) -> Result<BitMatrix, GraphError> {
        let z = self.lifting_factor(m, n)?;
        let k = n - m;

        let col_offset = (self.n_rows * z / 2).checked_sub(k).ok_or_else(|| {
            GraphError::Unsupported(format!(
                "crop offset {}-{k} is negative for lifting factor {z}",
                self.n_rows * z / 2
            ))
        })?;
        if col_offset + n > self.n_cols * z {
            return Err(GraphError::Unsupported(format!(
                "crop window {col_offset}..{} exceeds {} lifted columns",
                col_offset + n,
                self.n_cols * z
            )));
        }

        if let Some(max_shift) = self.max_shift().filter(|&shift| shift >= z) {
            warn!(max_shift, z, "protograph shift exceeds lifting factor, shifts wrap");
        }

        let lifted = self.lift(z)?;
        let check = lifted.submatrix(0, col_offset, m, n)?;

        debug!(
            m,
            n,
            z,
            col_offset,
            ones = check.count_ones(),
            "derived parity-check matrix"
        );

        Ok(check)
    }
}

/// Rows separated by `;` or newlines, cells by whitespace or commas.
impl FromStr for ProtoGraph {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .split(|c: char| c == ';' || c == '\n')
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .map(|row| {
                row.split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|cell| !cell.is_empty())
                    .map(|cell| {
                        cell.parse::<i64>()
                            .map_err(|_| GraphError::Parse(cell.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(&rows)
    }
}
