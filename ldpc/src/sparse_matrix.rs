use crate::{BitMatrix, BitVector, MatrixError};

/// Immutable compressed-row snapshot of a [`BitMatrix`].
///
/// Row `i` owns the column indices `col_indices[row_offsets[i]..row_offsets[i + 1]]`,
/// stored in increasing order. Products cost one XOR per stored edge, which is what
/// keeps per-block encoding fast for low-density matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBitMatrix {
    n_rows: usize,
    n_cols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
}

impl SparseBitMatrix {
    /// Scan the rows of `dense` once and record its set bits.
    pub fn from_dense(dense: &BitMatrix) -> Self {
        let mut row_offsets = Vec::with_capacity(dense.rows() + 1);
        let mut col_indices = Vec::new();

        row_offsets.push(0);
        for row in 0..dense.rows() {
            col_indices.extend(dense.ones_in_row(row));
            row_offsets.push(col_indices.len());
        }

        Self {
            n_rows: dense.rows(),
            n_cols: dense.cols(),
            row_offsets,
            col_indices,
        }
    }

    pub fn rows(&self) -> usize {
        self.n_rows
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (nonzero) entries
    pub fn edges(&self) -> usize {
        self.col_indices.len()
    }

    /// Column indices of row `row`, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[usize]> {
        if row >= self.n_rows {
            return None;
        }
        Some(&self.col_indices[self.row_offsets[row]..self.row_offsets[row + 1]])
    }

    /// Matrix-vector product `M * v`.
    pub fn mul_vec(&self, v: &BitVector) -> Result<BitVector, MatrixError> {
        if self.n_cols != v.len() {
            return Err(MatrixError::DimensionMismatch {
                op: "sparse mul_vec",
                left: (self.n_rows, self.n_cols),
                right: (v.len(), 1),
            });
        }
        Ok(BitVector::from(self.product(v.as_slice())))
    }

    /// Vector-matrix product `v * M`.
    ///
    /// Both orientations contract the vector against the stored rows, so this is the
    /// same product as [`SparseBitMatrix::mul_vec`] and has the same length requirement.
    pub fn vec_mul(&self, v: &BitVector) -> Result<BitVector, MatrixError> {
        self.mul_vec(v)
    }

    /// `M * x` without length validation; the caller guarantees `x.len() == self.cols()`.
    pub(crate) fn product(&self, x: &[bool]) -> Vec<bool> {
        debug_assert_eq!(x.len(), self.n_cols);
        self.row_offsets
            .windows(2)
            .map(|span| {
                self.col_indices[span[0]..span[1]]
                    .iter()
                    .fold(false, |acc, &j| acc ^ x[j])
            })
            .collect()
    }

    /// `out ^= M * x` without length validation.
    pub(crate) fn xor_product_into(&self, x: &[bool], out: &mut [bool]) {
        debug_assert_eq!(x.len(), self.n_cols);
        debug_assert_eq!(out.len(), self.n_rows);
        for (dst, span) in out.iter_mut().zip(self.row_offsets.windows(2)) {
            for &j in &self.col_indices[span[0]..span[1]] {
                *dst ^= x[j];
            }
        }
    }
}
