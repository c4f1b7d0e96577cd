use std::fmt;

use thiserror::Error;

use crate::BitVector;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("Index ({row}, {col}) out of range for {rows}x{cols} matrix")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Matrix is singular")]
    Singular,
}

const WORD_BITS: usize = 64;

/// Dense matrix over GF(2)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    n_rows: usize,
    n_cols: usize,
    /// Bits packed into u64s, each row stored in consecutive words.
    /// Padding bits past `n_cols` are always zero.
    data: Vec<u64>,
    words_per_row: usize,
}

impl BitMatrix {
    /// All-zero matrix. Zero-sized dimensions are allowed.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        let words_per_row = n_cols.div_ceil(WORD_BITS);
        Self {
            n_rows,
            n_cols,
            data: vec![0u64; n_rows * words_per_row],
            words_per_row,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut result = Self::zeros(n, n);
        for i in 0..n {
            result.put(i, i, true);
        }
        result
    }

    /// Build a matrix from equal-length row vectors.
    pub fn from_rows(rows: &[BitVector]) -> Result<Self, MatrixError> {
        let n_cols = rows.first().map_or(0, BitVector::len);
        let mut result = Self::zeros(rows.len(), n_cols);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(MatrixError::DimensionMismatch {
                    op: "from_rows",
                    left: (1, n_cols),
                    right: (1, row.len()),
                });
            }
            for (j, bit) in row.iter().enumerate() {
                if bit {
                    result.put(i, j, true);
                }
            }
        }

        Ok(result)
    }

    pub fn rows(&self) -> usize {
        self.n_rows
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, MatrixError> {
        self.check_index(row, col)?;
        Ok(self.bit(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        self.put(row, col, value);
        Ok(())
    }

    pub fn flip(&mut self, row: usize, col: usize) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        let (word, mask) = self.locate(row, col);
        self.data[word] ^= mask;
        Ok(())
    }

    /// Column indices of the set bits in `row`, in increasing order.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.rows()`.
    pub fn ones_in_row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        let start = row * self.words_per_row;
        self.data[start..start + self.words_per_row]
            .iter()
            .enumerate()
            .flat_map(|(w, &word)| {
                let mut word = word;
                std::iter::from_fn(move || {
                    if word == 0 {
                        return None;
                    }
                    let bit = word.trailing_zeros() as usize;
                    word &= word - 1;
                    Some(w * WORD_BITS + bit)
                })
            })
    }

    pub fn row(&self, row: usize) -> Result<BitVector, MatrixError> {
        if row >= self.n_rows {
            return Err(MatrixError::IndexOutOfRange {
                row,
                col: 0,
                rows: self.n_rows,
                cols: self.n_cols,
            });
        }
        Ok((0..self.n_cols).map(|col| self.bit(row, col)).collect())
    }

    /// Copy of the `m`x`n` block whose top-left corner is `(row, col)`.
    pub fn submatrix(
        &self,
        row: usize,
        col: usize,
        m: usize,
        n: usize,
    ) -> Result<BitMatrix, MatrixError> {
        if row > self.n_rows
            || m > self.n_rows - row
            || col > self.n_cols
            || n > self.n_cols - col
        {
            return Err(MatrixError::IndexOutOfRange {
                row: row.saturating_add(m),
                col: col.saturating_add(n),
                rows: self.n_rows,
                cols: self.n_cols,
            });
        }

        let mut result = Self::zeros(m, n);
        for i in 0..m {
            for j in self
                .ones_in_row(row + i)
                .skip_while(|&j| j < col)
                .take_while(|&j| j < col + n)
            {
                result.put(i, j - col, true);
            }
        }
        Ok(result)
    }

    pub fn transpose(&self) -> BitMatrix {
        let mut result = Self::zeros(self.n_cols, self.n_rows);
        for i in 0..self.n_rows {
            for j in self.ones_in_row(i) {
                result.put(j, i, true);
            }
        }
        result
    }

    /// Elementwise XOR of two matrices of identical shape
    pub fn add(&self, other: &BitMatrix) -> Result<BitMatrix, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                op: "add",
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut result = self.clone();
        for (dst, src) in result.data.iter_mut().zip(&other.data) {
            *dst ^= *src;
        }
        Ok(result)
    }

    /// Matrix product over GF(2)
    pub fn multiply(&self, other: &BitMatrix) -> Result<BitMatrix, MatrixError> {
        if self.n_cols != other.n_rows {
            return Err(MatrixError::DimensionMismatch {
                op: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut result = Self::zeros(self.n_rows, other.n_cols);

        // Row i of the result is the XOR of the rows of `other` selected by row i of `self`.
        for i in 0..self.n_rows {
            let dst = i * result.words_per_row;
            for k in self.ones_in_row(i) {
                let src = k * other.words_per_row;
                for w in 0..other.words_per_row {
                    result.data[dst + w] ^= other.data[src + w];
                }
            }
        }

        Ok(result)
    }

    /// Matrix-vector product over GF(2), the vector taken as a column
    pub fn mul_vec(&self, v: &BitVector) -> Result<BitVector, MatrixError> {
        if self.n_cols != v.len() {
            return Err(MatrixError::DimensionMismatch {
                op: "mul_vec",
                left: self.shape(),
                right: (v.len(), 1),
            });
        }

        let bits = v.as_slice();
        Ok((0..self.n_rows)
            .map(|i| self.ones_in_row(i).fold(false, |acc, j| acc ^ bits[j]))
            .collect())
    }

    /// Gauss-Jordan inversion over GF(2).
    ///
    /// For each column the pivot is the nearest row at or below the diagonal with a set
    /// bit in that column. Fails with [`MatrixError::Singular`] when no such row exists.
    pub fn invert(&self) -> Result<BitMatrix, MatrixError> {
        if self.n_rows != self.n_cols {
            return Err(MatrixError::DimensionMismatch {
                op: "invert",
                left: self.shape(),
                right: (self.n_cols, self.n_rows),
            });
        }

        let n = self.n_rows;
        let mut work = self.clone();
        let mut inverse = Self::identity(n);

        for i in 0..n {
            let pivot_row = (i..n)
                .find(|&j| work.bit(j, i))
                .ok_or(MatrixError::Singular)?;

            if pivot_row != i {
                work.swap_rows(i, pivot_row);
                inverse.swap_rows(i, pivot_row);
            }

            // Eliminate column
            for j in 0..n {
                if j != i && work.bit(j, i) {
                    work.xor_row_into(j, i);
                    inverse.xor_row_into(j, i);
                }
            }
        }

        Ok(inverse)
    }

    pub fn count_ones(&self) -> usize {
        self.data.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&word| word == 0)
    }

    pub fn is_identity(&self) -> bool {
        self.n_rows == self.n_cols && *self == Self::identity(self.n_rows)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(MatrixError::IndexOutOfRange {
                row,
                col,
                rows: self.n_rows,
                cols: self.n_cols,
            });
        }
        Ok(())
    }

    fn locate(&self, row: usize, col: usize) -> (usize, u64) {
        (
            row * self.words_per_row + col / WORD_BITS,
            1u64 << (col % WORD_BITS),
        )
    }

    fn bit(&self, row: usize, col: usize) -> bool {
        let (word, mask) = self.locate(row, col);
        self.data[word] & mask != 0
    }

    pub(crate) fn put(&mut self, row: usize, col: usize, value: bool) {
        let (word, mask) = self.locate(row, col);
        if value {
            self.data[word] |= mask;
        } else {
            self.data[word] &= !mask;
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.words_per_row;
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(hi * w);
        head[lo * w..(lo + 1) * w].swap_with_slice(&mut tail[..w]);
    }

    /// `row[dst] ^= row[src]` for two distinct rows
    fn xor_row_into(&mut self, dst: usize, src: usize) {
        debug_assert_ne!(dst, src);
        let w = self.words_per_row;
        let (dst_words, src_words) = if dst < src {
            let (head, tail) = self.data.split_at_mut(src * w);
            (&mut head[dst * w..(dst + 1) * w], &tail[..w])
        } else {
            let (head, tail) = self.data.split_at_mut(dst * w);
            (&mut tail[..w], &head[src * w..(src + 1) * w])
        };
        for (d, s) in dst_words.iter_mut().zip(src_words) {
            *d ^= *s;
        }
    }
}

impl fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.n_rows {
            for j in 0..self.n_cols {
                f.write_str(if self.bit(i, j) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[u8]]) -> BitMatrix {
        let rows: Vec<BitVector> = rows
            .iter()
            .map(|row| row.iter().map(|&bit| bit == 1).collect())
            .collect();
        BitMatrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_dense_matrix_basic() {
        let mut matrix = BitMatrix::zeros(3, 4);

        matrix.set(1, 2, true).unwrap();
        assert!(matrix.get(1, 2).unwrap());
        assert!(!matrix.get(1, 1).unwrap());

        matrix.flip(1, 2).unwrap();
        assert!(!matrix.get(1, 2).unwrap());

        matrix.flip(0, 0).unwrap();
        assert!(matrix.get(0, 0).unwrap());

        assert!(matches!(
            matrix.get(3, 0),
            Err(MatrixError::IndexOutOfRange { row: 3, .. })
        ));
        assert!(matrix.set(0, 4, true).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![BitVector::zeros(3), BitVector::zeros(2)];
        assert!(matches!(
            BitMatrix::from_rows(&rows),
            Err(MatrixError::DimensionMismatch { op: "from_rows", .. })
        ));
    }

    #[test]
    fn test_dense_matrix_multiply() {
        let a = matrix(&[&[1, 0, 1], &[0, 1, 0]]);
        let b = matrix(&[&[0, 1], &[1, 0], &[0, 1]]);

        let result = a.multiply(&b).unwrap();

        assert_eq!(result, matrix(&[&[0, 0], &[1, 0]]));
        assert!(b.multiply(&b).is_err());
    }

    #[test]
    fn test_multiply_across_word_boundary() {
        let n = 130;
        let mut a = BitMatrix::zeros(2, n);
        a.set(0, 0, true).unwrap();
        a.set(0, 129, true).unwrap();
        a.set(1, 64, true).unwrap();

        let product = a.multiply(&BitMatrix::identity(n)).unwrap();
        assert_eq!(product, a);

        let ones: Vec<usize> = a.ones_in_row(0).collect();
        assert_eq!(ones, vec![0, 129]);
    }

    #[test]
    fn test_add() {
        let a = matrix(&[&[1, 1], &[0, 1]]);
        let b = matrix(&[&[1, 0], &[1, 1]]);

        assert_eq!(a.add(&b).unwrap(), matrix(&[&[0, 1], &[1, 0]]));
        assert!(a.add(&a).unwrap().is_zero());
        assert!(a.add(&BitMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_submatrix_and_transpose() {
        let m = matrix(&[&[1, 0, 1, 1], &[0, 1, 1, 0], &[1, 1, 0, 1]]);

        let block = m.submatrix(1, 1, 2, 3).unwrap();
        assert_eq!(block, matrix(&[&[1, 1, 0], &[1, 0, 1]]));

        let t = m.transpose();
        assert_eq!(t.shape(), (4, 3));
        assert_eq!(t.transpose(), m);
        assert!(t.get(3, 2).unwrap());

        assert!(matches!(
            m.submatrix(2, 2, 2, 2),
            Err(MatrixError::IndexOutOfRange { .. })
        ));
        assert_eq!(m.submatrix(3, 4, 0, 0).unwrap().shape(), (0, 0));
    }

    #[test]
    fn test_submatrix_rejects_huge_offsets() {
        let m = BitMatrix::zeros(2, 2);

        for (row, col, rows, cols) in [
            (usize::MAX, 0, 1, 1),
            (0, usize::MAX, 1, 1),
            (1, 0, usize::MAX, 1),
            (0, 1, 1, usize::MAX),
        ] {
            assert!(matches!(
                m.submatrix(row, col, rows, cols),
                Err(MatrixError::IndexOutOfRange { rows: 2, cols: 2, .. })
            ));
        }
    }

    #[test]
    fn test_invert() {
        // Identity with one extra row operation applied
        let mut m = BitMatrix::identity(4);
        m.set(2, 0, true).unwrap();

        let inverse = m.invert().unwrap();
        assert!(m.multiply(&inverse).unwrap().is_identity());
        assert!(inverse.multiply(&m).unwrap().is_identity());
    }

    #[test]
    fn test_invert_requires_pivot_swap() {
        let m = matrix(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 1]]);

        let inverse = m.invert().unwrap();
        assert!(m.multiply(&inverse).unwrap().is_identity());
    }

    #[test]
    fn test_invert_edge_cases() {
        assert!(matrix(&[&[1]]).invert().unwrap().is_identity());
        assert_eq!(matrix(&[&[0]]).invert(), Err(MatrixError::Singular));
        assert_eq!(
            matrix(&[&[1, 1], &[1, 1]]).invert(),
            Err(MatrixError::Singular)
        );
        assert!(matches!(
            BitMatrix::zeros(2, 3).invert(),
            Err(MatrixError::DimensionMismatch { op: "invert", .. })
        ));
        assert_eq!(BitMatrix::zeros(0, 0).invert().unwrap().shape(), (0, 0));
    }

    #[test]
    fn test_mul_vec() {
        let m = matrix(&[&[1, 0, 1], &[1, 1, 1]]);
        let v = BitVector::from_bits(&[true, true, false]);

        assert_eq!(
            m.mul_vec(&v).unwrap(),
            BitVector::from_bits(&[true, false])
        );
        assert!(m.mul_vec(&BitVector::zeros(2)).is_err());
    }

    #[test]
    fn test_display() {
        let m = matrix(&[&[1, 0], &[0, 1]]);
        assert_eq!(m.to_string(), "10\n01\n");
    }
}
