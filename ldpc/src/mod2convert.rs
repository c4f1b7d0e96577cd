use crate::{BitMatrix, SparseBitMatrix};

/// CONVERT A DENSE MATRIX TO COMPRESSED-ROW FORM
pub fn dense_to_sparse(dense: &BitMatrix) -> SparseBitMatrix {
    SparseBitMatrix::from_dense(dense)
}

/// CONVERT A COMPRESSED-ROW MATRIX BACK TO DENSE FORM
pub fn sparse_to_dense(sparse: &SparseBitMatrix) -> BitMatrix {
    let mut dense = BitMatrix::zeros(sparse.rows(), sparse.cols());

    for row in 0..sparse.rows() {
        for &col in sparse.row(row).unwrap_or_default() {
            dense.put(row, col, true);
        }
    }

    dense
}

/// Check if two matrices hold the same bits
pub fn matrices_equal(sparse: &SparseBitMatrix, dense: &BitMatrix) -> bool {
    if sparse.rows() != dense.rows() || sparse.cols() != dense.cols() {
        return false;
    }

    (0..sparse.rows()).all(|row| {
        sparse
            .row(row)
            .unwrap_or_default()
            .iter()
            .copied()
            .eq(dense.ones_in_row(row))
    })
}

impl From<&BitMatrix> for SparseBitMatrix {
    fn from(dense: &BitMatrix) -> Self {
        dense_to_sparse(dense)
    }
}

impl From<&SparseBitMatrix> for BitMatrix {
    fn from(sparse: &SparseBitMatrix) -> Self {
        sparse_to_dense(sparse)
    }
}

impl SparseBitMatrix {
    pub fn to_dense(&self) -> BitMatrix {
        sparse_to_dense(self)
    }
}
