use std::fmt;

use rand::{seq::SliceRandom, Rng};

use crate::MatrixError;

/// Fixed-length vector over GF(2)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    bits: Vec<bool>,
}

impl BitVector {
    /// All-zero vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        Self {
            bits: bits.to_vec(),
        }
    }

    /// Ordered concatenation; the result length is the sum of the part lengths.
    pub fn concat(parts: &[&BitVector]) -> Self {
        let total = parts.iter().map(|part| part.len()).sum();
        let mut bits = Vec::with_capacity(total);
        for part in parts {
            bits.extend_from_slice(&part.bits);
        }
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, i: usize) -> Result<bool, MatrixError> {
        self.bits
            .get(i)
            .copied()
            .ok_or_else(|| self.out_of_range(i))
    }

    pub fn set(&mut self, i: usize, value: bool) -> Result<(), MatrixError> {
        let len = self.bits.len();
        match self.bits.get_mut(i) {
            Some(bit) => {
                *bit = value;
                Ok(())
            }
            None => Err(MatrixError::IndexOutOfRange {
                row: 0,
                col: i,
                rows: 1,
                cols: len,
            }),
        }
    }

    /// Elementwise addition over GF(2)
    pub fn xor(&self, other: &BitVector) -> Result<BitVector, MatrixError> {
        let mut result = self.clone();
        result.xor_assign(other)?;
        Ok(result)
    }

    pub fn xor_assign(&mut self, other: &BitVector) -> Result<(), MatrixError> {
        if self.len() != other.len() {
            return Err(MatrixError::DimensionMismatch {
                op: "xor",
                left: (1, self.len()),
                right: (1, other.len()),
            });
        }

        for (dst, src) in self.bits.iter_mut().zip(&other.bits) {
            *dst ^= *src;
        }
        Ok(())
    }

    /// Uniformly permute the bits in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.bits.shuffle(rng);
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    pub fn is_zero(&self) -> bool {
        !self.bits.iter().any(|&bit| bit)
    }

    fn out_of_range(&self, i: usize) -> MatrixError {
        MatrixError::IndexOutOfRange {
            row: 0,
            col: i,
            rows: 1,
            cols: self.bits.len(),
        }
    }
}

impl From<Vec<bool>> for BitVector {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl From<BitVector> for Vec<bool> {
    fn from(vector: BitVector) -> Self {
        vector.bits
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
