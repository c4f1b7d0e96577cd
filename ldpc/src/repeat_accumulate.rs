//! Repeat-accumulate encoding: repeat the information bits, interleave the result
//! with a random permutation, then run a running XOR over it.

use rand::Rng;
use tracing::warn;

use crate::{ldpc::BlockEncoder, BitVector, LdpcError, MatrixError};

/// Stateless repeat-accumulate encoder for `k`-bit blocks and `n`-bit codewords.
///
/// Unlike the check-matrix encoders it needs no setup and its output is not
/// systematic. Each call draws a fresh interleaver permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatAccumulateEncoder {
    k: usize,
    n: usize,
    repeat: usize,
}

impl RepeatAccumulateEncoder {
    pub fn new(k: usize, n: usize) -> Result<Self, LdpcError> {
        if k == 0 {
            return Err(LdpcError::InvalidParameter(
                "Repeat-accumulate needs at least one information bit".to_string(),
            ));
        }
        if n < k {
            return Err(LdpcError::InvalidParameter(format!(
                "Codeword length {n} is shorter than information length {k}"
            )));
        }

        let repeat = n / k;
        if n % k != 0 {
            warn!(k, n, repeat, "codeword length is not a multiple of k");
        }

        Ok(Self { k, n, repeat })
    }

    /// Repetition factor `q = n / k`
    pub fn repeat_factor(&self) -> usize {
        self.repeat
    }

    /// The `n`-bit buffer before interleaving.
    ///
    /// Bit `i` is written to positions `i..i + q`. The windows of neighbouring bits
    /// overlap and later bits win, so position `t` ends up holding bit `min(t, k - 1)`
    /// for `t < k + q - 1` and every later position stays zero.
    pub fn repeat(&self, input: &BitVector) -> Result<BitVector, LdpcError> {
        self.check_input(input)?;

        let mut buffer = vec![false; self.n];
        for (i, bit) in input.iter().enumerate() {
            buffer[i..i + self.repeat].fill(bit);
        }
        Ok(BitVector::from(buffer))
    }

    /// Encode with a caller-supplied source for the interleaver permutation.
    pub fn encode_with_rng<R: Rng + ?Sized>(
        &self,
        input: &BitVector,
        rng: &mut R,
    ) -> Result<BitVector, LdpcError> {
        let mut buffer = self.repeat(input)?;
        buffer.shuffle(rng);
        Ok(accumulate(&buffer))
    }

    fn check_input(&self, input: &BitVector) -> Result<(), LdpcError> {
        if input.len() != self.k {
            return Err(MatrixError::DimensionMismatch {
                op: "repeat-accumulate encode",
                left: (1, self.k),
                right: (1, input.len()),
            }
            .into());
        }
        Ok(())
    }
}

impl BlockEncoder for RepeatAccumulateEncoder {
    fn info_len(&self) -> usize {
        self.k
    }

    fn codeword_len(&self) -> usize {
        self.n
    }

    fn encode(&self, input: &BitVector) -> Result<BitVector, LdpcError> {
        self.encode_with_rng(input, &mut rand::thread_rng())
    }
}

/// Running XOR: `out[0] = s[0]`, `out[t] = out[t - 1] ^ s[t]`.
pub fn accumulate(s: &BitVector) -> BitVector {
    s.iter()
        .scan(false, |acc, bit| {
            *acc ^= bit;
            Some(*acc)
        })
        .collect()
}

/// Inverse of [`accumulate`]: `s[0] = out[0]`, `s[t] = out[t - 1] ^ out[t]`.
pub fn deaccumulate(out: &BitVector) -> BitVector {
    out.iter()
        .scan(false, |prev, bit| {
            let diff = *prev ^ bit;
            *prev = bit;
            Some(diff)
        })
        .collect()
}
