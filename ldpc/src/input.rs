//! Random information blocks for driving the encoders.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::BitVector;

/// Split `total_bits` uniformly random bits into `block_len`-bit blocks.
///
/// Only whole blocks are produced: the trailing `total_bits % block_len` bits are
/// dropped. A zero `block_len` yields no blocks.
pub fn generate_input_blocks<R: Rng + ?Sized>(
    total_bits: usize,
    block_len: usize,
    rng: &mut R,
) -> Vec<BitVector> {
    let count = total_bits.checked_div(block_len).unwrap_or(0);
    let dropped = total_bits - count * block_len;
    debug!(count, block_len, dropped, "generating input blocks");

    (0..count)
        .map(|_| (0..block_len).map(|_| rng.gen::<bool>()).collect())
        .collect()
}

/// [`generate_input_blocks`] over a ChaCha8 stream seeded with `seed`.
pub fn generate_seeded_input_blocks(
    total_bits: usize,
    block_len: usize,
    seed: u64,
) -> Vec<BitVector> {
    generate_input_blocks(total_bits, block_len, &mut ChaCha8Rng::seed_from_u64(seed))
}
