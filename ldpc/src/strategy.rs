//! Factor sets for the parity-check-matrix driven encoders.
//!
//! With `k = n - m`, codewords are laid out as `[s | parity]`, where `s` is the
//! information block and the parity bits fill the last `m` positions. Every strategy
//! derives its factors once from H, then computes parity with sparse products only.

use tracing::{debug, warn};

use crate::{
    ldpc::{EncodingStrategy, ParityInverse},
    mod2convert::dense_to_sparse,
    BitMatrix, LdpcError, MatrixError, SparseBitMatrix,
};

/// Gap of the check matrix: the offset, from the first parity column, of the last set
/// bit in row 0 among the parity columns `k + 1..n`. Zero when there is none.
pub fn find_gap(check: &BitMatrix, m: usize, n: usize) -> Result<usize, MatrixError> {
    let k = n - m;
    for j in (k + 1..n).rev() {
        if check.get(0, j)? {
            return Ok(j - k);
        }
    }
    Ok(0)
}

/// Richardson-Urbanke encoding.
///
/// H is split as
///
/// ```text
///          k     g     m-g
///   m-g  [ A  |  B  |  T  ]
///   g    [ C  |  D  |  E  ]
/// ```
///
/// and the codeword is `[s | p1 | p2]` with
/// `p1 = φ⁻¹ (E T⁻¹ A + C) s`, `p2 = T⁻¹ (A s + B p1)` and `φ = E T⁻¹ B + D`.
#[derive(Debug, Clone)]
pub struct GeneralDecomposition {
    gap: usize,
    a: SparseBitMatrix,
    b: SparseBitMatrix,
    inverse_t: SparseBitMatrix,
    p1_factor: SparseBitMatrix,
}

impl GeneralDecomposition {
    pub fn gap(&self) -> usize {
        self.gap
    }
}

impl EncodingStrategy for GeneralDecomposition {
    const NAME: &'static str = "general";

    fn precompute(
        check: &BitMatrix,
        m: usize,
        n: usize,
        parity_inverse: ParityInverse,
    ) -> Result<Self, LdpcError> {
        let k = n - m;
        let g = find_gap(check, m, n)?;
        let upper = m - g;

        let a = check.submatrix(0, 0, upper, k)?;
        let b = check.submatrix(0, k, upper, g)?;
        let c = check.submatrix(upper, 0, g, k)?;
        let e = check.submatrix(upper, k + g, g, upper)?;

        let (t, d) = match parity_inverse {
            ParityInverse::AssumeIdentity => (BitMatrix::identity(upper), BitMatrix::identity(g)),
            ParityInverse::Derived => (
                check.submatrix(0, k + g, upper, upper)?,
                check.submatrix(upper, k, g, g)?,
            ),
        };

        let inverse_t = t.invert()?;
        let e_inverse_t = e.multiply(&inverse_t)?;
        let phi = e_inverse_t.multiply(&b)?.add(&d)?;

        let inverse_phi = match parity_inverse {
            ParityInverse::AssumeIdentity => {
                if !phi.is_identity() {
                    warn!(gap = g, "φ is not the identity; lower parity checks may not hold");
                }
                BitMatrix::identity(g)
            }
            ParityInverse::Derived => phi.invert()?,
        };

        let p1_factor = inverse_phi.multiply(&e_inverse_t.multiply(&a)?.add(&c)?)?;

        debug!(gap = g, ?parity_inverse, "general decomposition precomputed");

        Ok(Self {
            gap: g,
            a: dense_to_sparse(&a),
            b: dense_to_sparse(&b),
            inverse_t: dense_to_sparse(&inverse_t),
            p1_factor: dense_to_sparse(&p1_factor),
        })
    }

    fn parity_into(&self, input: &[bool], codeword: &mut Vec<bool>) {
        let p1 = self.p1_factor.product(input);

        let mut syndrome = self.a.product(input);
        self.b.xor_product_into(&p1, &mut syndrome);
        let p2 = self.inverse_t.product(&syndrome);

        codeword.extend_from_slice(&p1);
        codeword.extend_from_slice(&p2);
    }

    fn stored_edges(&self) -> usize {
        self.a.edges() + self.b.edges() + self.inverse_t.edges() + self.p1_factor.edges()
    }
}

/// Richardson-Urbanke encoding for check matrices shaped
///
/// ```text
///          k     g     m-g
///   g    [ C  |  P  |  0  ]
///   m-g  [ A  |  B  |  I  ]
/// ```
///
/// so that `p1 = P⁻¹ C s` and `p2 = A s + B p1`.
#[derive(Debug, Clone)]
pub struct SpecializedDecomposition {
    gap: usize,
    a: SparseBitMatrix,
    b: SparseBitMatrix,
    p1_factor: SparseBitMatrix,
}

impl SpecializedDecomposition {
    pub fn gap(&self) -> usize {
        self.gap
    }
}

impl EncodingStrategy for SpecializedDecomposition {
    const NAME: &'static str = "specialized";

    fn precompute(
        check: &BitMatrix,
        m: usize,
        n: usize,
        parity_inverse: ParityInverse,
    ) -> Result<Self, LdpcError> {
        let k = n - m;
        let g = find_gap(check, m, n)?;

        let c = check.submatrix(0, 0, g, k)?;
        let p = check.submatrix(0, k, g, g)?;
        let a = check.submatrix(g, 0, m - g, k)?;
        let b = check.submatrix(g, k, m - g, g)?;

        let inverse_p = match parity_inverse {
            ParityInverse::AssumeIdentity => {
                if !p.is_identity() {
                    warn!(gap = g, "P is not the identity; upper parity checks may not hold");
                }
                BitMatrix::identity(g)
            }
            ParityInverse::Derived => p.invert()?,
        };

        let p1_factor = inverse_p.multiply(&c)?;

        debug!(gap = g, ?parity_inverse, "specialized decomposition precomputed");

        Ok(Self {
            gap: g,
            a: dense_to_sparse(&a),
            b: dense_to_sparse(&b),
            p1_factor: dense_to_sparse(&p1_factor),
        })
    }

    fn parity_into(&self, input: &[bool], codeword: &mut Vec<bool>) {
        let p1 = self.p1_factor.product(input);

        let mut p2 = self.a.product(input);
        self.b.xor_product_into(&p1, &mut p2);

        codeword.extend_from_slice(&p1);
        codeword.extend_from_slice(&p2);
    }

    fn stored_edges(&self) -> usize {
        self.a.edges() + self.b.edges() + self.p1_factor.edges()
    }
}

/// Encoding for `H = [A | T]` with T lower triangular: `p = T⁻¹ A s`.
#[derive(Debug, Clone)]
pub struct Triangular {
    p_factor: SparseBitMatrix,
}

impl EncodingStrategy for Triangular {
    const NAME: &'static str = "triangular";

    fn precompute(
        check: &BitMatrix,
        m: usize,
        n: usize,
        parity_inverse: ParityInverse,
    ) -> Result<Self, LdpcError> {
        let k = n - m;
        let a = check.submatrix(0, 0, m, k)?;
        let t = check.submatrix(0, k, m, m)?;

        let inverse_t = match parity_inverse {
            ParityInverse::AssumeIdentity => {
                if !t.is_identity() {
                    warn!(m, "parity block is not the identity; parity checks may not hold");
                }
                BitMatrix::identity(m)
            }
            ParityInverse::Derived => t.invert()?,
        };

        let p_factor = inverse_t.multiply(&a)?;

        debug!(?parity_inverse, "triangular factors precomputed");

        Ok(Self {
            p_factor: dense_to_sparse(&p_factor),
        })
    }

    fn parity_into(&self, input: &[bool], codeword: &mut Vec<bool>) {
        codeword.extend(self.p_factor.product(input));
    }

    fn stored_edges(&self) -> usize {
        self.p_factor.edges()
    }
}
