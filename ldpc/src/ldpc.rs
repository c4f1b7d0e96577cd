use std::{fmt, str::FromStr};

use tracing::debug;

use crate::{
    strategy::{GeneralDecomposition, SpecializedDecomposition, Triangular},
    BitMatrix, BitVector, LdpcError, MatrixError, ProtoGraph, RepeatAccumulateEncoder,
    SparseBitMatrix,
};

/// Common surface of every encoder: a pure map from `k`-bit blocks to `n`-bit codewords.
pub trait BlockEncoder: Send + Sync {
    /// Number of information bits per block (k)
    fn info_len(&self) -> usize;

    /// Number of codeword bits per block (n)
    fn codeword_len(&self) -> usize;

    fn encode(&self, input: &BitVector) -> Result<BitVector, LdpcError>;

    /// Encode blocks in order, stopping at the first failure.
    fn encode_all(&self, blocks: &[BitVector]) -> Result<Vec<BitVector>, LdpcError> {
        blocks.iter().map(|block| self.encode(block)).collect()
    }
}

/// How the square blocks that a strategy must invert are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParityInverse {
    /// Take T, D and the inverses of φ, P and the triangular parity block as identity
    /// matrices. Encoding is exact only for check matrices that already have that shape.
    #[default]
    AssumeIdentity,
    /// Read T and D from the check matrix and invert T, φ, P or the triangular parity
    /// block over GF(2). Setup fails with [`MatrixError::Singular`] if a block has no
    /// inverse.
    Derived,
}

/// Precomputed sparse factors of one encoding algorithm.
pub trait EncodingStrategy: Sized + Send + Sync {
    const NAME: &'static str;

    /// Derive the factors from an `m`x`n` parity-check matrix.
    fn precompute(
        check: &BitMatrix,
        m: usize,
        n: usize,
        parity_inverse: ParityInverse,
    ) -> Result<Self, LdpcError>;

    /// Append the `n - k` parity bits of `input` to `codeword`.
    fn parity_into(&self, input: &[bool], codeword: &mut Vec<bool>);

    /// Total number of stored edges across all factors
    fn stored_edges(&self) -> usize;
}

/// Systematic LDPC encoder driven by a parity-check matrix.
///
/// Configure it with [`LdpcEncoder::set_base_graph`] followed by
/// [`LdpcEncoder::set_encoding_params`] (or directly with
/// [`LdpcEncoder::set_check_matrix`]). After that the encoder is immutable and
/// [`BlockEncoder::encode`] may be called concurrently from any number of threads.
#[derive(Debug, Clone)]
pub struct LdpcEncoder<S> {
    graph: Option<ProtoGraph>,
    parity_inverse: ParityInverse,
    check_matrix: Option<SparseBitMatrix>,
    factors: Option<S>,
    k: usize,
    n: usize,
}

pub type GeneralEncoder = LdpcEncoder<GeneralDecomposition>;
pub type SpecializedEncoder = LdpcEncoder<SpecializedDecomposition>;
pub type TriangularEncoder = LdpcEncoder<Triangular>;

impl<S> Default for LdpcEncoder<S> {
    fn default() -> Self {
        Self {
            graph: None,
            parity_inverse: ParityInverse::default(),
            check_matrix: None,
            factors: None,
            k: 0,
            n: 0,
        }
    }
}

impl<S: EncodingStrategy> LdpcEncoder<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parity_inverse(mut self, parity_inverse: ParityInverse) -> Self {
        self.parity_inverse = parity_inverse;
        self
    }

    pub fn parity_inverse(&self) -> ParityInverse {
        self.parity_inverse
    }

    /// Store the protograph. Any previous configuration is discarded.
    pub fn set_base_graph(&mut self, graph: ProtoGraph) {
        self.graph = Some(graph);
        self.reset();
    }

    pub fn base_graph(&self) -> Option<&ProtoGraph> {
        self.graph.as_ref()
    }

    /// Lift the stored protograph to an `(n - k)`x`n` check matrix and precompute
    /// the strategy's factors from it. On error the encoder is left unconfigured.
    pub fn set_encoding_params(&mut self, k: usize, n: usize) -> Result<(), LdpcError> {
        self.reset();
        if k > n {
            return Err(LdpcError::InvalidParameter(format!(
                "Information length {k} exceeds codeword length {n}"
            )));
        }

        let graph = self.graph.as_ref().ok_or(LdpcError::NotConfigured)?;
        let check = graph.derive_check_matrix(n - k, n)?;
        self.install(&check)
    }

    /// Configure from a prepared `m`x`n` parity-check matrix, so that `k = n - m`.
    /// On error the encoder is left unconfigured.
    pub fn set_check_matrix(&mut self, check: &BitMatrix) -> Result<(), LdpcError> {
        self.reset();
        if check.rows() > check.cols() {
            return Err(LdpcError::InvalidParameter(format!(
                "Check matrix has more rows ({}) than columns ({})",
                check.rows(),
                check.cols()
            )));
        }
        self.install(check)
    }

    fn install(&mut self, check: &BitMatrix) -> Result<(), LdpcError> {
        let (m, n) = check.shape();
        let factors = S::precompute(check, m, n, self.parity_inverse)?;
        debug!(
            strategy = S::NAME,
            k = n - m,
            n,
            edges = factors.stored_edges(),
            "encoder configured"
        );

        self.check_matrix = Some(SparseBitMatrix::from_dense(check));
        self.factors = Some(factors);
        self.k = n - m;
        self.n = n;
        Ok(())
    }

    fn reset(&mut self) {
        self.check_matrix = None;
        self.factors = None;
        self.k = 0;
        self.n = 0;
    }

    pub fn is_configured(&self) -> bool {
        self.factors.is_some()
    }

    /// Sparse snapshot of the parity-check matrix used at setup
    pub fn check_matrix(&self) -> Option<&SparseBitMatrix> {
        self.check_matrix.as_ref()
    }

    pub fn factors(&self) -> Option<&S> {
        self.factors.as_ref()
    }

    /// `H * codeword`; all-zero exactly when every parity check holds.
    pub fn syndrome(&self, codeword: &BitVector) -> Result<BitVector, LdpcError> {
        let check = self.check_matrix.as_ref().ok_or(LdpcError::NotConfigured)?;
        Ok(check.mul_vec(codeword)?)
    }

    pub fn is_codeword(&self, codeword: &BitVector) -> Result<bool, LdpcError> {
        Ok(self.syndrome(codeword)?.is_zero())
    }
}

impl<S: EncodingStrategy> BlockEncoder for LdpcEncoder<S> {
    fn info_len(&self) -> usize {
        self.k
    }

    fn codeword_len(&self) -> usize {
        self.n
    }

    fn encode(&self, input: &BitVector) -> Result<BitVector, LdpcError> {
        let factors = self.factors.as_ref().ok_or(LdpcError::NotConfigured)?;
        if input.len() != self.k {
            return Err(MatrixError::DimensionMismatch {
                op: "encode",
                left: (1, self.k),
                right: (1, input.len()),
            }
            .into());
        }

        let mut codeword = Vec::with_capacity(self.n);
        codeword.extend_from_slice(input.as_slice());
        factors.parity_into(input.as_slice(), &mut codeword);
        debug_assert_eq!(codeword.len(), self.n);

        Ok(BitVector::from(codeword))
    }
}

/// The available encoding algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    General,
    Specialized,
    Triangular,
    RepeatAccumulate,
}

impl EncoderKind {
    pub const ALL: [EncoderKind; 4] = [
        EncoderKind::General,
        EncoderKind::Specialized,
        EncoderKind::Triangular,
        EncoderKind::RepeatAccumulate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EncoderKind::General => "general",
            EncoderKind::Specialized => "specialized",
            EncoderKind::Triangular => "triangular",
            EncoderKind::RepeatAccumulate => "repeat-accumulate",
        }
    }

    /// Build a configured encoder for `(k, n)`. The repeat-accumulate encoder ignores
    /// `graph` and `parity_inverse`.
    pub fn build(
        self,
        graph: &ProtoGraph,
        k: usize,
        n: usize,
        parity_inverse: ParityInverse,
    ) -> Result<Box<dyn BlockEncoder>, LdpcError> {
        Ok(match self {
            EncoderKind::General => {
                Box::new(configured::<GeneralDecomposition>(graph, k, n, parity_inverse)?)
            }
            EncoderKind::Specialized => Box::new(configured::<SpecializedDecomposition>(
                graph,
                k,
                n,
                parity_inverse,
            )?),
            EncoderKind::Triangular => {
                Box::new(configured::<Triangular>(graph, k, n, parity_inverse)?)
            }
            EncoderKind::RepeatAccumulate => Box::new(RepeatAccumulateEncoder::new(k, n)?),
        })
    }
}

fn configured<S: EncodingStrategy>(
    graph: &ProtoGraph,
    k: usize,
    n: usize,
    parity_inverse: ParityInverse,
) -> Result<LdpcEncoder<S>, LdpcError> {
    let mut encoder = LdpcEncoder::<S>::new().with_parity_inverse(parity_inverse);
    encoder.set_base_graph(graph.clone());
    encoder.set_encoding_params(k, n)?;
    Ok(encoder)
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncoderKind {
    type Err = LdpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "general" | "richardson" => Ok(EncoderKind::General),
            "specialized" | "richardson-special" => Ok(EncoderKind::Specialized),
            "triangular" | "adaptive" => Ok(EncoderKind::Triangular),
            "repeat-accumulate" | "ra" => Ok(EncoderKind::RepeatAccumulate),
            other => Err(LdpcError::InvalidParameter(format!(
                "Unknown encoder kind: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;

    /// Lifts (m = 2, n = 4) to H = [[0 1 1 0], [1 0 0 1]], whose parity half is the
    /// identity, so every strategy is exact on it.
    fn identity_parity_graph() -> ProtoGraph {
        ProtoGraph::new(&[[1i64, 0, -1, -1], [-1, -1, -1, -1]]).unwrap()
    }

    fn all_inputs(k: usize) -> impl Iterator<Item = BitVector> {
        (0..1usize << k).map(move |word| (0..k).map(|i| (word >> i) & 1 == 1).collect())
    }

    #[test]
    fn test_encode_before_configuration() {
        let mut encoder = GeneralEncoder::new();
        assert!(!encoder.is_configured());
        assert!(matches!(
            encoder.encode(&BitVector::zeros(2)),
            Err(LdpcError::NotConfigured)
        ));
        assert!(matches!(
            encoder.set_encoding_params(2, 4),
            Err(LdpcError::NotConfigured)
        ));
        assert!(matches!(
            encoder.syndrome(&BitVector::zeros(4)),
            Err(LdpcError::NotConfigured)
        ));
    }

    #[test]
    fn test_lifecycle() {
        let mut encoder = TriangularEncoder::new();
        encoder.set_base_graph(identity_parity_graph());
        encoder.set_encoding_params(2, 4).unwrap();

        assert!(encoder.is_configured());
        assert_eq!(encoder.info_len(), 2);
        assert_eq!(encoder.codeword_len(), 4);
        assert_eq!(encoder.check_matrix().unwrap().to_dense().to_string(), "0110\n1001\n");

        // A new base graph invalidates the factors
        encoder.set_base_graph(identity_parity_graph());
        assert!(!encoder.is_configured());
    }

    #[test]
    fn test_rejects_invalid_params_and_input_length() {
        let mut encoder = SpecializedEncoder::new();
        encoder.set_base_graph(identity_parity_graph());
        assert!(matches!(
            encoder.set_encoding_params(5, 4),
            Err(LdpcError::InvalidParameter(_))
        ));

        encoder.set_encoding_params(2, 4).unwrap();
        assert!(matches!(
            encoder.encode(&BitVector::zeros(3)),
            Err(LdpcError::Matrix(MatrixError::DimensionMismatch { op: "encode", .. }))
        ));

        assert!(matches!(
            encoder.set_check_matrix(&BitMatrix::zeros(3, 2)),
            Err(LdpcError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_failed_reconfiguration_clears_previous_setup() {
        let mut encoder = GeneralEncoder::new();
        encoder.set_base_graph(identity_parity_graph());

        encoder.set_encoding_params(2, 4).unwrap();
        assert!(encoder.set_encoding_params(5, 4).is_err());
        assert!(!encoder.is_configured());
        assert_eq!((encoder.info_len(), encoder.codeword_len()), (0, 0));
        assert!(encoder.check_matrix().is_none());
        assert!(matches!(
            encoder.encode(&BitVector::zeros(2)),
            Err(LdpcError::NotConfigured)
        ));

        // Lifting failure: k = n leaves a negative crop offset
        encoder.set_encoding_params(2, 4).unwrap();
        assert!(matches!(
            encoder.set_encoding_params(4, 4),
            Err(LdpcError::Graph(GraphError::Unsupported(_)))
        ));
        assert!(!encoder.is_configured());

        encoder.set_encoding_params(2, 4).unwrap();
        assert!(encoder.set_check_matrix(&BitMatrix::zeros(3, 2)).is_err());
        assert!(!encoder.is_configured());
    }

    #[test]
    fn test_every_strategy_satisfies_identity_parity_graph() {
        for mode in [ParityInverse::AssumeIdentity, ParityInverse::Derived] {
            for kind in [
                EncoderKind::General,
                EncoderKind::Specialized,
                EncoderKind::Triangular,
            ] {
                let graph = identity_parity_graph();
                let encoder = kind.build(&graph, 2, 4, mode).unwrap();
                let check = graph.derive_check_matrix(2, 4).unwrap();

                for input in all_inputs(2) {
                    let codeword = encoder.encode(&input).unwrap();
                    assert_eq!(&codeword.as_slice()[..2], input.as_slice());
                    assert!(
                        check.mul_vec(&codeword).unwrap().is_zero(),
                        "{kind} ({mode:?}) produced {codeword} for {input}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_parity_bits_degenerates_to_identity() {
        let check = BitMatrix::zeros(0, 5);
        let input = BitVector::from_bits(&[true, false, true, true, false]);

        let mut general = GeneralEncoder::new();
        general.set_check_matrix(&check).unwrap();
        assert_eq!(general.encode(&input).unwrap(), input);

        let mut specialized = SpecializedEncoder::new();
        specialized.set_check_matrix(&check).unwrap();
        assert_eq!(specialized.encode(&input).unwrap(), input);

        let mut triangular = TriangularEncoder::new().with_parity_inverse(ParityInverse::Derived);
        triangular.set_check_matrix(&check).unwrap();
        assert_eq!(triangular.encode(&input).unwrap(), input);
        assert!(triangular.is_codeword(&input).unwrap());
    }

    #[test]
    fn test_encoder_kind_parsing() {
        for kind in EncoderKind::ALL {
            assert_eq!(kind.name().parse::<EncoderKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!("RA".parse::<EncoderKind>().unwrap(), EncoderKind::RepeatAccumulate);
        assert_eq!("adaptive".parse::<EncoderKind>().unwrap(), EncoderKind::Triangular);
        assert!("turbo".parse::<EncoderKind>().is_err());
    }

    #[test]
    fn test_encode_all() {
        let encoder = EncoderKind::Triangular
            .build(&identity_parity_graph(), 2, 4, ParityInverse::AssumeIdentity)
            .unwrap();
        let blocks: Vec<BitVector> = all_inputs(2).collect();

        let codewords = encoder.encode_all(&blocks).unwrap();
        assert_eq!(codewords.len(), 4);
        for (block, codeword) in blocks.iter().zip(&codewords) {
            assert_eq!(&codeword.as_slice()[..2], block.as_slice());
        }

        assert!(encoder.encode_all(&[BitVector::zeros(3)]).is_err());
    }
}
