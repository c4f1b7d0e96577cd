//! Systematic LDPC and repeat-accumulate block encoders over GF(2).
//!
//! A [`ProtoGraph`] of circulant shifts is lifted and cropped into an `m`x`n`
//! parity-check matrix H. An [`LdpcEncoder`] then precomputes sparse factors from H
//! with one of the [`EncodingStrategy`] implementations and maps `k = n - m` bit
//! blocks to `n` bit codewords. [`RepeatAccumulateEncoder`] needs no check matrix.
//!
//! ```no_run
//! use ldpc::{BlockEncoder, EncoderKind, ParityInverse, ProtoGraph};
//!
//! let graph: ProtoGraph = "19 1 12 0 0 -1 -1 -1; 67 4 18 12 23 0 -1 -1".parse()?;
//! let encoder = EncoderKind::Triangular.build(&graph, 4, 16, ParityInverse::AssumeIdentity)?;
//! let blocks = ldpc::generate_seeded_input_blocks(64, encoder.info_len(), 1);
//! let codewords = encoder.encode_all(&blocks)?;
//! # Ok::<(), ldpc::LdpcError>(())
//! ```

pub mod bit_vector;
pub mod dense_matrix;
pub mod input;
pub mod ldpc;
pub mod mod2convert;
pub mod protograph;
pub mod repeat_accumulate;
pub mod sparse_matrix;
pub mod strategy;

// Re-export main types
pub use bit_vector::BitVector;
pub use dense_matrix::{BitMatrix, MatrixError};
pub use input::{generate_input_blocks, generate_seeded_input_blocks};
pub use ldpc::{
    BlockEncoder, EncoderKind, EncodingStrategy, GeneralEncoder, LdpcEncoder, ParityInverse,
    SpecializedEncoder, TriangularEncoder,
};
pub use protograph::{GraphError, ProtoGraph, NO_EDGE};
pub use repeat_accumulate::RepeatAccumulateEncoder;
pub use sparse_matrix::SparseBitMatrix;
pub use strategy::{GeneralDecomposition, SpecializedDecomposition, Triangular};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LdpcError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Encoder is not configured")]
    NotConfigured,
    #[error("Matrix error: {0}")]
    Matrix(#[from] MatrixError),
    #[error("Protograph error: {0}")]
    Graph(#[from] GraphError),
}
