//! error types for the card protocol

use thiserror::Error;

/// low-level failures of the group layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// identity point where a proper group element is required
    #[error("identity point in {0}")]
    IdentityPoint(&'static str),

    /// zero scalar where a nonzero one is required (masking factor, secret key)
    #[error("zero scalar in {0}")]
    ZeroScalar(&'static str),

    /// scalar encoding is not reduced mod the group order
    #[error("non-canonical scalar encoding")]
    NonCanonicalScalar,

    /// bytes do not decode to a ristretto point
    #[error("invalid point encoding")]
    InvalidPointEncoding,

    /// serialized input ended early or has trailing bytes
    #[error("invalid encoding length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },
}

/// card protocol errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardProtocolError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid card index: {0}")]
    InvalidCardIndex(i64),

    #[error("cryptographic error: {0}")]
    Cryptographic(#[from] CryptoError),

    /// a sub-proof failed inside an all-or-nothing aggregation
    #[error("{proof} proof from entry {index} failed verification")]
    ProofVerificationFailed { proof: &'static str, index: usize },

    #[error("insufficient reveal tokens: got {got}, need {need}")]
    InsufficientRevealTokens { got: usize, need: usize },

    #[error("invalid permutation: {0}")]
    InvalidPermutation(String),
}

pub type Result<T> = core::result::Result<T, CardProtocolError>;
