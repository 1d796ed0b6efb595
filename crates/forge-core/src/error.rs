use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("missing required transaction field `{0}`")]
    MissingField(&'static str),

    #[error("chain has no blocks")]
    EmptyChain,

    #[error("block {index} has previous_hash {found}, expected {expected}")]
    HashMismatch {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("block at position {position} has index {found}")]
    IndexMismatch { position: usize, found: u64 },

    #[error("proof search cancelled")]
    Cancelled,

    #[error("no valid proof in the u64 candidate space")]
    ProofSpaceExhausted,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
