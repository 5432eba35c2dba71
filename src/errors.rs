//! Error types for committing to, opening and verifying matrix batches.

use thiserror::Error;

/// Result alias used by every fallible operation of the crate.
pub type MmcsResult<T> = Result<T, MmcsError>;

/// Top-level error type for MMCS operations.
///
/// Every variant is detected synchronously. None of them is transient:
/// repeating the call with the same inputs yields the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MmcsError {
    /// A matrix without rows was submitted to commit.
    #[error("matrix {matrix_index} has no rows")]
    EmptyMatrix { matrix_index: usize },

    /// Commit was called with zero matrices.
    #[error("cannot commit to an empty batch of matrices")]
    EmptyBatch,

    /// An opening or verification referenced a matrix or row that does not exist.
    #[error("no row {row_index} in matrix {matrix_index}")]
    IndexOutOfRange {
        matrix_index: usize,
        row_index: usize,
    },

    /// The claimed row does not have the committed width.
    #[error("row width mismatch: expected {expected}, got {actual}")]
    RowWidthMismatch { expected: usize, actual: usize },

    /// The proof does not have the shape implied by the commitment.
    #[error("malformed proof: {0}")]
    MalformedProof(#[from] ProofShapeError),

    /// The proof is well-formed but does not authenticate the row against the root.
    #[error("proof does not authenticate the row against the committed root")]
    InvalidProof,
}

/// Structural defects of a proof, detected before any hashing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofShapeError {
    /// The number of steps differs from the depth derived from the commitment.
    #[error("expected {expected} proof steps, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// A side marker other than `0` (left) or `1` (right).
    #[error("unknown side marker {marker:#04x} at step {step}")]
    UnknownSide { step: usize, marker: u8 },

    /// The encoded proof is not a whole number of `(side, digest)` steps.
    #[error("{len} bytes is not a multiple of the {step_size}-byte step size")]
    TruncatedEncoding { len: usize, step_size: usize },
}
