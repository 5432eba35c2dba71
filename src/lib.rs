#![no_std]
extern crate alloc;

pub mod digest;
pub mod errors;
pub mod hashable;
pub mod hasher;
pub mod matrix;
pub mod mmcs;
mod path;

pub use digest::Digest;
pub use errors::{MmcsError, MmcsResult, ProofShapeError};
pub use hashable::Hashable;
pub use hasher::MerkleHasher;
pub use matrix::{MatrixCommitment, verify_row};
pub use mmcs::{
    MixedMmcs,
    commitment::{Commitment, MatrixInfo},
    proof::{Proof, ProofStep, Side},
    tree::MmcsProverData,
};
