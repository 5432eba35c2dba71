//! Mixed matrix commitment scheme: one Merkle root over a batch of matrices
//! of arbitrary heights and widths.

use alloc::vec::Vec;

use p3_matrix::dense::RowMajorMatrix;
use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};

use crate::{
    errors::MmcsResult,
    hashable::Hashable,
    hasher::MerkleHasher,
    mmcs::{commitment::Commitment, tree::MmcsProverData},
};

pub mod commitment;
pub mod proof;
pub mod prover;
pub mod tree;
pub mod verifier;


/// Commits to batches of matrices, opens their rows and verifies openings.
///
/// The hash and compression primitives are injected at construction; the
/// scheme itself holds no other state, so one instance can serve any number
/// of batches and concurrent callers.
#[derive(Clone, Debug)]
pub struct MixedMmcs<H, C, const N: usize> {
    pub(crate) hasher: MerkleHasher<H, C, N>,
}

impl<H, C, const N: usize> MixedMmcs<H, C, N>
where
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    pub const fn new(hash: H, compress: C) -> Self {
        Self {
            hasher: MerkleHasher::new(hash, compress),
        }
    }

    /// Leaf and node hashing used by this scheme.
    pub const fn hasher(&self) -> &MerkleHasher<H, C, N> {
        &self.hasher
    }

    /// Commit to `matrices` under a single root.
    ///
    /// Returns the public commitment and the prover data needed to open rows.
    /// Fails with `EmptyBatch` for an empty batch and `EmptyMatrix` if any
    /// matrix has no rows; no commitment is produced in either case.
    pub fn commit<T>(
        &self,
        matrices: Vec<RowMajorMatrix<T>>,
    ) -> MmcsResult<(Commitment<N>, MmcsProverData<T, N>)>
    where
        T: Hashable + Clone + Send + Sync,
    {
        let prover_data = MmcsProverData::build(&self.hasher, matrices)?;
        Ok((prover_data.commitment().clone(), prover_data))
    }
}
