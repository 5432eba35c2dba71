use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};
use tracing::debug;

use crate::{
    errors::{MmcsError, MmcsResult, ProofShapeError},
    hashable::Hashable,
    mmcs::{MixedMmcs, commitment::Commitment, proof::Proof},
    path::fold_path,
};

impl<H, C, const N: usize> MixedMmcs<H, C, N>
where
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    /// Check that `row` is row `row_index` of matrix `matrix_index` under `commitment`.
    ///
    /// The shape of the claim is validated before any hashing: the indices and
    /// the row width against the committed metadata, and the proof length
    /// against the depth derived from it. The proof is then folded through the
    /// matrix's own subtree up to its sub-root, and through the cap up to the
    /// root.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if the matrix or the row does not exist,
    /// - `RowWidthMismatch` if `row` does not have the committed width,
    /// - `MalformedProof` if the proof has the wrong number of steps,
    /// - `InvalidProof` if the recomputed root differs from the committed one.
    pub fn verify_batch<T: Hashable>(
        &self,
        commitment: &Commitment<N>,
        matrix_index: usize,
        row_index: usize,
        row: &[T],
        proof: &Proof<N>,
    ) -> MmcsResult<()> {
        let info = commitment.matrix_at(matrix_index, row_index)?;
        if row.len() != info.width {
            return Err(MmcsError::RowWidthMismatch {
                expected: info.width,
                actual: row.len(),
            });
        }

        let expected = info.depth() + commitment.cap_height();
        if proof.len() != expected {
            return Err(ProofShapeError::WrongLength {
                expected,
                actual: proof.len(),
            }
            .into());
        }

        let (own_steps, cap_steps) = proof.steps.split_at(info.depth());
        let leaf = self.hasher.hash_row(row);
        let sub_root = fold_path(&self.hasher, leaf, row_index, info.height, own_steps)?;
        let root = fold_path(
            &self.hasher,
            sub_root,
            matrix_index,
            commitment.num_matrices(),
            cap_steps,
        )?;

        if root == commitment.root {
            Ok(())
        } else {
            debug!(matrix_index, row_index, "recomputed root does not match");
            Err(MmcsError::InvalidProof)
        }
    }
}
