//! Binary Merkle commitment to the rows of a single matrix.

use alloc::vec::Vec;

use p3_matrix::{Matrix, dense::RowMajorMatrix};
use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};
use p3_util::log2_ceil_usize;
use tracing::instrument;

use crate::{
    digest::Digest,
    errors::{MmcsError, MmcsResult, ProofShapeError},
    hashable::Hashable,
    hasher::MerkleHasher,
    mmcs::proof::Proof,
    path::{fold_path, open_path},
};

/// All digest levels of a binary Merkle tree over one matrix.
///
/// `levels[0]` holds the row digests and every following level is the
/// pairwise compression of the one below it, the last node of an odd-length
/// level being paired with itself. The final level holds the single sub-root,
/// so `levels[k + 1].len() == levels[k].len().div_ceil(2)` throughout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixCommitment<const N: usize> {
    levels: Vec<Vec<Digest<N>>>,
}

impl<const N: usize> MatrixCommitment<N> {
    /// Hash every row of `matrix` and build the tree above the row digests.
    ///
    /// Fails with `EmptyMatrix` when the matrix has no rows.
    #[instrument(skip_all, fields(height = matrix.height(), width = matrix.width()))]
    pub fn build<T, H, C>(
        hasher: &MerkleHasher<H, C, N>,
        matrix: &RowMajorMatrix<T>,
    ) -> MmcsResult<Self>
    where
        T: Hashable + Clone + Send + Sync,
        H: CryptographicHasher<u8, [u8; N]> + Sync,
        C: PseudoCompressionFunction<[u8; N], 2> + Sync,
    {
        if matrix.height() == 0 {
            return Err(MmcsError::EmptyMatrix { matrix_index: 0 });
        }
        let leaves = hasher.hash_rows(&matrix.values, matrix.width());
        Ok(Self::from_leaves(hasher, leaves))
    }

    /// Build the tree above an already hashed, non-empty leaf level.
    pub(crate) fn from_leaves<H, C>(hasher: &MerkleHasher<H, C, N>, leaves: Vec<Digest<N>>) -> Self
    where
        H: CryptographicHasher<u8, [u8; N]> + Sync,
        C: PseudoCompressionFunction<[u8; N], 2> + Sync,
    {
        debug_assert!(!leaves.is_empty());
        let mut levels = Vec::with_capacity(log2_ceil_usize(leaves.len()) + 1);
        let mut current = leaves;
        while current.len() > 1 {
            let next = hasher.compress_layer(&current);
            levels.push(core::mem::replace(&mut current, next));
        }
        levels.push(current);
        Self { levels }
    }

    /// The sub-root: the single digest of the top level.
    #[must_use]
    pub fn root(&self) -> Digest<N> {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of committed rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of compressions between a leaf and the root, `ceil(log2(height))`.
    #[must_use]
    pub fn tree_height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Every level, leaves first, root last.
    #[must_use]
    pub fn levels(&self) -> &[Vec<Digest<N>>] {
        &self.levels
    }

    /// The row digests.
    #[must_use]
    pub fn leaves(&self) -> &[Digest<N>] {
        &self.levels[0]
    }

    /// Authentication path of row `row_index`.
    pub fn open_row(&self, row_index: usize) -> MmcsResult<Proof<N>> {
        if row_index >= self.height() {
            return Err(MmcsError::IndexOutOfRange {
                matrix_index: 0,
                row_index,
            });
        }
        let mut steps = Vec::with_capacity(self.tree_height());
        open_path(
            self.levels[..self.tree_height()].iter().map(Vec::as_slice),
            row_index,
            &mut steps,
        );
        Ok(Proof::new(steps))
    }
}

/// Check that `row` is row `row_index` of a matrix of `height` rows committed
/// under `root`.
pub fn verify_row<T, H, C, const N: usize>(
    hasher: &MerkleHasher<H, C, N>,
    root: &Digest<N>,
    height: usize,
    row_index: usize,
    row: &[T],
    proof: &Proof<N>,
) -> MmcsResult<()>
where
    T: Hashable,
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    if row_index >= height {
        return Err(MmcsError::IndexOutOfRange {
            matrix_index: 0,
            row_index,
        });
    }
    let expected = log2_ceil_usize(height);
    if proof.len() != expected {
        return Err(ProofShapeError::WrongLength {
            expected,
            actual: proof.len(),
        }
        .into());
    }

    let computed = fold_path(hasher, hasher.hash_row(row), row_index, height, &proof.steps)?;
    if computed == *root {
        Ok(())
    } else {
        Err(MmcsError::InvalidProof)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use p3_baby_bear::BabyBear;
    use p3_blake3::Blake3;
    use p3_symmetric::CompressionFunctionFromHasher;
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::mmcs::proof::Side;

    type F = BabyBear;
    type ByteHash = Blake3;
    type MyCompress = CompressionFunctionFromHasher<ByteHash, 2, 32>;
    type MyHasher = MerkleHasher<ByteHash, MyCompress, 32>;

    fn hasher() -> MyHasher {
        MerkleHasher::new(ByteHash {}, MyCompress::new(ByteHash {}))
    }

    fn random_matrix(rng: &mut SmallRng, height: usize, width: usize) -> RowMajorMatrix<F> {
        RowMajorMatrix::new((0..height * width).map(|_| rng.random()).collect(), width)
    }

    #[test]
    fn test_level_sizes_halve_rounding_up() {
        let h = hasher();
        let mut rng = SmallRng::seed_from_u64(1);
        let matrix = random_matrix(&mut rng, 11, 3);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();

        let sizes: Vec<_> = commitment.levels().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![11, 6, 3, 2, 1]);
        assert_eq!(commitment.tree_height(), 4);
        assert_eq!(commitment.height(), 11);
    }

    #[test]
    fn test_root_of_four_rows() {
        let h = hasher();
        let matrix = RowMajorMatrix::new((0u32..8).collect(), 2);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();

        let leaves: Vec<_> = (0u32..4).map(|i| h.hash_row(&[2 * i, 2 * i + 1])).collect();
        let expected = h.compress(
            &h.compress(&leaves[0], &leaves[1]),
            &h.compress(&leaves[2], &leaves[3]),
        );
        assert_eq!(commitment.leaves(), leaves.as_slice());
        assert_eq!(commitment.root(), expected);
    }

    #[test]
    fn test_single_row_root_is_row_digest() {
        let h = hasher();
        let matrix = RowMajorMatrix::new(vec![5u64, 6, 7], 3);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();

        assert_eq!(commitment.root(), h.hash_row(&[5u64, 6, 7]));
        assert_eq!(commitment.tree_height(), 0);
        assert!(commitment.open_row(0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_matrix_is_rejected() {
        let h = hasher();
        let matrix = RowMajorMatrix::<F>::new(vec![], 4);
        assert_eq!(
            MatrixCommitment::build(&h, &matrix),
            Err(MmcsError::EmptyMatrix { matrix_index: 0 })
        );
    }

    #[test]
    fn test_every_row_opens_and_verifies() {
        let h = hasher();
        let mut rng = SmallRng::seed_from_u64(7);
        for height in [1, 2, 3, 5, 8, 13] {
            let matrix = random_matrix(&mut rng, height, 2);
            let commitment = MatrixCommitment::build(&h, &matrix).unwrap();
            for (i, row) in matrix.values.chunks_exact(2).enumerate() {
                let proof = commitment.open_row(i).unwrap();
                assert_eq!(proof.len(), log2_ceil_usize(height));
                verify_row(&h, &commitment.root(), height, i, row, &proof).unwrap();
            }
        }
    }

    #[test]
    fn test_last_row_of_odd_height_uses_own_digest() {
        let h = hasher();
        let matrix = RowMajorMatrix::new((0u8..5).collect(), 1);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();
        let proof = commitment.open_row(4).unwrap();

        // 5 -> 3 -> 2 -> 1: the last row is unpaired on the first two levels.
        assert_eq!(proof.steps[0].side, Side::Right);
        assert_eq!(proof.steps[0].sibling, h.hash_row(&[4u8]));
        assert_eq!(proof.steps[1].side, Side::Right);
        assert_eq!(proof.steps[1].sibling, commitment.levels()[1][2]);
        assert_eq!(proof.steps[2].side, Side::Left);
        verify_row(&h, &commitment.root(), 5, 4, &[4u8], &proof).unwrap();
    }

    #[test]
    fn test_verify_rejects_wrong_row_and_wrong_index() {
        let h = hasher();
        let matrix = RowMajorMatrix::new((0u8..8).collect(), 1);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();
        let root = commitment.root();
        let proof = commitment.open_row(3).unwrap();

        assert_eq!(
            verify_row(&h, &root, 8, 3, &[9u8], &proof),
            Err(MmcsError::InvalidProof)
        );
        assert_eq!(
            verify_row(&h, &root, 8, 2, &[3u8], &proof),
            Err(MmcsError::InvalidProof)
        );
        assert_eq!(
            verify_row(&h, &root, 8, 8, &[3u8], &proof),
            Err(MmcsError::IndexOutOfRange {
                matrix_index: 0,
                row_index: 8
            })
        );
    }

    #[test]
    fn test_verify_rejects_short_proof() {
        let h = hasher();
        let matrix = RowMajorMatrix::new((0u8..8).collect(), 1);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();
        let mut proof = commitment.open_row(6).unwrap();
        proof.steps.pop();

        assert_eq!(
            verify_row(&h, &commitment.root(), 8, 6, &[6u8], &proof),
            Err(MmcsError::MalformedProof(ProofShapeError::WrongLength {
                expected: 3,
                actual: 2
            }))
        );
    }

    #[test]
    fn test_open_out_of_range_row() {
        let h = hasher();
        let matrix = RowMajorMatrix::new((0u8..3).collect(), 1);
        let commitment = MatrixCommitment::build(&h, &matrix).unwrap();
        assert_eq!(
            commitment.open_row(3),
            Err(MmcsError::IndexOutOfRange {
                matrix_index: 0,
                row_index: 3
            })
        );
    }
}
