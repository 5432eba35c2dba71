//! Authentication path walking shared by the single-matrix tree and the MMCS.

use alloc::vec::Vec;

use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};

use crate::{
    digest::Digest,
    errors::{MmcsError, MmcsResult},
    hasher::MerkleHasher,
    mmcs::proof::{ProofStep, Side},
};

/// Record the siblings of `index` through `levels`, bottom-to-top.
///
/// `levels` yields every level below the root. Each level must be the
/// duplicate-last-node compression of the previous one.
pub(crate) fn open_path<'a, const N: usize>(
    levels: impl IntoIterator<Item = &'a [Digest<N>]>,
    mut index: usize,
    out: &mut Vec<ProofStep<N>>,
) {
    for level in levels {
        let side = Side::of_sibling(index);
        let sibling = match side {
            Side::Left => level[index - 1],
            // The last node of an odd-length level is its own sibling.
            Side::Right => level.get(index + 1).copied().unwrap_or(level[index]),
        };
        out.push(ProofStep { side, sibling });
        index >>= 1;
    }
}

/// Recompute the top of a subtree with `leaf_count` leaves from the leaf at
/// `index` and one step per level.
///
/// The caller must have checked that `steps` has exactly
/// `log2_ceil(leaf_count)` entries and that `index < leaf_count`.
///
/// Steps whose side contradicts `index`, or duplicate-last-node steps whose
/// sibling is not the current node, are rejected as `InvalidProof`.
pub(crate) fn fold_path<H, C, const N: usize>(
    hasher: &MerkleHasher<H, C, N>,
    leaf: Digest<N>,
    mut index: usize,
    leaf_count: usize,
    steps: &[ProofStep<N>],
) -> MmcsResult<Digest<N>>
where
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    let mut current = leaf;
    let mut level_len = leaf_count;
    for step in steps {
        if step.side != Side::of_sibling(index) {
            return Err(MmcsError::InvalidProof);
        }
        current = match step.side {
            Side::Left => hasher.compress(&step.sibling, &current),
            Side::Right => {
                if index + 1 == level_len && step.sibling != current {
                    return Err(MmcsError::InvalidProof);
                }
                hasher.compress(&current, &step.sibling)
            }
        };
        index >>= 1;
        level_len = level_len.div_ceil(2);
    }
    Ok(current)
}
