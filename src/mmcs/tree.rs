//! Construction of the merged tree over a batch of matrices.
//!
//! Every matrix `m` owns a subtree of depth `d_m = ceil(log2(height_m))`.
//! Subtrees are aligned at their tops: matrix `m` contributes its row
//! digests to the frontier at depth `d_m` and its sub-root to the frontier at
//! depth `0`. Going up, the frontier at depth `d` is the segment-wise
//! compression of the frontier at depth `d + 1`, concatenated with the row
//! digests of the matrices whose leaves sit at depth `d`. Pairing never
//! crosses a segment, so each matrix's own levels are those of a
//! [`MatrixCommitment`]. The depth-0 frontier holds one sub-root per matrix in
//! batch order and is the leaf level of the cap, whose root is the commitment.

use alloc::vec::Vec;

use itertools::Itertools;
use p3_matrix::{Matrix, dense::RowMajorMatrix};
use p3_maybe_rayon::prelude::*;
use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};
use tracing::{debug, info_span, instrument};

use crate::{
    digest::Digest,
    errors::{MmcsError, MmcsResult},
    hashable::Hashable,
    hasher::MerkleHasher,
    matrix::MatrixCommitment,
    mmcs::commitment::{Commitment, MatrixInfo},
};

/// Location of one matrix's digests inside a [`Frontier`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Index of the matrix in the batch.
    pub matrix_index: usize,
    /// Offset of the first digest in the frontier.
    pub start: usize,
    /// Number of digests.
    pub len: usize,
}

/// All digests at one depth of the merged tree.
///
/// Segments are stored in increasing matrix index and tile `digests`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontier<const N: usize> {
    digests: Vec<Digest<N>>,
    segments: Vec<Segment>,
}

impl<const N: usize> Frontier<N> {
    /// Build the frontier one depth above `below`.
    ///
    /// `joining` lists `(matrix index, row digests)` of the matrices whose
    /// leaves sit at this depth, in increasing matrix index.
    fn ascend<H, C>(
        hasher: &MerkleHasher<H, C, N>,
        below: Option<&Self>,
        joining: Vec<(usize, Vec<Digest<N>>)>,
    ) -> Self
    where
        H: CryptographicHasher<u8, [u8; N]> + Sync,
        C: PseudoCompressionFunction<[u8; N], 2> + Sync,
    {
        let ascended = below.map_or_else(Vec::new, |below| {
            below
                .segments
                .iter()
                .map(|segment| {
                    let level = &below.digests[segment.start..segment.start + segment.len];
                    (segment.matrix_index, hasher.compress_layer(level))
                })
                .collect()
        });

        let mut digests = Vec::with_capacity(
            ascended.iter().chain(&joining).map(|(_, level)| level.len()).sum(),
        );
        let mut segments = Vec::with_capacity(ascended.len() + joining.len());
        for (matrix_index, level) in ascended.into_iter().merge_by(joining, |a, b| a.0 < b.0) {
            segments.push(Segment {
                matrix_index,
                start: digests.len(),
                len: level.len(),
            });
            digests.extend(level);
        }

        Self { digests, segments }
    }

    /// Every digest at this depth, segment after segment.
    #[must_use]
    pub fn digests(&self) -> &[Digest<N>] {
        &self.digests
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Digests of matrix `matrix_index` at this depth, if it reaches it.
    #[must_use]
    pub fn segment(&self, matrix_index: usize) -> Option<&[Digest<N>]> {
        self.segments
            .binary_search_by_key(&matrix_index, |segment| segment.matrix_index)
            .ok()
            .map(|i| {
                let segment = self.segments[i];
                &self.digests[segment.start..segment.start + segment.len]
            })
    }
}

/// Everything the committer keeps to answer openings after commit.
///
/// Immutable once built.
#[derive(Debug)]
pub struct MmcsProverData<T: Clone + Send + Sync, const N: usize> {
    /// The committed matrices, in batch order.
    pub(crate) matrices: Vec<RowMajorMatrix<T>>,
    /// The public commitment.
    pub(crate) commitment: Commitment<N>,
    /// `frontiers[d]` holds the digests at depth `d`, depth 0 being the sub-roots.
    pub(crate) frontiers: Vec<Frontier<N>>,
    /// Tree over the sub-roots.
    pub(crate) cap: MatrixCommitment<N>,
}

impl<T, const N: usize> MmcsProverData<T, N>
where
    T: Hashable + Clone + Send + Sync,
{
    /// Hash, merge and compress `matrices` into a single tree.
    #[instrument(skip_all, fields(num_matrices = matrices.len()))]
    pub(crate) fn build<H, C>(
        hasher: &MerkleHasher<H, C, N>,
        matrices: Vec<RowMajorMatrix<T>>,
    ) -> MmcsResult<Self>
    where
        H: CryptographicHasher<u8, [u8; N]> + Sync,
        C: PseudoCompressionFunction<[u8; N], 2> + Sync,
    {
        if matrices.is_empty() {
            return Err(MmcsError::EmptyBatch);
        }
        if let Some(matrix_index) = matrices.iter().position(|m| m.height() == 0) {
            return Err(MmcsError::EmptyMatrix { matrix_index });
        }

        let infos = matrices
            .iter()
            .enumerate()
            .map(|(index, m)| MatrixInfo {
                index,
                height: m.height(),
                width: m.width(),
            })
            .collect_vec();
        let max_depth = infos.iter().map(MatrixInfo::depth).max().unwrap_or_default();

        // Row digests of every matrix; rows are independent of each other.
        let mut leaves = info_span!("hash rows").in_scope(|| {
            matrices
                .par_iter()
                .map(|m| Some(hasher.hash_rows(&m.values, m.width())))
                .collect::<Vec<_>>()
        });

        // Deepest frontier first; a matrix joins at the depth of its leaves.
        let mut frontiers: Vec<Frontier<N>> = Vec::with_capacity(max_depth + 1);
        info_span!("merge frontiers", max_depth).in_scope(|| {
            for depth in (0..=max_depth).rev() {
                let joining = infos
                    .iter()
                    .filter(|info| info.depth() == depth)
                    .filter_map(|info| leaves[info.index].take().map(|l| (info.index, l)))
                    .collect_vec();
                let frontier = Frontier::ascend(hasher, frontiers.last(), joining);
                debug!(
                    depth,
                    digests = frontier.digests.len(),
                    matrices = frontier.segments.len(),
                    "frontier"
                );
                frontiers.push(frontier);
            }
        });
        frontiers.reverse();

        let sub_roots = frontiers[0].digests.clone();
        debug_assert_eq!(sub_roots.len(), matrices.len());
        let cap = info_span!("cap", sub_roots = sub_roots.len())
            .in_scope(|| MatrixCommitment::from_leaves(hasher, sub_roots));

        let commitment = Commitment {
            root: cap.root(),
            matrices: infos,
        };
        debug!(root = %commitment.root, cap_height = cap.tree_height(), "committed batch");

        Ok(Self {
            matrices,
            commitment,
            frontiers,
            cap,
        })
    }
}

impl<T: Clone + Send + Sync, const N: usize> MmcsProverData<T, N> {
    /// The public commitment produced by the build.
    #[must_use]
    pub const fn commitment(&self) -> &Commitment<N> {
        &self.commitment
    }

    #[must_use]
    pub const fn root(&self) -> &Digest<N> {
        &self.commitment.root
    }

    /// The committed matrices, in batch order.
    #[must_use]
    pub fn matrices(&self) -> &[RowMajorMatrix<T>] {
        &self.matrices
    }

    /// Depth of the deepest matrix subtree.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.frontiers.len() - 1
    }

    /// Frontier at `depth`, `0` being the sub-roots.
    #[must_use]
    pub fn frontier(&self, depth: usize) -> Option<&Frontier<N>> {
        self.frontiers.get(depth)
    }

    /// Tree joining the sub-roots into the root.
    #[must_use]
    pub const fn cap(&self) -> &MatrixCommitment<N> {
        &self.cap
    }
}
