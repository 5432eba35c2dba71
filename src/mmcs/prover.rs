use alloc::vec::Vec;

use p3_maybe_rayon::prelude::*;
use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};
use tracing::instrument;

use crate::{
    errors::MmcsResult,
    mmcs::{MixedMmcs, proof::Proof, tree::MmcsProverData},
    path::open_path,
};

impl<T: Clone + Send + Sync, const N: usize> MmcsProverData<T, N> {
    /// Open row `row_index` of matrix `matrix_index`.
    ///
    /// Returns the row together with its authentication path: first the
    /// siblings inside the matrix's own subtree, then the siblings inside the
    /// cap, starting from the matrix's sub-root.
    pub fn open(&self, matrix_index: usize, row_index: usize) -> MmcsResult<(Vec<T>, Proof<N>)> {
        let info = *self.commitment.matrix_at(matrix_index, row_index)?;
        let matrix = &self.matrices[matrix_index];
        let row = matrix.values[row_index * info.width..(row_index + 1) * info.width].to_vec();

        let mut steps = Vec::with_capacity(info.depth() + self.cap.tree_height());
        let own_levels = (1..=info.depth()).rev().map(|depth| {
            self.frontiers[depth]
                .segment(matrix_index)
                .expect("a matrix reaches every depth above its leaves")
        });
        open_path(own_levels, row_index, &mut steps);

        let cap_levels = &self.cap.levels()[..self.cap.tree_height()];
        open_path(cap_levels.iter().map(Vec::as_slice), matrix_index, &mut steps);

        Ok((row, Proof::new(steps)))
    }

    /// Open several `(matrix index, row index)` positions at once.
    ///
    /// Fails if any position is out of range.
    pub fn open_many(&self, positions: &[(usize, usize)]) -> MmcsResult<Vec<(Vec<T>, Proof<N>)>> {
        positions
            .par_iter()
            .map(|&(matrix_index, row_index)| self.open(matrix_index, row_index))
            .collect()
    }
}

impl<H, C, const N: usize> MixedMmcs<H, C, N>
where
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    /// Open row `row_index` of matrix `matrix_index` of a committed batch.
    #[instrument(level = "debug", skip(self, prover_data))]
    pub fn open_batch<T: Clone + Send + Sync>(
        &self,
        matrix_index: usize,
        row_index: usize,
        prover_data: &MmcsProverData<T, N>,
    ) -> MmcsResult<(Vec<T>, Proof<N>)> {
        prover_data.open(matrix_index, row_index)
    }

    /// Open several positions of a committed batch in parallel.
    pub fn open_many<T: Clone + Send + Sync>(
        &self,
        positions: &[(usize, usize)],
        prover_data: &MmcsProverData<T, N>,
    ) -> MmcsResult<Vec<(Vec<T>, Proof<N>)>> {
        prover_data.open_many(positions)
    }
}

