use alloc::vec::Vec;

use p3_util::log2_ceil_usize;
use serde::{Deserialize, Serialize};

use crate::{
    digest::Digest,
    errors::{MmcsError, MmcsResult},
};

/// Shape of one committed matrix, as needed by a remote verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixInfo {
    /// Position of the matrix in the committed batch.
    pub index: usize,
    /// Number of rows.
    pub height: usize,
    /// Number of elements per row.
    pub width: usize,
}

impl MatrixInfo {
    /// Number of levels of the matrix's own subtree, `ceil(log2(height))`.
    #[must_use]
    pub fn depth(&self) -> usize {
        log2_ceil_usize(self.height)
    }
}

/// Public artifact of a batch commitment.
///
/// The root alone binds the data; the matrix shapes are needed to derive the
/// expected length of every proof, so they travel with the root to any
/// verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[u8; N]: Serialize",
    deserialize = "[u8; N]: Deserialize<'de>"
))]
pub struct Commitment<const N: usize> {
    /// Root of the merged tree.
    pub root: Digest<N>,
    /// Shapes of the committed matrices, in batch order.
    pub matrices: Vec<MatrixInfo>,
}

impl<const N: usize> Commitment<N> {
    #[must_use]
    pub const fn root(&self) -> &Digest<N> {
        &self.root
    }

    #[must_use]
    pub fn matrices(&self) -> &[MatrixInfo] {
        &self.matrices
    }

    #[must_use]
    pub fn num_matrices(&self) -> usize {
        self.matrices.len()
    }

    /// Number of levels of the cap joining all sub-roots into the root.
    #[must_use]
    pub fn cap_height(&self) -> usize {
        log2_ceil_usize(self.matrices.len())
    }

    /// Shape of matrix `matrix_index`, checking that it has row `row_index`.
    pub fn matrix_at(&self, matrix_index: usize, row_index: usize) -> MmcsResult<&MatrixInfo> {
        self.matrices
            .get(matrix_index)
            .filter(|info| row_index < info.height)
            .ok_or(MmcsError::IndexOutOfRange {
                matrix_index,
                row_index,
            })
    }

    /// Number of steps of any proof opening a row of matrix `matrix_index`.
    ///
    /// The walk crosses the matrix's own subtree, then the cap.
    pub fn proof_len(&self, matrix_index: usize) -> MmcsResult<usize> {
        self.matrix_at(matrix_index, 0)
            .map(|info| info.depth() + self.cap_height())
    }
}
