use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{
    digest::Digest,
    errors::{MmcsResult, ProofShapeError},
};

/// Position of a sibling relative to the node being authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The sibling is the left child: `parent = compress(sibling, current)`.
    Left,
    /// The sibling is the right child: `parent = compress(current, sibling)`.
    Right,
}

impl Side {
    /// Side of the sibling of the node at `index` within its level.
    #[must_use]
    pub const fn of_sibling(index: usize) -> Self {
        if index & 1 == 1 { Self::Left } else { Self::Right }
    }

    /// Wire marker of this side.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Decode a wire marker, `None` for anything but `0` and `1`.
    #[must_use]
    pub const fn from_byte(marker: u8) -> Option<Self> {
        match marker {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

/// One level of an authentication path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[u8; N]: Serialize",
    deserialize = "[u8; N]: Deserialize<'de>"
))]
pub struct ProofStep<const N: usize> {
    /// Where the sibling sits relative to the current node.
    pub side: Side,
    /// The sibling digest.
    pub sibling: Digest<N>,
}

/// Authentication path from a leaf up to, but excluding, the root.
///
/// Steps are ordered bottom-to-top.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "[u8; N]: Serialize",
    deserialize = "[u8; N]: Deserialize<'de>"
))]
pub struct Proof<const N: usize> {
    pub steps: Vec<ProofStep<N>>,
}

impl<const N: usize> Proof<N> {
    /// Size in bytes of one encoded step: a side marker followed by the digest.
    pub const STEP_SIZE: usize = 1 + N;

    #[must_use]
    pub const fn new(steps: Vec<ProofStep<N>>) -> Self {
        Self { steps }
    }

    /// Number of levels walked from the leaf to the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProofStep<N>> {
        self.steps.iter()
    }

    /// Encode as `(side byte, digest bytes)` per step, bottom-to-top.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.steps.len() * Self::STEP_SIZE);
        for step in &self.steps {
            out.push(step.side.to_byte());
            out.extend_from_slice(step.sibling.as_bytes());
        }
        out
    }

    /// Decode the encoding produced by [`Self::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> MmcsResult<Self> {
        if bytes.len() % Self::STEP_SIZE != 0 {
            return Err(ProofShapeError::TruncatedEncoding {
                len: bytes.len(),
                step_size: Self::STEP_SIZE,
            }
            .into());
        }

        let steps = bytes
            .chunks_exact(Self::STEP_SIZE)
            .enumerate()
            .map(|(step, chunk)| {
                let (marker, digest) = chunk.split_at(1);
                let side = Side::from_byte(marker[0]).ok_or(ProofShapeError::UnknownSide {
                    step,
                    marker: marker[0],
                })?;
                // `chunks_exact` guarantees exactly N digest bytes.
                let sibling = Digest::from_slice(digest).ok_or(ProofShapeError::TruncatedEncoding {
                    len: bytes.len(),
                    step_size: Self::STEP_SIZE,
                })?;
                Ok(ProofStep { side, sibling })
            })
            .collect::<Result<Vec<_>, ProofShapeError>>()?;

        Ok(Self { steps })
    }
}

impl<'a, const N: usize> IntoIterator for &'a Proof<N> {
    type Item = &'a ProofStep<N>;
    type IntoIter = core::slice::Iter<'a, ProofStep<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::errors::MmcsError;

    fn sample_proof() -> Proof<4> {
        Proof::new(vec![
            ProofStep {
                side: Side::Right,
                sibling: Digest([1, 2, 3, 4]),
            },
            ProofStep {
                side: Side::Left,
                sibling: Digest([5, 6, 7, 8]),
            },
        ])
    }

    #[test]
    fn test_side_of_sibling_follows_index_parity() {
        assert_eq!(Side::of_sibling(0), Side::Right);
        assert_eq!(Side::of_sibling(1), Side::Left);
        assert_eq!(Side::of_sibling(6), Side::Right);
        assert_eq!(Side::of_sibling(7), Side::Left);
    }

    #[test]
    fn test_wire_layout() {
        let bytes = sample_proof().to_bytes();
        assert_eq!(bytes, vec![1, 1, 2, 3, 4, 0, 5, 6, 7, 8]);
        assert_eq!(bytes.len(), 2 * Proof::<4>::STEP_SIZE);
        assert_eq!(Proof::<4>::from_bytes(&bytes).unwrap(), sample_proof());
    }

    #[test]
    fn test_empty_proof_encodes_to_nothing() {
        let proof = Proof::<32>::default();
        assert!(proof.to_bytes().is_empty());
        assert!(Proof::<32>::from_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_from_bytes_rejects_unknown_side() {
        let mut bytes = sample_proof().to_bytes();
        bytes[5] = 2;
        assert_eq!(
            Proof::<4>::from_bytes(&bytes),
            Err(MmcsError::MalformedProof(ProofShapeError::UnknownSide {
                step: 1,
                marker: 2
            }))
        );
    }

    #[test]
    fn test_from_bytes_rejects_partial_step() {
        let bytes = sample_proof().to_bytes();
        assert_eq!(
            Proof::<4>::from_bytes(&bytes[..bytes.len() - 1]),
            Err(MmcsError::MalformedProof(ProofShapeError::TruncatedEncoding {
                len: 9,
                step_size: 5
            }))
        );
    }
}
