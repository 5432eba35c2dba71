//! Adapter turning injected Plonky3 primitives into leaf and node hashing.

use alloc::vec::Vec;

use p3_maybe_rayon::prelude::*;
use p3_symmetric::{CryptographicHasher, PseudoCompressionFunction};

use crate::{digest::Digest, hashable::Hashable};

/// Leaf hashing and 2-to-1 node compression over `N`-byte digests.
///
/// `H` hashes the serialized row bytes into a leaf digest and `C` compresses
/// two child digests into their parent. Both are black boxes, typically a
/// `p3_blake3::Blake3` or `p3_keccak::Keccak256Hash` and the matching
/// `CompressionFunctionFromHasher<_, 2, N>`.
#[derive(Clone, Debug)]
pub struct MerkleHasher<H, C, const N: usize> {
    /// Hasher applied to the bytes of one row.
    hash: H,
    /// Compression applied to a `(left, right)` pair of digests.
    compress: C,
}

impl<H, C, const N: usize> MerkleHasher<H, C, N>
where
    H: CryptographicHasher<u8, [u8; N]> + Sync,
    C: PseudoCompressionFunction<[u8; N], 2> + Sync,
{
    /// Wrap a byte hasher and a digest compression function.
    pub const fn new(hash: H, compress: C) -> Self {
        Self { hash, compress }
    }

    /// Reduce one row, whatever its width, to a single digest.
    #[inline]
    pub fn hash_row<T: Hashable>(&self, row: &[T]) -> Digest<N> {
        Digest(self.hash.hash_iter(row.iter().flat_map(Hashable::hash_bytes)))
    }

    /// Parent digest of a `(left, right)` pair.
    #[inline]
    pub fn compress(&self, left: &Digest<N>, right: &Digest<N>) -> Digest<N> {
        Digest(self.compress.compress([left.0, right.0]))
    }

    /// Hash every row of a row-major buffer of the given width.
    ///
    /// `width` must be non-zero.
    pub fn hash_rows<T: Hashable + Sync>(&self, values: &[T], width: usize) -> Vec<Digest<N>> {
        values
            .par_chunks_exact(width)
            .map(|row| self.hash_row(row))
            .collect()
    }

    /// Build the next level up from `layer`.
    ///
    /// Consecutive pairs are compressed; when `layer` has odd length the final
    /// digest is compressed with itself.
    pub fn compress_layer(&self, layer: &[Digest<N>]) -> Vec<Digest<N>> {
        layer
            .par_chunks(2)
            .map(|pair| match pair {
                [left, right] => self.compress(left, right),
                [last] => self.compress(last, last),
                _ => unreachable!("chunks of two"),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use p3_keccak::Keccak256Hash;
    use p3_symmetric::CompressionFunctionFromHasher;

    use super::*;

    type ByteHash = Keccak256Hash;
    type MyCompress = CompressionFunctionFromHasher<ByteHash, 2, 32>;

    fn hasher() -> MerkleHasher<ByteHash, MyCompress, 32> {
        MerkleHasher::new(ByteHash {}, MyCompress::new(ByteHash {}))
    }

    #[test]
    fn test_hash_row_matches_hashing_serialized_bytes() {
        let h = hasher();
        let row = [1u32, 2, 3];
        let bytes: Vec<u8> = row.iter().flat_map(|x| x.to_le_bytes()).collect();
        assert_eq!(h.hash_row(&row), Digest(ByteHash {}.hash_slice(&bytes)));
    }

    #[test]
    fn test_hash_row_is_width_agnostic() {
        let h = hasher();
        // Same bytes, different element widths: same digest.
        let wide = [0x0403_0201u32];
        let narrow = [1u8, 2, 3, 4];
        assert_eq!(h.hash_row(&wide), h.hash_row(&narrow));
        // Different contents always differ.
        assert_ne!(h.hash_row(&[1u8, 2, 3]), h.hash_row(&[1u8, 2, 3, 4]));
    }

    #[test]
    fn test_hash_rows_hashes_each_row() {
        let h = hasher();
        let values = vec![1u8, 2, 3, 4, 5, 6];
        let digests = h.hash_rows(&values, 2);
        assert_eq!(
            digests,
            vec![h.hash_row(&[1u8, 2]), h.hash_row(&[3u8, 4]), h.hash_row(&[5u8, 6])]
        );
    }

    #[test]
    fn test_compress_layer_duplicates_last_node() {
        let h = hasher();
        let layer: Vec<_> = (0u8..3).map(|i| h.hash_row(&[i])).collect();
        let next = h.compress_layer(&layer);
        assert_eq!(
            next,
            vec![h.compress(&layer[0], &layer[1]), h.compress(&layer[2], &layer[2])]
        );
    }

    #[test]
    fn test_compress_is_order_sensitive() {
        let h = hasher();
        let a = h.hash_row(&[0u8]);
        let b = h.hash_row(&[1u8]);
        assert_ne!(h.compress(&a, &b), h.compress(&b, &a));
    }
}
