//! Capability trait for anything that can be fed into the row hasher.

use p3_baby_bear::BabyBear;
use p3_field::{PrimeField32, PrimeField64};
use p3_goldilocks::Goldilocks;
use p3_koala_bear::KoalaBear;

use crate::digest::Digest;

/// An element that can be absorbed by a byte-oriented row hasher.
///
/// Implementations must be injective: two distinct values of the same type
/// must never produce the same byte sequence. A row is hashed as the
/// concatenation of the byte sequences of its elements.
pub trait Hashable {
    /// Fixed-size byte encoding of one element.
    type Bytes: IntoIterator<Item = u8>;

    /// Canonical little-endian encoding of the element.
    fn hash_bytes(&self) -> Self::Bytes;
}

macro_rules! impl_hashable_for_int {
    ($($t:ty),*) => {
        $(
            impl Hashable for $t {
                type Bytes = [u8; core::mem::size_of::<$t>()];

                #[inline]
                fn hash_bytes(&self) -> Self::Bytes {
                    self.to_le_bytes()
                }
            }
        )*
    };
}

impl_hashable_for_int!(u8, u16, u32, u64);

// Field elements are encoded through their canonical representative, never
// through their internal (Montgomery) form.
macro_rules! impl_hashable_for_field32 {
    ($($f:ty),*) => {
        $(
            impl Hashable for $f {
                type Bytes = [u8; 4];

                #[inline]
                fn hash_bytes(&self) -> Self::Bytes {
                    self.as_canonical_u32().to_le_bytes()
                }
            }
        )*
    };
}

impl_hashable_for_field32!(BabyBear, KoalaBear);

impl Hashable for Goldilocks {
    type Bytes = [u8; 8];

    #[inline]
    fn hash_bytes(&self) -> Self::Bytes {
        self.as_canonical_u64().to_le_bytes()
    }
}

impl<const N: usize> Hashable for Digest<N> {
    type Bytes = [u8; N];

    #[inline]
    fn hash_bytes(&self) -> Self::Bytes {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use p3_field::PrimeCharacteristicRing;

    use super::*;

    #[test]
    fn test_integers_encode_little_endian() {
        assert_eq!(0xabu8.hash_bytes(), [0xab]);
        assert_eq!(0x0102u16.hash_bytes(), [0x02, 0x01]);
        assert_eq!(0x0102_0304u32.hash_bytes(), [0x04, 0x03, 0x02, 0x01]);
        assert_eq!(1u64.hash_bytes(), [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_fields_encode_canonical_value() {
        assert_eq!(BabyBear::from_u32(7).hash_bytes(), 7u32.to_le_bytes());
        assert_eq!(KoalaBear::from_u32(7).hash_bytes(), 7u32.to_le_bytes());
        assert_eq!(Goldilocks::from_u64(7).hash_bytes(), 7u64.to_le_bytes());

        // -1 is p - 1 in canonical form, never a Montgomery residue.
        let minus_one = BabyBear::NEG_ONE.hash_bytes();
        assert_eq!(minus_one, (BabyBear::ORDER_U32 - 1).to_le_bytes());
    }

    #[test]
    fn test_digest_encodes_raw_bytes() {
        let digest = Digest([9u8; 32]);
        let bytes: Vec<u8> = digest.hash_bytes().into_iter().collect();
        assert_eq!(bytes, [9u8; 32]);
    }
}
