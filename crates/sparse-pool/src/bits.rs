//! Bit-level helpers shared by the pool and the map.

/// First multiplier of the avalanche mix.
const MIX_MUL_1: u64 = 0xBF58_476D_1CE4_E5B9;
/// Second multiplier of the avalanche mix.
const MIX_MUL_2: u64 = 0x94D0_49BB_1331_11EB;

/// Round `value` up to the next multiple of `alignment`.
///
/// `alignment` must be a non-zero power of two. Returns `None` on overflow.
#[inline]
pub fn align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    let mask = alignment - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

/// Fixed 64-bit avalanche mix (xorshift-multiply-xorshift-multiply-xorshift).
///
/// Bijective on `u64` and unseeded, so results are stable across runs.
#[inline]
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(MIX_MUL_1);
    x ^= x >> 27;
    x = x.wrapping_mul(MIX_MUL_2);
    x ^= x >> 31;
    x
}

/// Hash an opaque handle.
///
/// The low three bits are dropped first: handles are usually pointer-like and
/// those bits carry alignment padding only.
#[inline]
pub fn hash_handle(key: u64) -> u64 {
    mix64(key >> 3)
}

/// Ideal bucket for `key` in a table whose capacity is `mask + 1`.
#[inline]
pub fn ideal_bucket(key: u64, mask: usize) -> usize {
    debug_assert!((mask + 1).is_power_of_two());
    (hash_handle(key) & mask as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(0, 8), Some(0));
        assert_eq!(align_up(1, 8), Some(8));
        assert_eq!(align_up(8, 8), Some(8));
        assert_eq!(align_up(13, 4), Some(16));
        assert_eq!(align_up(13, 1), Some(13));
    }

    #[test]
    fn align_up_overflow_is_none() {
        assert_eq!(align_up(usize::MAX, 16), None);
    }

    #[test]
    fn mix_of_zero_is_zero() {
        assert_eq!(mix64(0), 0);
    }

    #[test]
    fn mix_is_stable() {
        assert_eq!(mix64(1), 0x5692_161D_100B_05E5);
        assert_eq!(hash_handle(8), 0x5692_161D_100B_05E5);
    }

    #[test]
    fn low_bits_do_not_affect_hash() {
        for low in 0..8u64 {
            assert_eq!(hash_handle(0x1000 | low), hash_handle(0x1000));
        }
    }

    #[test]
    fn ideal_bucket_known_values() {
        // 100 >> 3 = 12, 108 >> 3 = 13, 116 >> 3 = 14.
        assert_eq!(ideal_bucket(100, 7), 4);
        assert_eq!(ideal_bucket(108, 7), 1);
        assert_eq!(ideal_bucket(116, 7), 1);
        assert_eq!(ideal_bucket(8, 7), 5);
        assert_eq!(ideal_bucket(88, 7), 5);
        assert_eq!(ideal_bucket(128, 7), 5);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn align_up_is_aligned_and_minimal(value in 0usize..1 << 40, shift in 0u32..13) {
                let alignment = 1usize << shift;
                let aligned = align_up(value, alignment).unwrap();
                prop_assert_eq!(aligned % alignment, 0);
                prop_assert!(aligned >= value);
                prop_assert!(aligned - value < alignment);
            }

            #[test]
            fn ideal_bucket_in_range(key in any::<u64>(), shift in 0u32..20) {
                let mask = (1usize << shift) - 1;
                prop_assert!(ideal_bucket(key, mask) <= mask);
            }
        }
    }
}
