//! Deterministic handle streams.

use indexmap::IndexSet;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator of pointer-like 64-bit handles.
///
/// Handles are 16-byte aligned and fall inside a few simulated heap regions,
/// so high bits repeat and low bits are always zero, the way driver object
/// handles tend to look.
pub struct KeyStream {
    rng: ChaCha8Rng,
}

impl KeyStream {
    /// Base addresses of the simulated heap regions.
    const REGIONS: [u64; 4] = [
        0x0000_5555_0000_0000,
        0x0000_7F3A_0000_0000,
        0x0000_7FFF_8000_0000,
        0x0000_0100_0000_0000,
    ];

    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Next handle. May repeat an earlier one.
    pub fn next_handle(&mut self) -> u64 {
        let bits = self.rng.next_u64();
        let region = Self::REGIONS[(bits >> 62) as usize];
        region + ((bits & 0x0FFF_FFFF) << 4)
    }

    /// `n` distinct handles in generation order.
    pub fn distinct(&mut self, n: usize) -> Vec<u64> {
        let mut seen = IndexSet::with_capacity(n);
        while seen.len() < n {
            seen.insert(self.next_handle());
        }
        seen.into_iter().collect()
    }

    /// Uniform value in `0..bound`.
    pub fn below(&mut self, bound: u64) -> u64 {
        self.rng.next_u64() % bound
    }
}

/// Deterministic `size`-byte record derived from `seed`.
pub fn record_bytes(seed: u64, size: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bytes = vec![0u8; size];
    rng.fill_bytes(&mut bytes);
    bytes
}
