//! Deterministic PRNG based on the Xorshift64 algorithm.
//!
//! Every random decision in a flow-art generation pass (zone placement, seed
//! placement, thickness and color draws, rendering jitter) comes from an
//! instance of [`Xorshift64`], so the same seed reproduces the same image.
//! There is no global state: two instances with equal seeds produce equal
//! sequences.

use serde::{Deserialize, Serialize};

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the standard shift parameters (13, 7, 17). The seed is passed through
/// a splitmix64 finalizer first, so small adjacent seeds (1, 2, 3, ...) start
/// from well separated states instead of near-zero ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Fallback state used when seed scrambling lands on 0, which is a fixed
    /// point of the xorshift algorithm.
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        let state = splitmix64(seed);
        Self {
            state: if state == 0 { Self::FALLBACK_SEED } else { state },
        }
    }

    /// Creates a PRNG from a 32-bit user-facing seed.
    pub fn from_seed32(seed: u32) -> Self {
        Self::new(u64::from(seed))
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns the upper 32 bits of the next value.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Returns a uniformly distributed f64 in [0, 1).
    ///
    /// Uses the upper 53 bits of `next_u64()` divided by 2^53 for
    /// full mantissa precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Returns a uniformly distributed angle in [0, 2π).
    pub fn next_angle(&mut self) -> f64 {
        self.next_f64() * std::f64::consts::TAU
    }

    /// Returns a uniformly distributed usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0 (division by zero in modulo).
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Picks one entry by cumulative weight.
    ///
    /// Draws `r` in [0, total weight) and returns the first entry whose
    /// running weight sum exceeds `r`. If rounding leaves `r` unconsumed the
    /// last entry is returned. Returns `None` only for an empty slice.
    pub fn choose_weighted<'a, T>(
        &mut self,
        entries: &'a [T],
        weight: impl Fn(&T) -> f64,
    ) -> Option<&'a T> {
        let last = entries.last()?;
        let total: f64 = entries.iter().map(|e| weight(e).max(0.0)).sum();
        let r = self.next_f64() * total;
        let mut cumulative = 0.0;
        for entry in entries {
            cumulative += weight(entry).max(0.0);
            if r < cumulative {
                return Some(entry);
            }
        }
        Some(last)
    }
}

/// splitmix64 output function, used to decorrelate nearby seeds.
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
