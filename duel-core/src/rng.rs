//! Seeded duel RNG
//!
//! A 32-bit mixing generator (mulberry32). Every random decision in a duel
//! is drawn from one `DuelRng`, so the whole resolution replays exactly
//! from its seed.

use rand::{Error, RngCore, SeedableRng};

/// Additive constant advancing the state on every draw
const GOLDEN_STEP: u32 = 0x6D2B_79F5;

/// 2^32 as a float, for normalizing draws into [0, 1)
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic, non-cryptographic generator for combat resolution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuelRng {
    state: u32,
}

impl DuelRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit output
    pub fn next_raw(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_STEP);
        let mut z = self.state;
        z = (z ^ (z >> 15)).wrapping_mul(z | 1);
        z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(z | 61));
        z ^ (z >> 14)
    }

    /// Next draw in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_raw()) / TWO_POW_32
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "cannot pick from an empty pool");
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// d100 roll in `1..=100`
    pub fn roll_percent(&mut self) -> u32 {
        (self.next_f64() * 100.0) as u32 + 1
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl RngCore for DuelRng {
    fn next_u32(&mut self) -> u32 {
        self.next_raw()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_raw());
        let lo = u64::from(self.next_raw());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_raw().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for DuelRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}
