//! Small deterministic random source for game setup

use std::time::{SystemTime, UNIX_EPOCH};

const FALLBACK_SEED: u32 = 0xDEAD_BEEF;

/// xorshift32 generator
///
/// Not suitable for anything but gameplay. A zero seed is replaced because
/// zero is a fixed point of the generator.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { FALLBACK_SEED } else { seed },
        }
    }

    /// Seed from the wall clock
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(FALLBACK_SEED);
        Self::new(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    /// Uniform in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Uniform in [0, bound); `bound` must be non-zero
    pub fn below(&mut self, bound: usize) -> usize {
        ((self.next_u32() as u64 * bound as u64) >> 32) as usize
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
