//! Seeded random stream shared by floor generation and room side effects.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

/// Deterministic random stream for one floor.
///
/// All graph growth, tile and enemy placement, and reward rolls draw from
/// this single stream, so a stored seed replays the whole floor.
pub struct FloorRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl FloorRng {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `0..bound`. Returns 0 when `bound` is 0.
    pub fn range(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        (self.rng.next_u64() % u64::from(bound)) as u32
    }

    pub fn range_usize(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.rng.next_u64() % bound as u64) as usize
    }

    /// True with the given percent chance (0 never, 100 always).
    pub fn percent(&mut self, chance: u32) -> bool {
        self.range(100) < chance
    }

    /// Uniform draw in `low..=high` pixels.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        if high <= low {
            return low;
        }
        let unit = (self.rng.next_u64() >> 11) as f32 / (1u64 << 53) as f32;
        low + unit * (high - low)
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for index in (1..items.len()).rev() {
            let other = self.range_usize(index + 1);
            items.swap(index, other);
        }
    }

    /// Index draw proportional to `weights`. `None` when the table is empty
    /// or every weight is zero.
    pub fn weighted(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&weight| u64::from(weight)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.rng.next_u64() % total;
        for (index, &weight) in weights.iter().enumerate() {
            let weight = u64::from(weight);
            if roll < weight {
                return Some(index);
            }
            roll -= weight;
        }
        None
    }
}

/// Best-effort entropy for runs launched without an explicit seed.
pub fn entropy_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());

    let mut mixed = (now_nanos as u64) ^ ((now_nanos >> 64) as u64) ^ pid.rotate_left(17);
    mixed ^= mixed >> 30;
    mixed = mixed.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    mixed ^= mixed >> 27;
    mixed = mixed.wrapping_mul(0x94D0_49BB_1331_11EB);
    mixed ^ (mixed >> 31)
}
