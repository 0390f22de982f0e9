//! Random-draw capability for the probabilistic combat gates.
//!
//! The engine consumes a single injected source producing uniform draws in
//! `[0, 1)`, one per gate (hit, crit, guard). All implementations must be
//! deterministic given the same seed so an engagement can be replayed
//! draw-for-draw in tests.

/// Uniform random draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Next draw scaled to a percentage in `[0, 100)`.
    ///
    /// Common shape for the hit/crit/guard gates, which compare against a
    /// percentage chance.
    fn percent(&mut self) -> f64 {
        self.next_f64() * 100.0
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR produces 32-bit output from 64-bit state with a single
/// multiply, xorshift, and rotate. Deterministic, small, and statistically
/// solid, which is all a combat replay needs.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        // One warm-up step decorrelates adjacent small seeds.
        Self {
            state: Self::pcg_step(seed),
        }
    }

    /// Advance the PCG state by one LCG step:
    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) / (1.0 + f64::EPSILON)
    }
}

/// Compute a deterministic per-action seed from engagement components.
///
/// Combines the engagement seed, the action sequence number, and the acting
/// combatant so every skill invocation draws from an independent stream.
pub fn compute_seed(engagement_seed: u64, action_nonce: u64, actor_id: u32) -> u64 {
    // SplitMix64/FxHash-style mix combiners with a final avalanche step.
    let mut hash = engagement_seed;
    hash ^= action_nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(actor_id).wrapping_mul(0x517cc1b727220a95);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Scripted draw sequence for deterministic tests.
///
/// Yields the provided draws in order, then repeats the final draw forever
/// (an exhausted script is a test authoring mistake, not a runtime error).
#[derive(Clone, Debug, Default)]
pub struct SequenceRng {
    draws: Vec<f64>,
    next: usize,
}

impl SequenceRng {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            next: 0,
        }
    }

    /// A source that always returns the same draw.
    pub fn constant(draw: f64) -> Self {
        Self::new(vec![draw])
    }
}

impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        let Some(&draw) = self.draws.get(self.next).or(self.draws.last()) else {
            return 0.0;
        };
        if self.next < self.draws.len() {
            self.next += 1;
        }
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rng_is_deterministic() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn seeded_rng_draws_in_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let draw = rng.next_f64();
            assert!((0.0..1.0).contains(&draw));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let same = (0..8).filter(|_| a.next_u32() == b.next_u32()).count();
        assert!(same < 8);
    }

    #[test]
    fn compute_seed_separates_actions() {
        let base = compute_seed(99, 0, 1);
        assert_ne!(base, compute_seed(99, 1, 1));
        assert_ne!(base, compute_seed(99, 0, 2));
        assert_eq!(base, compute_seed(99, 0, 1));
    }

    #[test]
    fn sequence_rng_repeats_last_draw() {
        let mut rng = SequenceRng::new(vec![0.1, 0.9]);
        assert_eq!(rng.next_f64(), 0.1);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.9);
        assert_eq!(rng.next_f64(), 0.9);
    }

    #[test]
    fn empty_sequence_rng_is_total() {
        let mut rng = SequenceRng::default();
        assert_eq!(rng.next_f64(), 0.0);
    }
}
