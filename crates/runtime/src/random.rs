use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Injectable source of uniform randomness.
///
/// Animation code never reaches for a global RNG; hosts hand one of these in
/// so runs can be reproduced from a seed or scripted outright in tests.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[lo, hi)`; returns `lo` for an empty range.
    fn uniform_ms(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        let span = (hi - lo) as f64;
        let offset = (self.next_unit() * span).floor() as u64;
        lo + offset.min(hi - lo - 1)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    fn bernoulli(&mut self, p: f64) -> bool {
        self.next_unit() < p.clamp(0.0, 1.0)
    }
}

/// Seedable pseudo-random source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed script of unit samples, then repeats the fallback value.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    script: VecDeque<f64>,
    fallback: f64,
}

impl SequenceRandom {
    pub fn new(script: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// Always returns `value`.
    pub fn constant(value: f64) -> Self {
        Self::new([], value)
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        self.script
            .pop_front()
            .unwrap_or(self.fallback)
            .clamp(0.0, 1.0 - f64::EPSILON)
    }
}
