//! Injectable randomness for mutation decisions.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the coin flips and index picks made while mutating.
pub trait RandomSource: Send + Sync {
    /// True with the given probability, clamped to `[0, 1]`.
    fn chance(&self, probability: f64) -> bool;

    /// Uniform index in `0..len`. Callers never pass zero.
    fn index(&self, len: usize) -> usize;
}

/// Thread-local entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn chance(&self, probability: f64) -> bool {
        rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible sequence from a fixed seed.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn chance(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..len)
    }
}

/// Fixed answers: either always or never triggers, and always picks the
/// same index (clamped to the last valid position).
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    trigger: bool,
    index: usize,
}

impl FixedRandom {
    pub fn always(index: usize) -> Self {
        Self {
            trigger: true,
            index,
        }
    }

    pub fn never() -> Self {
        Self {
            trigger: false,
            index: 0,
        }
    }
}

impl RandomSource for FixedRandom {
    fn chance(&self, _probability: f64) -> bool {
        self.trigger
    }

    fn index(&self, len: usize) -> usize {
        self.index.min(len.saturating_sub(1))
    }
}
