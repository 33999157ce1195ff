//! Thread-safe seeded random number generation.
//!
//! One `Sampler` serves deal shuffling, outcome sampling in MC-CFR, and
//! equity rollouts. The generator sits behind a mutex so a single
//! instance can be shared across training threads; the solver takes an
//! injected `Arc<Sampler>` rather than a process-wide singleton so runs
//! are reproducible under a fixed seed.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub struct Sampler {
    rng: Mutex<StdRng>,
}

impl Sampler {
    /// A sampler seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// A sampler with a fixed seed for reproducible runs.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Uniform integer in `[min, max]` (inclusive).
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    #[must_use]
    pub fn int(&self, min: i64, max: i64) -> i64 {
        self.lock().gen_range(min..=max)
    }

    /// Uniform double in `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics if `min >= max`.
    #[must_use]
    pub fn double(&self, min: f64, max: f64) -> f64 {
        self.lock().gen_range(min..max)
    }

    /// Bernoulli draw with success probability `p` (clamped to `[0, 1]`).
    #[must_use]
    pub fn bool(&self, p: f64) -> bool {
        self.lock().gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&self, items: &mut [T]) {
        items.shuffle(&mut *self.lock());
    }

    /// Sample an index from a discrete distribution of non-negative
    /// weights, renormalising implicitly.
    ///
    /// Returns `None` when the slice is empty or carries no positive mass.
    #[must_use]
    pub fn sample_weighted(&self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|&&w| w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let draw = self.lock().gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            if w > 0.0 {
                cumulative += w;
                if draw < cumulative {
                    return Some(i);
                }
            }
        }
        // Rounding at the top of the range: fall back to the last
        // positive-weight entry.
        weights.iter().rposition(|&w| w > 0.0)
    }

    /// Sample uniformly from a slice. Returns `None` on an empty slice.
    #[must_use]
    pub fn sample_uniform<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}
