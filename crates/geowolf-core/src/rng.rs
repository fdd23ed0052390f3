//! Random number generator abstraction for determinism.
//!
//! Mission selection and vote tie-breaking both draw uniformly from a
//! candidate list. In production this wraps the thread RNG; tests inject a
//! scripted implementation.

use rand::Rng;

/// Abstraction over uniform random selection.
pub trait GameRng: Send {
    /// Pick a uniform random index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Production RNG backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct ThreadRng;

impl GameRng for ThreadRng {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}
