//! Test RNG — deterministic `GameRng` implementations for tests.

use geowolf_core::rng::GameRng;

/// An RNG that always picks the first candidate. Suitable for tests that do
/// not depend on a specific random outcome.
#[derive(Debug, Default)]
pub struct MockRng;

impl GameRng for MockRng {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}

/// An RNG that returns indices from a predetermined sequence. Panics if the
/// sequence is exhausted. Used in tests that need specific, repeatable
/// outcomes (mission draws, tie-break executions).
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<usize>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given index sequence.
    #[must_use]
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, index: 0 }
    }
}

impl GameRng for SequenceRng {
    fn pick(&mut self, len: usize) -> usize {
        let value = self.values[self.index];
        self.index += 1;
        assert!(value < len, "scripted index {value} out of range 0..{len}");
        value
    }
}
