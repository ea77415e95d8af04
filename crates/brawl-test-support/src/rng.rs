//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use brawl_core::rng::DeterministicRng;

/// Always returns `min`, so every coin flip lands on `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// Returns values from a predetermined sequence, then repeats the last one.
/// An empty sequence behaves like [`MockRng`].
#[derive(Debug, Clone)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(last) = self.values.len().checked_sub(1) else {
            return min;
        };
        let value = self.values[self.index.min(last)];
        self.index += 1;
        value.clamp(min, max)
    }
}
