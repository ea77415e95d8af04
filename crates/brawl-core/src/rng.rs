//! Random number generator abstraction for determinism.
//!
//! In production, this wraps the thread-local RNG. In tests a seeded or
//! scripted implementation is injected.

use rand::Rng;

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Fair coin flip.
    fn coin_flip(&mut self) -> bool {
        self.next_u32_range(0, 1) == 1
    }
}

/// Production RNG backed by `rand`'s thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRng;

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        rand::rng().random_range(min..=max)
    }
}
