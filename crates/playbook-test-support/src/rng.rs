//! Test RNG: deterministic `DeterministicRng` implementations for tests.

use playbook_core::rng::DeterministicRng;

/// Always answers `min`, so a voice renders with its first opener.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// Replays scripted values, clamped into each requested range. Picks a
/// specific opener in tests. Panics once the script runs out.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Script the values to replay, in order.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val.clamp(min, max.max(min))
    }
}
