//! Shared test mocks and utilities for the PlayBook engine.

mod clock;
mod fixtures;
mod generator;
mod repository;
mod rng;

pub use clock::{FixedClock, ManualClock};
pub use fixtures::{TINY_STORY, tiny_story};
pub use generator::{FailingGenerator, RecordingGenerator, SlowGenerator};
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
pub use rng::{MockRng, SequenceRng};
