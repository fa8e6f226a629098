//! Splits a tick into sub-steps that end on cell boundaries.

use crate::Walker;

/// Hands out sub-step durations for a single tick.
///
/// Every sub-step ends no later than the first millisecond in which some
/// walker crosses into a new cell, so the world can resolve squares and
/// collisions between any two boundary crossings. Because crossings land on
/// the same millisecond however the total is partitioned, re-chunking a
/// duration into several ticks produces the same outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepScheduler {
    remaining: u32,
}

impl StepScheduler {
    /// Creates a scheduler covering `timespan_ms` milliseconds.
    #[must_use]
    pub const fn new(timespan_ms: u32) -> Self {
        Self {
            remaining: timespan_ms,
        }
    }

    /// Milliseconds not yet handed out.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Length of the next sub-step given the current walkers, or `None` once
    /// the tick is used up.
    pub fn next_step(&mut self, walkers: &[Walker]) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }

        let step = walkers
            .iter()
            .filter_map(Walker::time_to_boundary)
            .fold(self.remaining, u32::min);
        debug_assert!(step > 0, "sub-steps must make progress");
        self.remaining -= step;
        Some(step)
    }
}
