#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds world events into an outcome tally.

mod metrics;

use serde::{Deserialize, Serialize};
use shoko_rocket_core::{ArrowWear, DeathCause, Event, WalkerKind};

pub use metrics::{arrow_destruction_rate_bps, rescue_rate_bps};

/// Running totals describing how a level played out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    /// Mice placed into the world.
    pub mice_added: u32,
    /// Cats placed into the world.
    pub cats_added: u32,
    /// Mice that boarded a rocket.
    pub mice_rescued: u32,
    /// Mice eaten by cats.
    pub mice_eaten: u32,
    /// Mice that fell down a hole.
    pub mice_in_holes: u32,
    /// Cats that fell down a hole.
    pub cats_in_holes: u32,
    /// Cats that ran into a rocket.
    pub cats_on_rockets: u32,
    /// Arrow hits by cats, including the final one.
    pub arrows_worn: u32,
    /// Arrows worn out completely.
    pub arrows_destroyed: u32,
    /// Simulated milliseconds observed since the last reset.
    pub elapsed_ms: u64,
    /// End of the tick in which the first mouse was rescued.
    pub first_rescue_ms: Option<u64>,
    /// End of the tick in which the world failed.
    pub failed_at_ms: Option<u64>,
}

impl Tally {
    /// Mice that died for any reason.
    #[must_use]
    pub fn mice_lost(&self) -> u32 {
        self.mice_eaten + self.mice_in_holes
    }

    /// Cats that died for any reason.
    #[must_use]
    pub fn cats_lost(&self) -> u32 {
        self.cats_in_holes + self.cats_on_rockets
    }

    /// Reports whether the world has failed during the observed run.
    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed_at_ms.is_some()
    }
}

/// Pure analytics system that accumulates a [`Tally`] from the world event stream.
#[derive(Debug, Default)]
pub struct Analytics {
    tally: Tally,
    pending_ms: u64,
}

impl Analytics {
    /// Creates a new analytics system with an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current totals.
    #[must_use]
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Consumes events emitted by the world while processing one command.
    ///
    /// Timestamps recorded for rescues and failures refer to the end of the
    /// batch's tick, since the world reports outcomes in between sub-steps
    /// without their exact time.
    pub fn handle(&mut self, events: &[Event]) {
        self.pending_ms = self.tally.elapsed_ms;
        for event in events {
            if let Event::TimeAdvanced { timespan_ms } = event {
                self.pending_ms += u64::from(*timespan_ms);
            }
        }

        for event in events {
            self.observe(event);
        }
        self.tally.elapsed_ms = self.pending_ms;
    }

    fn observe(&mut self, event: &Event) {
        let tally = &mut self.tally;
        match event {
            Event::WalkerAdded { kind, .. } => match kind {
                WalkerKind::Mouse => tally.mice_added += 1,
                WalkerKind::Cat => tally.cats_added += 1,
            },
            Event::MouseRescued { .. } => {
                tally.mice_rescued += 1;
                let _ = tally.first_rescue_ms.get_or_insert(self.pending_ms);
            }
            Event::MouseKilled { cause, .. } => match cause {
                DeathCause::Cat => tally.mice_eaten += 1,
                DeathCause::Hole | DeathCause::Rocket => tally.mice_in_holes += 1,
            },
            Event::CatKilled { cause, .. } => match cause {
                DeathCause::Rocket => tally.cats_on_rockets += 1,
                DeathCause::Hole | DeathCause::Cat => tally.cats_in_holes += 1,
            },
            Event::ArrowWorn { arrow, .. } => {
                tally.arrows_worn += 1;
                if arrow.wear() == ArrowWear::Destroyed {
                    tally.arrows_destroyed += 1;
                }
            }
            Event::WorldFailed => {
                let _ = tally.failed_at_ms.get_or_insert(self.pending_ms);
            }
            Event::WorldReset => {
                let (mice_added, cats_added) = (tally.mice_added, tally.cats_added);
                *tally = Tally {
                    mice_added,
                    cats_added,
                    ..Tally::default()
                };
                self.pending_ms = 0;
            }
            Event::GridConfigured { .. } => {
                *tally = Tally::default();
                self.pending_ms = 0;
            }
            Event::TimeAdvanced { .. } | Event::PlacementRejected { .. } => {}
        }
    }
}
