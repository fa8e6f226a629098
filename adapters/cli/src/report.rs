//! Summary of a finished run, printable as text or JSON.

use std::fmt;

use serde::Serialize;
use shoko_rocket_core::{Direction, WalkerKind, WalkerState, WorldState};
use shoko_rocket_system_analytics::{rescue_rate_bps, Tally};
use shoko_rocket_world::{query, World};

/// Outcome of playing a scenario.
#[derive(Debug, Serialize)]
pub(crate) struct RunReport {
    level: String,
    author: String,
    state: WorldState,
    solved: bool,
    elapsed_ms: u64,
    rescue_rate_bps: Option<u32>,
    tally: Tally,
    walkers: Vec<WalkerReport>,
}

#[derive(Debug, Serialize)]
struct WalkerReport {
    id: u32,
    kind: WalkerKind,
    state: WalkerState,
    x: i32,
    y: i32,
    direction: Direction,
}

impl RunReport {
    /// Captures the final world state together with the analytics tally.
    pub(crate) fn capture(world: &World, tally: &Tally) -> Self {
        let walkers = query::walker_view(world)
            .iter()
            .map(|snapshot| WalkerReport {
                id: snapshot.id.get(),
                kind: snapshot.kind,
                state: snapshot.state,
                x: snapshot.position.x(),
                y: snapshot.position.y(),
                direction: snapshot.direction,
            })
            .collect();

        Self {
            level: world.level().name.clone(),
            author: world.level().author.clone(),
            state: world.state(),
            solved: query::is_solved(world),
            elapsed_ms: world.elapsed_ms(),
            rescue_rate_bps: rescue_rate_bps(tally),
            tally: tally.clone(),
            walkers,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} by {}", self.level, self.author)?;
        let verdict = if self.solved {
            "solved"
        } else if self.state == WorldState::Failed {
            "failed"
        } else {
            "in progress"
        };
        writeln!(f, "  outcome: {verdict} after {}ms", self.elapsed_ms)?;
        writeln!(
            f,
            "  mice: {} rescued, {} eaten, {} in holes (of {})",
            self.tally.mice_rescued,
            self.tally.mice_eaten,
            self.tally.mice_in_holes,
            self.tally.mice_added
        )?;
        writeln!(
            f,
            "  cats: {} in holes, {} on rockets (of {})",
            self.tally.cats_in_holes, self.tally.cats_on_rockets, self.tally.cats_added
        )?;
        writeln!(
            f,
            "  arrows: {} hits, {} destroyed",
            self.tally.arrows_worn, self.tally.arrows_destroyed
        )?;
        for walker in &self.walkers {
            writeln!(
                f,
                "  #{} {:?} {:?} at ({}, {}) heading {:?}",
                walker.id, walker.kind, walker.state, walker.x, walker.y, walker.direction
            )?;
        }
        Ok(())
    }
}
