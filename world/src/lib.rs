#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Shoko Rocket.

mod grid;
mod scheduler;
mod walker;

use log::{debug, trace, warn};
use shoko_rocket_core::{
    Arrow, Command, DeathCause, Direction, Event, LevelInfo, PlacementError, SquareType,
    Vector2i, WalkerId, WalkerKind, WalkerState, WorldState, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
use thiserror::Error;

pub use grid::Grid;
pub use scheduler::StepScheduler;
pub use walker::{Walker, WalkerHandle};

use grid::Navigator;

/// Errors reported by world operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// A walker was placed or moved outside `[0, width) x [0, height)`.
    #[error("position {position:?} lies outside the {width}x{height} grid")]
    PlacementOutOfBounds {
        /// Requested cell.
        position: Vector2i,
        /// Grid width at the time of the request.
        width: u32,
        /// Grid height at the time of the request.
        height: u32,
    },
    /// A tick was requested for zero milliseconds.
    #[error("tick timespan must be at least one millisecond")]
    InvalidTimespan,
    /// The grid dimensions are zero or too large to address.
    #[error("grid dimensions {width}x{height} are not supported")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

/// Represents the authoritative Shoko Rocket world state.
///
/// Walkers live in a single arena indexed by [`WalkerId`]; the live, dead and
/// rescued collections are views over that arena filtered by walker state, so
/// moving a walker between them never invalidates an identifier.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    walkers: Vec<Walker>,
    state: WorldState,
    elapsed_ms: u64,
    level: LevelInfo,
}

impl World {
    /// Creates the stock 12x9 play field with a walled seam and no walkers.
    #[must_use]
    pub fn new() -> Self {
        match Self::bounded(DEFAULT_WIDTH, DEFAULT_HEIGHT) {
            Ok(world) => world,
            Err(error) => unreachable!("default dimensions are valid: {error}"),
        }
    }

    /// Creates a world with no walls at all.
    pub fn open(width: u32, height: u32) -> Result<Self, WorldError> {
        Grid::open(width, height).map(Self::from_grid)
    }

    /// Creates a world whose wraparound seam is walled on both axes.
    pub fn bounded(width: u32, height: u32) -> Result<Self, WorldError> {
        Grid::bounded(width, height).map(Self::from_grid)
    }

    /// Wraps an existing grid in a world without walkers.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            walkers: Vec::new(),
            state: WorldState::Ok,
            elapsed_ms: 0,
            level: LevelInfo::default(),
        }
    }

    /// Wall and square layout.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable wall and square layout, for editing between ticks.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// Aggregate outcome of the current run.
    #[must_use]
    pub fn state(&self) -> WorldState {
        self.state
    }

    /// Simulated milliseconds since creation or the last reset.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Level metadata.
    #[must_use]
    pub fn level(&self) -> &LevelInfo {
        &self.level
    }

    /// Replaces the level metadata.
    pub fn set_level(&mut self, level: LevelInfo) {
        self.level = level;
    }

    /// Places `walker` into the world as a mouse.
    pub fn add_mouse(&mut self, walker: Walker) -> Result<WalkerId, WorldError> {
        self.add_walker(walker.with_kind(WalkerKind::Mouse))
    }

    /// Places `walker` into the world as a cat.
    pub fn add_cat(&mut self, walker: Walker) -> Result<WalkerId, WorldError> {
        self.add_walker(walker.with_kind(WalkerKind::Cat))
    }

    /// Places `walker` into the world, keeping its species.
    ///
    /// The walker turns away from any wall it faces, and the resulting position
    /// and heading become its reset target.
    pub fn add_walker(&mut self, mut walker: Walker) -> Result<WalkerId, WorldError> {
        let position = walker.position();
        if !self.grid.contains(position) {
            return Err(WorldError::PlacementOutOfBounds {
                position,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }

        walker.set_direction(self.grid.resolve_heading(position, walker.direction()));
        walker.anchor();
        let id = WalkerId::new(self.walkers.len() as u32);
        debug!(
            "{:?} {} placed at {:?} heading {:?}",
            walker.kind(),
            id.get(),
            position,
            walker.direction()
        );
        self.walkers.push(walker);
        Ok(id)
    }

    /// Read access to a walker.
    #[must_use]
    pub fn walker(&self, id: WalkerId) -> Option<&Walker> {
        self.walkers.get(id.get() as usize)
    }

    /// Mutable access to a walker bound to this world's grid.
    pub fn walker_mut(&mut self, id: WalkerId) -> Option<WalkerHandle<'_>> {
        let walker = self.walkers.get_mut(id.get() as usize)?;
        Some(WalkerHandle::new(walker, &mut self.grid))
    }

    /// Iterator over every walker ever placed, in placement order.
    pub fn walkers(&self) -> impl Iterator<Item = (WalkerId, &Walker)> {
        self.walkers
            .iter()
            .enumerate()
            .map(|(index, walker)| (WalkerId::new(index as u32), walker))
    }

    /// Advances the simulation by `timespan_ms`, discarding events.
    pub fn tick(&mut self, timespan_ms: u32) -> Result<(), WorldError> {
        let mut events = Vec::new();
        self.tick_with_events(timespan_ms, &mut events)
    }

    /// Advances the simulation by `timespan_ms`, appending everything that
    /// happened to `out_events`.
    pub fn tick_with_events(
        &mut self,
        timespan_ms: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        if timespan_ms == 0 {
            return Err(WorldError::InvalidTimespan);
        }

        out_events.push(Event::TimeAdvanced { timespan_ms });
        // Catches walkers placed onto squares or cats since the last tick.
        self.resolve(None, out_events);

        let mut scheduler = StepScheduler::new(timespan_ms);
        let mut before: Vec<(Vector2i, Direction)> = Vec::with_capacity(self.walkers.len());
        let mut worn: Vec<(Vector2i, Arrow)> = Vec::new();
        while let Some(step) = scheduler.next_step(&self.walkers) {
            trace!("sub-step of {step}ms, {}ms left", scheduler.remaining());
            before.clear();
            before.extend(
                self.walkers
                    .iter()
                    .map(|walker| (walker.position(), walker.direction())),
            );

            {
                let mut navigator = Navigator::new(&mut self.grid, &mut worn);
                for walker in &mut self.walkers {
                    walker.advance_through(step, &mut navigator);
                }
            }

            grid::publish_worn(&mut worn, out_events);
            self.resolve(Some(before.as_slice()), out_events);
        }

        self.elapsed_ms = self.elapsed_ms.saturating_add(u64::from(timespan_ms));
        Ok(())
    }

    /// Restores every walker to its placement state, repairs all arrows and
    /// clears the failed flag. Walls and square layout are untouched.
    pub fn reset(&mut self) {
        for walker in &mut self.walkers {
            walker.reset();
        }
        self.grid.restore_arrows();
        self.state = WorldState::Ok;
        self.elapsed_ms = 0;
        debug!("world reset with {} walkers", self.walkers.len());
    }

    /// Collects every life-cycle transition implied by the current positions,
    /// then applies them in arena order.
    ///
    /// Squares take precedence over cats: a mouse stepping onto a rocket or a
    /// hole is rescued or lost to the hole even if a cat arrives alongside it.
    /// `before` holds positions and headings from the start of the sub-step
    /// and is used to catch a mouse and a cat that swapped cells head-on.
    fn resolve(
        &mut self,
        before: Option<&[(Vector2i, Direction)]>,
        out_events: &mut Vec<Event>,
    ) {
        let mut transitions: Vec<Transition> = Vec::new();
        for (index, walker) in self.walkers.iter().enumerate() {
            if !walker.is_alive() {
                continue;
            }

            let outcome = match (walker.kind(), self.grid.square(walker.position())) {
                (WalkerKind::Mouse, SquareType::Hole) => Some(Outcome::Killed(DeathCause::Hole)),
                (WalkerKind::Mouse, SquareType::Rocket) => Some(Outcome::Rescued),
                (WalkerKind::Cat, SquareType::Hole) => Some(Outcome::Killed(DeathCause::Hole)),
                (WalkerKind::Cat, SquareType::Rocket) => {
                    Some(Outcome::Killed(DeathCause::Rocket))
                }
                (WalkerKind::Mouse, _) if self.caught(index, before) => {
                    Some(Outcome::Killed(DeathCause::Cat))
                }
                _ => None,
            };

            if let Some(outcome) = outcome {
                transitions.push(Transition { index, outcome });
            }
        }

        for transition in transitions {
            self.apply_transition(transition, out_events);
        }
    }

    fn caught(&self, mouse_index: usize, before: Option<&[(Vector2i, Direction)]>) -> bool {
        let mouse = &self.walkers[mouse_index];
        self.walkers
            .iter()
            .enumerate()
            .filter(|(_, cat)| cat.kind() == WalkerKind::Cat && cat.is_alive())
            .any(|(cat_index, cat)| {
                if cat.position() == mouse.position() {
                    return true;
                }
                // Walkers chasing in file round a two-cell loop also trade
                // cells, so only opposite headings count as a crossing.
                before.is_some_and(|before| {
                    let (cat_from, cat_heading) = before[cat_index];
                    let (mouse_from, mouse_heading) = before[mouse_index];
                    cat_from == mouse.position()
                        && mouse_from == cat.position()
                        && cat_heading == mouse_heading.opposite()
                })
            })
    }

    fn apply_transition(&mut self, transition: Transition, out_events: &mut Vec<Event>) {
        let walker = &mut self.walkers[transition.index];
        let id = WalkerId::new(transition.index as u32);
        let cell = walker.position();
        let kind = walker.kind();

        match transition.outcome {
            Outcome::Rescued => {
                walker.set_state(WalkerState::Rescued);
                debug!("mouse {} rescued at {cell:?}", id.get());
                out_events.push(Event::MouseRescued { walker: id, cell });
            }
            Outcome::Killed(cause) => {
                walker.set_state(WalkerState::Dead);
                debug!("{kind:?} {} killed at {cell:?} by {cause:?}", id.get());
                match kind {
                    WalkerKind::Mouse => {
                        out_events.push(Event::MouseKilled {
                            walker: id,
                            cell,
                            cause,
                        });
                        self.fail(out_events);
                    }
                    WalkerKind::Cat => {
                        out_events.push(Event::CatKilled {
                            walker: id,
                            cell,
                            cause,
                        });
                        if cause == DeathCause::Rocket {
                            self.fail(out_events);
                        }
                    }
                }
            }
        }
    }

    fn fail(&mut self, out_events: &mut Vec<Event>) {
        if self.state == WorldState::Failed {
            return;
        }
        self.state = WorldState::Failed;
        debug!("world failed after {}ms", self.elapsed_ms);
        out_events.push(Event::WorldFailed);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Rescued,
    Killed(DeathCause),
}

#[derive(Clone, Copy, Debug)]
struct Transition {
    index: usize,
    outcome: Outcome,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { width, height } => match Grid::open(width, height) {
            Ok(grid) => {
                let level = std::mem::take(&mut world.level);
                *world = World::from_grid(grid);
                world.level = level;
                out_events.push(Event::GridConfigured { width, height });
            }
            Err(error) => warn!("ignoring grid configuration: {error}"),
        },
        Command::SetWall {
            cell,
            side,
            present,
        } => world.grid.set_wall(cell, side, present),
        Command::SetSquare { cell, square } => world.grid.set_square(cell, square),
        Command::AddWalker { spawn } => match world.add_walker(Walker::from_spawn(spawn)) {
            Ok(walker) => out_events.push(Event::WalkerAdded {
                walker,
                kind: spawn.kind,
                position: spawn.position,
            }),
            Err(error) => {
                warn!("rejected {:?} placement: {error}", spawn.kind);
                out_events.push(Event::PlacementRejected {
                    kind: spawn.kind,
                    position: spawn.position,
                    reason: PlacementError::OutOfBounds,
                });
            }
        },
        Command::Tick { timespan_ms } => {
            if let Err(error) = world.tick_with_events(timespan_ms, out_events) {
                warn!("ignoring tick: {error}");
            }
        }
        Command::Reset => {
            world.reset();
            out_events.push(Event::WorldReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use shoko_rocket_core::{
        Direction, LevelInfo, SquareType, Vector2i, WalkerId, WalkerKind, WalkerState,
        WorldState,
    };

    use super::{Walker, World};

    /// Mice still running around.
    #[must_use]
    pub fn live_mice(world: &World) -> Vec<WalkerId> {
        select(world, WalkerKind::Mouse, WalkerState::Alive)
    }

    /// Mice that died.
    #[must_use]
    pub fn dead_mice(world: &World) -> Vec<WalkerId> {
        select(world, WalkerKind::Mouse, WalkerState::Dead)
    }

    /// Mice that boarded a rocket.
    #[must_use]
    pub fn rescued_mice(world: &World) -> Vec<WalkerId> {
        select(world, WalkerKind::Mouse, WalkerState::Rescued)
    }

    /// Cats still running around.
    #[must_use]
    pub fn live_cats(world: &World) -> Vec<WalkerId> {
        select(world, WalkerKind::Cat, WalkerState::Alive)
    }

    /// Cats that died.
    #[must_use]
    pub fn dead_cats(world: &World) -> Vec<WalkerId> {
        select(world, WalkerKind::Cat, WalkerState::Dead)
    }

    fn select(world: &World, kind: WalkerKind, state: WalkerState) -> Vec<WalkerId> {
        world
            .walkers()
            .filter(|(_, walker)| walker.kind() == kind && walker.state() == state)
            .map(|(id, _)| id)
            .collect()
    }

    /// Aggregate outcome of the current run.
    #[must_use]
    pub fn world_state(world: &World) -> WorldState {
        world.state()
    }

    /// Content of a cell, including arrow wear.
    #[must_use]
    pub fn special_square(world: &World, cell: Vector2i) -> SquareType {
        world.grid().square(cell)
    }

    /// Level metadata.
    #[must_use]
    pub fn level(world: &World) -> &LevelInfo {
        world.level()
    }

    /// Reports whether every mouse has left the board safely.
    ///
    /// A world without mice is never solved.
    #[must_use]
    pub fn is_solved(world: &World) -> bool {
        world.state() == WorldState::Ok
            && live_mice(world).is_empty()
            && !rescued_mice(world).is_empty()
    }

    /// Captures a read-only view of every walker for renderers and replays.
    #[must_use]
    pub fn walker_view(world: &World) -> WalkerView {
        WalkerView {
            snapshots: world
                .walkers()
                .map(|(id, walker)| WalkerSnapshot::capture(id, walker))
                .collect(),
        }
    }

    /// Read-only snapshot of all walkers in placement order.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct WalkerView {
        snapshots: Vec<WalkerSnapshot>,
    }

    impl WalkerView {
        /// Iterator over the captured snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &WalkerSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<WalkerSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single walker used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct WalkerSnapshot {
        /// Identifier allocated by the world.
        pub id: WalkerId,
        /// Species of the walker.
        pub kind: WalkerKind,
        /// Life-cycle state.
        pub state: WalkerState,
        /// Occupied cell.
        pub position: Vector2i,
        /// Current heading.
        pub direction: Direction,
        /// Progress towards the next cell.
        pub fraction: u32,
        /// Speed in fixed-point units per millisecond.
        pub speed: u32,
    }

    impl WalkerSnapshot {
        fn capture(id: WalkerId, walker: &Walker) -> Self {
            Self {
                id,
                kind: walker.kind(),
                state: walker.state(),
                position: walker.position(),
                direction: walker.direction(),
                fraction: walker.fraction(),
                speed: walker.speed(),
            }
        }
    }
}
