#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Shoko Rocket engine.
//!
//! This crate defines the value types and the message surface that connect
//! adapters, the authoritative world, and pure systems. Editors and level
//! loaders submit [`Command`] values describing desired mutations, the world
//! executes them via its `apply` entry point, and then broadcasts [`Event`]
//! values that systems (analytics, audio, animation) react to
//! deterministically.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Fixed-point units a walker must accumulate to traverse a single cell.
pub const FRACTION_RESET: u32 = 3_000_000;

/// Default mouse speed in fixed-point units per millisecond (one cell per second).
pub const MOUSE_SPEED: u32 = 3_000;

/// Default cat speed in fixed-point units per millisecond, two thirds of a mouse.
pub const CAT_SPEED: u32 = MOUSE_SPEED * 2 / 3;

/// Number of columns in the stock play field.
pub const DEFAULT_WIDTH: u32 = 12;

/// Number of rows in the stock play field.
pub const DEFAULT_HEIGHT: u32 = 9;

/// Integer coordinate of a grid cell.
///
/// Rows grow towards the south, columns grow towards the east. Components are
/// signed so detached walkers may wander off the grid without wrapping.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Vector2i {
    x: i32,
    y: i32,
}

impl Vector2i {
    /// The origin cell.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring coordinate one step in `direction`.
    ///
    /// [`Direction::Invalid`] leaves the coordinate unchanged.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let delta = direction.delta();
        Self::new(self.x + delta.x, self.y + delta.y)
    }
}

impl Add for Vector2i {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Compass heading of a walker or arrow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    #[default]
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// No heading; the walker is stationary.
    Invalid,
}

impl Direction {
    /// The four headings a walker can travel in, clockwise from north.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Heading after a quarter turn to the right.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
            Self::Invalid => Self::Invalid,
        }
    }

    /// Heading after a quarter turn to the left.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::East => Self::North,
            Self::South => Self::East,
            Self::West => Self::South,
            Self::Invalid => Self::Invalid,
        }
    }

    /// Heading pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::Invalid => Self::Invalid,
        }
    }

    /// Unit offset travelled per cell in this heading.
    #[must_use]
    pub const fn delta(self) -> Vector2i {
        match self {
            Self::North => Vector2i::new(0, -1),
            Self::East => Vector2i::new(1, 0),
            Self::South => Vector2i::new(0, 1),
            Self::West => Vector2i::new(-1, 0),
            Self::Invalid => Vector2i::ZERO,
        }
    }

    /// Reports whether the heading describes actual travel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Wear stage of an arrow. Cat traffic moves an arrow down one stage at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowWear {
    /// Freshly placed arrow.
    #[default]
    Full,
    /// Arrow damaged once by a cat.
    Half,
    /// Arrow worn out; it no longer redirects walkers.
    Destroyed,
}

impl ArrowWear {
    /// Next stage of decay. Destroyed arrows stay destroyed.
    #[must_use]
    pub const fn worn(self) -> Self {
        match self {
            Self::Full => Self::Half,
            Self::Half | Self::Destroyed => Self::Destroyed,
        }
    }
}

/// Directional arrow placed on a square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arrow {
    direction: Direction,
    wear: ArrowWear,
}

impl Arrow {
    /// Creates an arrow with the provided heading and wear stage.
    #[must_use]
    pub const fn new(direction: Direction, wear: ArrowWear) -> Self {
        Self { direction, wear }
    }

    /// Heading the arrow points in, regardless of wear.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Current wear stage.
    #[must_use]
    pub const fn wear(&self) -> ArrowWear {
        self.wear
    }

    /// Heading imposed on walkers entering the square, if the arrow still works.
    #[must_use]
    pub const fn redirect(&self) -> Option<Direction> {
        match self.wear {
            ArrowWear::Destroyed => None,
            ArrowWear::Full | ArrowWear::Half => Some(self.direction),
        }
    }

    /// Arrow after one more cat has run into it.
    #[must_use]
    pub const fn worn(self) -> Self {
        Self::new(self.direction, self.wear.worn())
    }

    /// Arrow restored to full strength.
    #[must_use]
    pub const fn restored(self) -> Self {
        Self::new(self.direction, ArrowWear::Full)
    }
}

/// Special content of a grid square. A square holds at most one kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquareType {
    /// Plain floor.
    #[default]
    Empty,
    /// Hole that swallows mice and cats.
    Hole,
    /// Rocket that rescues mice and is destroyed by cats.
    Rocket,
    /// Directional arrow.
    Arrow(Arrow),
}

impl SquareType {
    /// Convenience constructor for an arrow at the given wear stage.
    #[must_use]
    pub const fn arrow(direction: Direction, wear: ArrowWear) -> Self {
        Self::Arrow(Arrow::new(direction, wear))
    }
}

/// Species of a walker. Determines default speed and how it interacts with squares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkerKind {
    /// Mice try to reach rockets.
    Mouse,
    /// Cats eat mice and wreck arrows.
    Cat,
}

impl WalkerKind {
    /// Speed assigned to walkers of this kind unless overridden.
    #[must_use]
    pub const fn default_speed(self) -> u32 {
        match self {
            Self::Mouse => MOUSE_SPEED,
            Self::Cat => CAT_SPEED,
        }
    }
}

/// Life-cycle state of a walker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkerState {
    /// Still moving around the grid.
    #[default]
    Alive,
    /// Fell down a hole, was eaten, or (for cats) ran into a rocket.
    Dead,
    /// Mouse that boarded a rocket.
    Rescued,
}

/// Aggregate outcome of the current simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldState {
    /// Nothing has gone wrong yet.
    #[default]
    Ok,
    /// A mouse died or a cat reached a rocket. Sticky until reset.
    Failed,
}

/// Reason a walker left the live population without being rescued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Walked into a hole.
    Hole,
    /// Cat walked into a rocket.
    Rocket,
    /// Mouse met a cat.
    Cat,
}

/// Stable identifier of a walker within its world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WalkerId(u32);

impl WalkerId {
    /// Creates a new walker identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Description of a walker to be placed into a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerSpawn {
    /// Species of the walker.
    pub kind: WalkerKind,
    /// Starting cell.
    pub position: Vector2i,
    /// Starting heading, subject to wall resolution on placement.
    pub direction: Direction,
    /// Speed override; `None` uses the species default.
    pub speed: Option<u32>,
}

impl WalkerSpawn {
    /// Mouse spawn with default speed.
    #[must_use]
    pub const fn mouse(position: Vector2i, direction: Direction) -> Self {
        Self {
            kind: WalkerKind::Mouse,
            position,
            direction,
            speed: None,
        }
    }

    /// Cat spawn with default speed.
    #[must_use]
    pub const fn cat(position: Vector2i, direction: Direction) -> Self {
        Self {
            kind: WalkerKind::Cat,
            position,
            direction,
            speed: None,
        }
    }
}

/// Reasons a walker placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies outside the configured grid.
    OutOfBounds,
}

/// Descriptive metadata attached to a level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    /// Display name of the level.
    pub name: String,
    /// Person who built the level.
    pub author: String,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Replaces the grid with an open grid of the given size and drops all walkers.
    ConfigureGrid {
        /// Number of columns.
        width: u32,
        /// Number of rows.
        height: u32,
    },
    /// Adds or removes the wall on one side of a cell.
    SetWall {
        /// Cell whose side is edited.
        cell: Vector2i,
        /// Side of the cell holding the wall.
        side: Direction,
        /// Whether the wall should be present.
        present: bool,
    },
    /// Places a special square, replacing whatever was there.
    SetSquare {
        /// Target cell.
        cell: Vector2i,
        /// New content of the cell.
        square: SquareType,
    },
    /// Places a walker into the world.
    AddWalker {
        /// Walker description.
        spawn: WalkerSpawn,
    },
    /// Advances the simulation clock.
    Tick {
        /// Elapsed simulated milliseconds.
        timespan_ms: u32,
    },
    /// Restores walkers, arrows and world state to their starting values.
    Reset,
}

/// Events broadcast by the world while processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated milliseconds covered by the tick.
        timespan_ms: u32,
    },
    /// Confirms that a walker was placed.
    WalkerAdded {
        /// Identifier allocated by the world.
        walker: WalkerId,
        /// Species of the walker.
        kind: WalkerKind,
        /// Cell the walker occupies.
        position: Vector2i,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Species requested.
        kind: WalkerKind,
        /// Requested cell.
        position: Vector2i,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// A mouse died.
    MouseKilled {
        /// Mouse that died.
        walker: WalkerId,
        /// Cell it died in.
        cell: Vector2i,
        /// What killed it.
        cause: DeathCause,
    },
    /// A mouse boarded a rocket.
    MouseRescued {
        /// Mouse that escaped.
        walker: WalkerId,
        /// Rocket cell.
        cell: Vector2i,
    },
    /// A cat died.
    CatKilled {
        /// Cat that died.
        walker: WalkerId,
        /// Cell it died in.
        cell: Vector2i,
        /// What killed it.
        cause: DeathCause,
    },
    /// A cat damaged an arrow.
    ArrowWorn {
        /// Arrow cell.
        cell: Vector2i,
        /// Arrow state after the damage.
        arrow: Arrow,
    },
    /// The world entered the failed state.
    WorldFailed,
    /// The grid was reconfigured.
    GridConfigured {
        /// Number of columns.
        width: u32,
        /// Number of rows.
        height: u32,
    },
    /// The world was reset to its starting state.
    WorldReset,
}

#[cfg(test)]
mod tests {
    use super::{
        Arrow, ArrowWear, Command, Direction, SquareType, Vector2i, WalkerKind, WalkerSpawn,
        CAT_SPEED, MOUSE_SPEED,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn rotations_cycle_through_cardinals() {
        for direction in Direction::CARDINALS {
            assert_eq!(direction.clockwise().counter_clockwise(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.clockwise().clockwise(), direction.opposite());
        }
        assert_eq!(Direction::North.clockwise(), Direction::East);
        assert_eq!(Direction::South.counter_clockwise(), Direction::East);
        assert_eq!(Direction::Invalid.opposite(), Direction::Invalid);
    }

    #[test]
    fn step_follows_screen_axes() {
        let origin = Vector2i::new(3, 3);
        assert_eq!(origin.step(Direction::North), Vector2i::new(3, 2));
        assert_eq!(origin.step(Direction::East), Vector2i::new(4, 3));
        assert_eq!(origin.step(Direction::South), Vector2i::new(3, 4));
        assert_eq!(origin.step(Direction::West), Vector2i::new(2, 3));
        assert_eq!(origin.step(Direction::Invalid), origin);
    }

    #[test]
    fn arrows_decay_monotonically() {
        let arrow = Arrow::new(Direction::West, ArrowWear::Full);
        let half = arrow.worn();
        let destroyed = half.worn();

        assert_eq!(half.wear(), ArrowWear::Half);
        assert_eq!(half.redirect(), Some(Direction::West));
        assert_eq!(destroyed.wear(), ArrowWear::Destroyed);
        assert_eq!(destroyed.redirect(), None);
        assert_eq!(destroyed.worn(), destroyed);
        assert_eq!(destroyed.restored(), arrow);
    }

    #[test]
    fn cats_are_two_thirds_of_mouse_speed() {
        assert_eq!(WalkerKind::Mouse.default_speed(), MOUSE_SPEED);
        assert_eq!(WalkerKind::Cat.default_speed() * 3, MOUSE_SPEED * 2);
        assert_eq!(CAT_SPEED, 2_000);
    }

    #[test]
    fn square_type_round_trips_through_bincode() {
        assert_round_trip(&SquareType::arrow(Direction::South, ArrowWear::Half));
        assert_round_trip(&SquareType::Rocket);
    }

    #[test]
    fn command_round_trips_through_bincode() {
        assert_round_trip(&Command::AddWalker {
            spawn: WalkerSpawn::cat(Vector2i::new(4, 5), Direction::East),
        });
        assert_round_trip(&Command::Tick { timespan_ms: 16 });
    }
}
