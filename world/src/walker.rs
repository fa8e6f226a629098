//! Mice and cats moving cell by cell.

use std::ops::Deref;

use shoko_rocket_core::{
    Arrow, Direction, Event, Vector2i, WalkerKind, WalkerSpawn, WalkerState, FRACTION_RESET,
};

use crate::{
    grid::{self, Navigator},
    Grid, WorldError,
};

/// Surface a walker travels over.
pub(crate) trait Terrain {
    /// Moves out of `from` along `heading` and returns the entered cell together
    /// with the heading the walker leaves it by.
    fn enter(
        &mut self,
        kind: WalkerKind,
        from: Vector2i,
        heading: Direction,
    ) -> (Vector2i, Direction);
}

/// Unbounded plane without walls used by walkers that are not part of a world.
struct OpenPlane;

impl Terrain for OpenPlane {
    fn enter(
        &mut self,
        _kind: WalkerKind,
        from: Vector2i,
        heading: Direction,
    ) -> (Vector2i, Direction) {
        (from.step(heading), heading)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Anchor {
    position: Vector2i,
    direction: Direction,
}

/// A single mouse or cat.
///
/// `fraction` counts fixed-point progress through the current cell transit and
/// always stays below [`FRACTION_RESET`]. Collision and square logic only ever
/// look at `position`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Walker {
    kind: WalkerKind,
    position: Vector2i,
    direction: Direction,
    fraction: u32,
    speed: Option<u32>,
    state: WalkerState,
    anchor: Option<Anchor>,
}

impl Walker {
    /// Creates a walker at the origin facing north.
    #[must_use]
    pub fn new(kind: WalkerKind) -> Self {
        Self {
            kind,
            position: Vector2i::ZERO,
            direction: Direction::North,
            fraction: 0,
            speed: None,
            state: WalkerState::Alive,
            anchor: None,
        }
    }

    /// Creates a mouse at the origin facing north.
    #[must_use]
    pub fn mouse() -> Self {
        Self::new(WalkerKind::Mouse)
    }

    /// Creates a cat at the origin facing north.
    #[must_use]
    pub fn cat() -> Self {
        Self::new(WalkerKind::Cat)
    }

    /// Creates a walker from a spawn description.
    #[must_use]
    pub fn from_spawn(spawn: WalkerSpawn) -> Self {
        let walker = Self::new(spawn.kind)
            .with_position(spawn.position)
            .with_direction(spawn.direction);
        match spawn.speed {
            Some(speed) => walker.with_speed(speed),
            None => walker,
        }
    }

    /// Moves the walker to `position`.
    #[must_use]
    pub fn with_position(mut self, position: Vector2i) -> Self {
        self.position = position;
        self
    }

    /// Points the walker in `direction`.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Overrides the species speed.
    #[must_use]
    pub fn with_speed(mut self, speed: u32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub(crate) fn with_kind(mut self, kind: WalkerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Species of the walker.
    #[must_use]
    pub const fn kind(&self) -> WalkerKind {
        self.kind
    }

    /// Cell currently occupied.
    #[must_use]
    pub const fn position(&self) -> Vector2i {
        self.position
    }

    /// Current heading.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Fixed-point progress towards the next cell.
    #[must_use]
    pub const fn fraction(&self) -> u32 {
        self.fraction
    }

    /// Speed in fixed-point units per millisecond.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        match self.speed {
            Some(speed) => speed,
            None => self.kind.default_speed(),
        }
    }

    /// Life-cycle state.
    #[must_use]
    pub const fn state(&self) -> WalkerState {
        self.state
    }

    /// Reports whether the walker still takes part in the simulation.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        matches!(self.state, WalkerState::Alive)
    }

    /// Moves the walker to `position` without touching its progress.
    pub fn set_position(&mut self, position: Vector2i) {
        self.position = position;
    }

    /// Points the walker in `direction`.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Overrides the species speed.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = Some(speed);
    }

    /// Interpolated position for drawing, measured in cells.
    #[must_use]
    pub fn render_position(&self) -> (f32, f32) {
        let progress = self.fraction as f32 / FRACTION_RESET as f32;
        let delta = self.direction.delta();
        (
            self.position.x() as f32 + delta.x() as f32 * progress,
            self.position.y() as f32 + delta.y() as f32 * progress,
        )
    }

    /// Advances a detached walker in a straight line, without walls or wrapping.
    pub fn advance(&mut self, timespan_ms: u32) {
        self.advance_through(timespan_ms, &mut OpenPlane);
    }

    /// Restores the position, heading and life recorded when the walker was
    /// placed into a world. A walker that was never placed keeps its position.
    pub fn reset(&mut self) {
        if let Some(anchor) = self.anchor {
            self.position = anchor.position;
            self.direction = anchor.direction;
        }
        self.fraction = 0;
        self.state = WalkerState::Alive;
    }

    /// Runs the advance algorithm over `terrain`.
    pub(crate) fn advance_through<T: Terrain>(&mut self, timespan_ms: u32, terrain: &mut T) {
        if !self.is_alive() || !self.direction.is_valid() {
            return;
        }

        let reset = u64::from(FRACTION_RESET);
        let mut fraction = u64::from(self.fraction) + u64::from(self.speed()) * u64::from(timespan_ms);
        while fraction >= reset {
            fraction -= reset;
            let (position, direction) = terrain.enter(self.kind, self.position, self.direction);
            self.position = position;
            self.direction = direction;
            if !direction.is_valid() {
                fraction = 0;
                break;
            }
        }

        debug_assert!(fraction < reset, "fraction escaped the cell transit range");
        self.fraction = fraction as u32;
    }

    /// Milliseconds until the next cell boundary, or `None` for a walker that
    /// is not moving.
    pub(crate) fn time_to_boundary(&self) -> Option<u32> {
        let speed = self.speed();
        if !self.is_alive() || !self.direction.is_valid() || speed == 0 {
            return None;
        }

        let remaining = u64::from(FRACTION_RESET - self.fraction);
        let speed = u64::from(speed);
        let millis = (remaining + speed - 1) / speed;
        Some(u32::try_from(millis).unwrap_or(u32::MAX))
    }

    /// Records the current position and heading as the reset target and clears
    /// any progress or life-cycle state carried in from elsewhere.
    pub(crate) fn anchor(&mut self) {
        self.fraction = 0;
        self.state = WalkerState::Alive;
        self.anchor = Some(Anchor {
            position: self.position,
            direction: self.direction,
        });
    }

    pub(crate) fn set_state(&mut self, state: WalkerState) {
        self.state = state;
    }
}

/// Mutable access to a walker that lives inside a world.
///
/// Movement through the handle follows the world's walls, arrows and
/// wraparound, and repositioning is checked against the grid bounds.
#[derive(Debug)]
pub struct WalkerHandle<'a> {
    walker: &'a mut Walker,
    grid: &'a mut Grid,
}

impl<'a> WalkerHandle<'a> {
    pub(crate) fn new(walker: &'a mut Walker, grid: &'a mut Grid) -> Self {
        Self { walker, grid }
    }

    /// Moves the walker to another cell of the grid.
    pub fn set_position(&mut self, position: Vector2i) -> Result<(), WorldError> {
        if !self.grid.contains(position) {
            return Err(WorldError::PlacementOutOfBounds {
                position,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        self.walker.set_position(position);
        Ok(())
    }

    /// Points the walker in `direction`.
    pub fn set_direction(&mut self, direction: Direction) {
        self.walker.set_direction(direction);
    }

    /// Overrides the species speed.
    pub fn set_speed(&mut self, speed: u32) {
        self.walker.set_speed(speed);
    }

    /// Advances this walker alone. Arrow wear still applies to the grid.
    pub fn advance(&mut self, timespan_ms: u32) {
        let mut events = Vec::new();
        self.advance_with_events(timespan_ms, &mut events);
    }

    /// Advances this walker alone and reports every arrow it wore down.
    ///
    /// Collisions and squares are not resolved; the next world tick does that.
    pub fn advance_with_events(&mut self, timespan_ms: u32, out_events: &mut Vec<Event>) {
        let mut worn: Vec<(Vector2i, Arrow)> = Vec::new();
        {
            let mut navigator = Navigator::new(&mut *self.grid, &mut worn);
            self.walker.advance_through(timespan_ms, &mut navigator);
        }
        grid::publish_worn(&mut worn, out_events);
    }

    /// Restores the walker to its placement state.
    pub fn reset(&mut self) {
        self.walker.reset();
    }
}

impl Deref for WalkerHandle<'_> {
    type Target = Walker;

    fn deref(&self) -> &Self::Target {
        self.walker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_walkers_face_north_at_origin() {
        let walker = Walker::mouse();
        assert_eq!(walker.position(), Vector2i::ZERO);
        assert_eq!(walker.direction(), Direction::North);
        assert_eq!(walker.state(), WalkerState::Alive);
        assert_eq!(walker.speed(), 3_000);
        assert_eq!(Walker::cat().speed(), 2_000);
    }

    #[test]
    fn speed_override_survives_kind_change() {
        let walker = Walker::mouse().with_speed(1_234).with_kind(WalkerKind::Cat);
        assert_eq!(walker.speed(), 1_234);
        assert_eq!(Walker::mouse().with_kind(WalkerKind::Cat).speed(), 2_000);
    }

    #[test]
    fn time_to_boundary_rounds_up() {
        let mut walker = Walker::mouse().with_speed(7);
        assert_eq!(walker.time_to_boundary(), Some(428_572));

        walker.advance(428_571);
        assert_eq!(walker.fraction(), 2_999_997);
        assert_eq!(walker.time_to_boundary(), Some(1));

        walker.set_direction(Direction::Invalid);
        assert_eq!(walker.time_to_boundary(), None);
    }

    #[test]
    fn stationary_walkers_never_report_a_boundary() {
        let walker = Walker::cat().with_speed(0);
        assert_eq!(walker.time_to_boundary(), None);
    }

    #[test]
    fn render_position_interpolates_along_heading() {
        let mut walker = Walker::mouse()
            .with_position(Vector2i::new(2, 2))
            .with_direction(Direction::West);
        walker.advance(500);
        assert_eq!(walker.render_position(), (1.5, 2.0));
    }

    #[test]
    fn advance_crosses_several_cells_in_one_call() {
        let mut walker = Walker::mouse()
            .with_position(Vector2i::new(1, 1))
            .with_direction(Direction::South);
        walker.advance_through(3_500, &mut OpenPlane);
        assert_eq!(walker.position(), Vector2i::new(1, 4));
        assert_eq!(walker.fraction(), 1_500_000);
    }

    #[test]
    fn reset_without_anchor_keeps_position() {
        let mut walker = Walker::mouse().with_position(Vector2i::new(4, 4));
        walker.advance(1_500);
        walker.set_state(WalkerState::Dead);
        walker.reset();
        assert_eq!(walker.position(), Vector2i::new(4, 3));
        assert_eq!(walker.fraction(), 0);
        assert!(walker.is_alive());
    }
}
