//! Toroidal wall topology and special-square layout.

use log::debug;
use shoko_rocket_core::{Arrow, ArrowWear, Direction, Event, SquareType, Vector2i, WalkerKind};

use crate::{walker::Terrain, WorldError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
struct WallFlags {
    north: bool,
    west: bool,
}

/// Wall and square layout of a world.
///
/// Only the north and west edge of every cell is stored; the south and east
/// edges are the north and west edges of the neighbouring cell. Every
/// coordinate is folded onto the torus before use, so cell `(-1, y)` is cell
/// `(width - 1, y)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: u32,
    height: u32,
    walls: Vec<WallFlags>,
    squares: Vec<SquareType>,
}

impl Grid {
    /// Creates a grid without any walls or special squares.
    pub fn open(width: u32, height: u32) -> Result<Self, WorldError> {
        let too_large = i32::try_from(width).is_err() || i32::try_from(height).is_err();
        if width == 0 || height == 0 || too_large {
            return Err(WorldError::InvalidDimensions { width, height });
        }

        let cells_u64 = u64::from(width) * u64::from(height);
        let cells = usize::try_from(cells_u64)
            .map_err(|_| WorldError::InvalidDimensions { width, height })?;
        Ok(Self {
            width,
            height,
            walls: vec![WallFlags::default(); cells],
            squares: vec![SquareType::Empty; cells],
        })
    }

    /// Creates a grid whose wraparound seam is walled off on both axes.
    pub fn bounded(width: u32, height: u32) -> Result<Self, WorldError> {
        let mut grid = Self::open(width, height)?;
        grid.wall_seam();
        Ok(grid)
    }

    fn wall_seam(&mut self) {
        for x in 0..self.width_i32() {
            self.set_north(Vector2i::new(x, 0), true);
        }
        for y in 0..self.height_i32() {
            self.set_west(Vector2i::new(0, y), true);
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn width_i32(&self) -> i32 {
        // Dimensions are validated to fit in `i32` on construction.
        self.width as i32
    }

    fn height_i32(&self) -> i32 {
        self.height as i32
    }

    /// Reports whether the coordinate names a cell without wrapping.
    #[must_use]
    pub fn contains(&self, cell: Vector2i) -> bool {
        (0..self.width_i32()).contains(&cell.x()) && (0..self.height_i32()).contains(&cell.y())
    }

    /// Folds an arbitrary coordinate onto the torus.
    #[must_use]
    pub fn wrap(&self, cell: Vector2i) -> Vector2i {
        Vector2i::new(
            cell.x().rem_euclid(self.width_i32()),
            cell.y().rem_euclid(self.height_i32()),
        )
    }

    fn index(&self, cell: Vector2i) -> usize {
        let cell = self.wrap(cell);
        // Both components are non-negative after wrapping.
        cell.y() as usize * self.width as usize + cell.x() as usize
    }

    /// Wall on the north edge of the cell.
    #[must_use]
    pub fn north(&self, cell: Vector2i) -> bool {
        self.walls[self.index(cell)].north
    }

    /// Wall on the south edge of the cell.
    #[must_use]
    pub fn south(&self, cell: Vector2i) -> bool {
        self.north(cell.step(Direction::South))
    }

    /// Wall on the west edge of the cell.
    #[must_use]
    pub fn west(&self, cell: Vector2i) -> bool {
        self.walls[self.index(cell)].west
    }

    /// Wall on the east edge of the cell.
    #[must_use]
    pub fn east(&self, cell: Vector2i) -> bool {
        self.west(cell.step(Direction::East))
    }

    /// Wall on the given side of the cell. [`Direction::Invalid`] is always blocked.
    #[must_use]
    pub fn wall(&self, cell: Vector2i, side: Direction) -> bool {
        match side {
            Direction::North => self.north(cell),
            Direction::East => self.east(cell),
            Direction::South => self.south(cell),
            Direction::West => self.west(cell),
            Direction::Invalid => true,
        }
    }

    /// Sets the wall on the north edge of the cell.
    pub fn set_north(&mut self, cell: Vector2i, present: bool) {
        let index = self.index(cell);
        self.walls[index].north = present;
    }

    /// Sets the wall on the south edge of the cell.
    pub fn set_south(&mut self, cell: Vector2i, present: bool) {
        self.set_north(cell.step(Direction::South), present);
    }

    /// Sets the wall on the west edge of the cell.
    pub fn set_west(&mut self, cell: Vector2i, present: bool) {
        let index = self.index(cell);
        self.walls[index].west = present;
    }

    /// Sets the wall on the east edge of the cell.
    pub fn set_east(&mut self, cell: Vector2i, present: bool) {
        self.set_west(cell.step(Direction::East), present);
    }

    /// Sets the wall on the given side of the cell. [`Direction::Invalid`] is ignored.
    pub fn set_wall(&mut self, cell: Vector2i, side: Direction, present: bool) {
        match side {
            Direction::North => self.set_north(cell, present),
            Direction::East => self.set_east(cell, present),
            Direction::South => self.set_south(cell, present),
            Direction::West => self.set_west(cell, present),
            Direction::Invalid => {}
        }
    }

    /// Content of the cell, including arrow wear.
    #[must_use]
    pub fn square(&self, cell: Vector2i) -> SquareType {
        self.squares[self.index(cell)]
    }

    /// Replaces the content of the cell.
    pub fn set_square(&mut self, cell: Vector2i, square: SquareType) {
        let index = self.index(cell);
        self.squares[index] = square;
    }

    /// Turns the cell into a hole.
    pub fn set_hole(&mut self, cell: Vector2i) {
        self.set_square(cell, SquareType::Hole);
    }

    /// Turns the cell into a rocket.
    pub fn set_rocket(&mut self, cell: Vector2i) {
        self.set_square(cell, SquareType::Rocket);
    }

    /// Places a fresh arrow in the cell.
    pub fn set_arrow(&mut self, cell: Vector2i, direction: Direction) {
        self.set_square(cell, SquareType::arrow(direction, ArrowWear::Full));
    }

    /// Removes any special content from the cell.
    pub fn clear_square(&mut self, cell: Vector2i) {
        self.set_square(cell, SquareType::Empty);
    }

    /// Heading a walker takes when facing `heading` inside `cell`.
    ///
    /// Straight on is kept when open, then a right turn, then a left turn,
    /// then a reversal. A fully enclosed cell yields [`Direction::Invalid`].
    #[must_use]
    pub fn resolve_heading(&self, cell: Vector2i, heading: Direction) -> Direction {
        if !heading.is_valid() {
            return Direction::Invalid;
        }

        [
            heading,
            heading.clockwise(),
            heading.counter_clockwise(),
            heading.opposite(),
        ]
        .into_iter()
        .find(|candidate| !self.wall(cell, *candidate))
        .unwrap_or(Direction::Invalid)
    }

    pub(crate) fn restore_arrows(&mut self) {
        for square in &mut self.squares {
            if let SquareType::Arrow(arrow) = square {
                *arrow = arrow.restored();
            }
        }
    }
}

/// Grid-bound terrain used while advancing walkers that belong to a world.
///
/// Arrows damaged along the way are recorded in `worn` so the caller can
/// publish them.
pub(crate) struct Navigator<'a> {
    grid: &'a mut Grid,
    worn: &'a mut Vec<(Vector2i, Arrow)>,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(grid: &'a mut Grid, worn: &'a mut Vec<(Vector2i, Arrow)>) -> Self {
        Self { grid, worn }
    }
}

/// Empties `worn` into `ArrowWorn` events.
pub(crate) fn publish_worn(worn: &mut Vec<(Vector2i, Arrow)>, out_events: &mut Vec<Event>) {
    for (cell, arrow) in worn.drain(..) {
        debug!("arrow at {cell:?} worn to {:?}", arrow.wear());
        out_events.push(Event::ArrowWorn { cell, arrow });
    }
}

impl Terrain for Navigator<'_> {
    fn enter(
        &mut self,
        kind: WalkerKind,
        from: Vector2i,
        heading: Direction,
    ) -> (Vector2i, Direction) {
        // A wall may have been raised in front of the walker since it last turned.
        if self.grid.wall(from, heading) {
            return (from, self.grid.resolve_heading(from, heading));
        }

        let position = self.grid.wrap(from.step(heading));
        let mut heading = heading;
        if let SquareType::Arrow(arrow) = self.grid.square(position) {
            if let Some(redirect) = arrow.redirect() {
                if kind == WalkerKind::Cat && redirect == heading.opposite() {
                    let worn = arrow.worn();
                    self.grid.set_square(position, SquareType::Arrow(worn));
                    self.worn.push((position, worn));
                }
                heading = redirect;
            }
        }

        (position, self.grid.resolve_heading(position, heading))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_dimensions() {
        assert_eq!(
            Grid::open(0, 4),
            Err(WorldError::InvalidDimensions {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn opposite_edges_share_walls_across_the_seam() {
        let mut grid = Grid::open(5, 4).expect("grid");
        grid.set_east(Vector2i::new(4, 2), true);
        assert!(grid.west(Vector2i::new(0, 2)));

        grid.set_south(Vector2i::new(1, 3), true);
        assert!(grid.north(Vector2i::new(1, 0)));
        assert!(!grid.north(Vector2i::new(1, 1)));
    }

    #[test]
    fn bounded_grid_walls_the_seam_only() {
        let grid = Grid::bounded(12, 9).expect("grid");
        assert!(grid.north(Vector2i::new(3, 0)));
        assert!(grid.south(Vector2i::new(3, 8)));
        assert!(grid.west(Vector2i::new(0, 4)));
        assert!(grid.east(Vector2i::new(11, 4)));
        assert!(!grid.east(Vector2i::new(5, 4)));
        assert!(!grid.north(Vector2i::new(5, 4)));
    }

    #[test]
    fn wrap_folds_negative_coordinates() {
        let grid = Grid::open(12, 9).expect("grid");
        assert_eq!(grid.wrap(Vector2i::new(-1, -1)), Vector2i::new(11, 8));
        assert_eq!(grid.wrap(Vector2i::new(12, 9)), Vector2i::new(0, 0));
        assert!(!grid.contains(Vector2i::new(12, 0)));
        assert!(grid.contains(Vector2i::new(11, 8)));
    }

    #[test]
    fn squares_are_mutually_exclusive() {
        let mut grid = Grid::open(4, 4).expect("grid");
        let cell = Vector2i::new(2, 2);
        grid.set_hole(cell);
        grid.set_arrow(cell, Direction::East);
        assert_eq!(
            grid.square(cell),
            SquareType::arrow(Direction::East, ArrowWear::Full)
        );
        grid.set_rocket(cell);
        assert_eq!(grid.square(cell), SquareType::Rocket);
        grid.clear_square(cell);
        assert_eq!(grid.square(cell), SquareType::Empty);
    }

    #[test]
    fn heading_prefers_straight_then_right_then_left() {
        let mut grid = Grid::open(4, 4).expect("grid");
        let cell = Vector2i::new(1, 1);
        assert_eq!(grid.resolve_heading(cell, Direction::North), Direction::North);

        grid.set_north(cell, true);
        assert_eq!(grid.resolve_heading(cell, Direction::North), Direction::East);

        grid.set_east(cell, true);
        assert_eq!(grid.resolve_heading(cell, Direction::North), Direction::West);

        grid.set_west(cell, true);
        assert_eq!(grid.resolve_heading(cell, Direction::North), Direction::South);

        grid.set_south(cell, true);
        assert_eq!(grid.resolve_heading(cell, Direction::North), Direction::Invalid);
    }

    #[test]
    fn restoring_arrows_keeps_layout() {
        let mut grid = Grid::open(4, 4).expect("grid");
        let cell = Vector2i::new(0, 3);
        grid.set_square(cell, SquareType::arrow(Direction::West, ArrowWear::Destroyed));
        grid.set_hole(Vector2i::new(1, 3));
        grid.restore_arrows();
        assert_eq!(
            grid.square(cell),
            SquareType::arrow(Direction::West, ArrowWear::Full)
        );
        assert_eq!(grid.square(Vector2i::new(1, 3)), SquareType::Hole);
    }

    #[test]
    fn only_cats_running_against_an_arrow_wear_it() {
        let mut grid = Grid::open(6, 1).expect("grid");
        let arrow_cell = Vector2i::new(2, 0);
        grid.set_arrow(arrow_cell, Direction::West);
        let mut worn = Vec::new();

        let mut navigator = Navigator::new(&mut grid, &mut worn);
        let entry = navigator.enter(WalkerKind::Mouse, Vector2i::new(1, 0), Direction::East);
        assert_eq!(entry, (arrow_cell, Direction::West));
        let entry = navigator.enter(WalkerKind::Cat, Vector2i::new(3, 0), Direction::West);
        assert_eq!(entry, (arrow_cell, Direction::West));
        let entry = navigator.enter(WalkerKind::Cat, Vector2i::new(1, 0), Direction::East);
        assert_eq!(entry, (arrow_cell, Direction::West));

        assert_eq!(
            worn,
            vec![(arrow_cell, Arrow::new(Direction::West, ArrowWear::Half))]
        );
        assert_eq!(
            grid.square(arrow_cell),
            SquareType::arrow(Direction::West, ArrowWear::Half)
        );
    }
}
