//! Built-in levels the runner can play without a level loader.

use clap::ValueEnum;
use shoko_rocket_core::{
    ArrowWear, Command, Direction, LevelInfo, SquareType, Vector2i, WalkerSpawn,
};

/// Levels bundled with the command-line runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scenario {
    /// Two mice follow arrows up to a rocket.
    Corridor,
    /// A cat meets a mouse head-on.
    Ambush,
    /// A cat bounces between two arrows until both are worn out.
    Shredder,
}

impl Scenario {
    /// Display metadata for the level.
    pub(crate) fn level(self) -> LevelInfo {
        let name = match self {
            Self::Corridor => "Corridor",
            Self::Ambush => "Ambush",
            Self::Shredder => "Shredder",
        };
        LevelInfo {
            name: name.to_owned(),
            author: "Shoko Rocket".to_owned(),
        }
    }

    /// Commands that build the level on a fresh default world.
    pub(crate) fn commands(self) -> Vec<Command> {
        match self {
            Self::Corridor => vec![
                arrow(5, 4, Direction::North),
                arrow(5, 6, Direction::North),
                square(5, 1, SquareType::Rocket),
                mouse(1, 4, Direction::East),
                mouse(1, 6, Direction::East),
            ],
            Self::Ambush => vec![
                square(3, 7, SquareType::Rocket),
                mouse(1, 2, Direction::East),
                cat(9, 2, Direction::West),
            ],
            Self::Shredder => vec![
                arrow(2, 6, Direction::East),
                arrow(9, 6, Direction::West),
                square(10, 1, SquareType::Rocket),
                square(5, 8, SquareType::Hole),
                Command::SetWall {
                    cell: Vector2i::new(5, 6),
                    side: Direction::South,
                    present: true,
                },
                mouse(1, 1, Direction::East),
                cat(5, 6, Direction::East),
            ],
        }
    }
}

fn arrow(x: i32, y: i32, direction: Direction) -> Command {
    square(x, y, SquareType::arrow(direction, ArrowWear::Full))
}

fn square(x: i32, y: i32, square: SquareType) -> Command {
    Command::SetSquare {
        cell: Vector2i::new(x, y),
        square,
    }
}

fn mouse(x: i32, y: i32, direction: Direction) -> Command {
    Command::AddWalker {
        spawn: WalkerSpawn::mouse(Vector2i::new(x, y), direction),
    }
}

fn cat(x: i32, y: i32, direction: Direction) -> Command {
    Command::AddWalker {
        spawn: WalkerSpawn::cat(Vector2i::new(x, y), direction),
    }
}
