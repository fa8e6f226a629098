use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use shoko_rocket_core::{
    ArrowWear, Command, Direction, Event, SquareType, Vector2i, WalkerSpawn, WorldState,
};
use shoko_rocket_world::{self as world, query, World};

const TOTAL_MS: u32 = 24_000;

#[test]
fn replay_is_stable_between_runs() {
    let first = replay(&[1_000]);
    let second = replay(&[1_000]);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn replay_is_independent_of_tick_partitioning() {
    let reference = replay(&[TOTAL_MS]);

    for chunks in [&[16][..], &[1][..], &[333, 17, 1_250][..], &[7, 1_000, 2_999][..]] {
        let outcome = replay(chunks);
        assert_eq!(
            outcome, reference,
            "partitioning {chunks:?} changed the outcome"
        );
    }
}

#[test]
fn scripted_level_plays_out() {
    let outcome = replay(&[TOTAL_MS]);

    assert_eq!(outcome.state, WorldState::Failed);
    let gameplay: Vec<&EventRecord> = outcome
        .events
        .iter()
        .filter(|record| !matches!(record, EventRecord::Added { .. }))
        .collect();
    assert_eq!(
        gameplay,
        vec![
            &EventRecord::ArrowWorn {
                cell: Vector2i::new(9, 1),
                wear: ArrowWear::Half,
            },
            &EventRecord::Rescued {
                walker: 1,
                cell: Vector2i::new(6, 3),
            },
            &EventRecord::Killed {
                walker: 2,
                cell: Vector2i::new(0, 8),
            },
            &EventRecord::Failed,
        ]
    );
}

/// Runs the scripted level for `TOTAL_MS`, cycling through `chunks` as tick
/// lengths.
fn replay(chunks: &[u32]) -> ReplayOutcome {
    let mut world = World::new();
    let mut log = Vec::new();

    for command in scripted_level() {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        record_events(&events, &mut log);
    }

    let mut remaining = TOTAL_MS;
    for &chunk in chunks.iter().cycle() {
        if remaining == 0 {
            break;
        }
        let timespan_ms = chunk.min(remaining);
        remaining -= timespan_ms;

        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { timespan_ms }, &mut events);
        record_events(&events, &mut log);
    }

    ReplayOutcome {
        walkers: query::walker_view(&world).into_vec(),
        state: world.state(),
        events: log,
    }
}

fn record_events(events: &[Event], log: &mut Vec<EventRecord>) {
    log.extend(events.iter().filter_map(EventRecord::from_event));
}

fn scripted_level() -> Vec<Command> {
    let arrow = |x, y, direction| Command::SetSquare {
        cell: Vector2i::new(x, y),
        square: SquareType::arrow(direction, ArrowWear::Full),
    };

    vec![
        arrow(3, 1, Direction::South),
        arrow(3, 6, Direction::East),
        arrow(9, 6, Direction::North),
        arrow(9, 1, Direction::West),
        Command::SetSquare {
            cell: Vector2i::new(6, 3),
            square: SquareType::Rocket,
        },
        Command::SetSquare {
            cell: Vector2i::new(0, 8),
            square: SquareType::Hole,
        },
        Command::SetWall {
            cell: Vector2i::new(6, 4),
            side: Direction::East,
            present: true,
        },
        Command::AddWalker {
            spawn: WalkerSpawn::mouse(Vector2i::new(0, 1), Direction::East),
        },
        Command::AddWalker {
            spawn: WalkerSpawn::mouse(Vector2i::new(6, 0), Direction::South),
        },
        Command::AddWalker {
            spawn: WalkerSpawn::mouse(Vector2i::new(0, 4), Direction::South),
        },
        Command::AddWalker {
            spawn: WalkerSpawn::cat(Vector2i::new(7, 1), Direction::East),
        },
        Command::AddWalker {
            spawn: WalkerSpawn {
                speed: Some(2_500),
                ..WalkerSpawn::cat(Vector2i::new(11, 8), Direction::North)
            },
        },
    ]
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    walkers: Vec<query::WalkerSnapshot>,
    state: WorldState,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// Gameplay events with tick bookkeeping stripped, so runs with different
/// tick lengths can be compared.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    Added {
        walker: u32,
    },
    Rescued {
        walker: u32,
        cell: Vector2i,
    },
    Killed {
        walker: u32,
        cell: Vector2i,
    },
    ArrowWorn {
        cell: Vector2i,
        wear: ArrowWear,
    },
    Failed,
}

impl EventRecord {
    fn from_event(event: &Event) -> Option<Self> {
        let record = match event {
            Event::WalkerAdded { walker, .. } => Self::Added {
                walker: walker.get(),
            },
            Event::MouseRescued { walker, cell } => Self::Rescued {
                walker: walker.get(),
                cell: *cell,
            },
            Event::MouseKilled { walker, cell, .. } | Event::CatKilled { walker, cell, .. } => {
                Self::Killed {
                    walker: walker.get(),
                    cell: *cell,
                }
            }
            Event::ArrowWorn { cell, arrow } => Self::ArrowWorn {
                cell: *cell,
                wear: arrow.wear(),
            },
            Event::WorldFailed => Self::Failed,
            _ => return None,
        };
        Some(record)
    }
}
