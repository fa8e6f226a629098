#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Shoko Rocket levels headlessly.

mod report;
mod scenarios;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, trace, LevelFilter};
use shoko_rocket_core::{Command, Event};
use shoko_rocket_system_analytics::Analytics;
use shoko_rocket_world::{self as world, query, World};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::{report::RunReport, scenarios::Scenario};

/// Plays a built-in level and reports how it went.
#[derive(Debug, Parser)]
#[command(name = "shoko-rocket", version, about)]
struct CliArgs {
    /// Level to play.
    #[arg(short, long, value_enum, default_value_t = Scenario::Corridor)]
    scenario: Scenario,

    /// Total simulated time in milliseconds.
    #[arg(short, long, default_value_t = 20_000)]
    duration_ms: u32,

    /// Length of each tick in milliseconds.
    #[arg(
        short,
        long,
        default_value_t = 16,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    chunk_ms: u32,

    /// Keep ticking after the last mouse has left the board.
    #[arg(long)]
    full: bool,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl CliArgs {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Entry point for the Shoko Rocket command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    TermLogger::init(
        args.log_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to install terminal logger")?;

    let report = play(&args)?;
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{json}");
    } else {
        print!("{report}");
    }
    Ok(())
}

fn play(args: &CliArgs) -> Result<RunReport> {
    let mut world = World::new();
    let mut analytics = Analytics::new();
    world.set_level(args.scenario.level());
    info!("loading {:?}", args.scenario);

    for command in args.scenario.commands() {
        let events = execute(&mut world, &mut analytics, command);
        if let Some(Event::PlacementRejected { kind, position, .. }) = events
            .iter()
            .find(|event| matches!(event, Event::PlacementRejected { .. }))
        {
            bail!(
                "{:?} places a {kind:?} outside the grid at {position:?}",
                args.scenario
            );
        }
    }

    let mut remaining = args.duration_ms;
    while remaining > 0 {
        let timespan_ms = args.chunk_ms.min(remaining);
        remaining -= timespan_ms;
        let _ = execute(&mut world, &mut analytics, Command::Tick { timespan_ms });

        if !args.full && query::live_mice(&world).is_empty() {
            info!("no mice left on the board after {}ms", world.elapsed_ms());
            break;
        }
    }

    Ok(RunReport::capture(&world, analytics.tally()))
}

fn execute(world: &mut World, analytics: &mut Analytics, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    analytics.handle(&events);
    for event in &events {
        log_event(event);
    }
    events
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { timespan_ms } => trace!("tick {timespan_ms}ms"),
        Event::WalkerAdded {
            walker,
            kind,
            position,
        } => debug!("{kind:?} #{} placed at {position:?}", walker.get()),
        Event::MouseRescued { walker, cell } => {
            info!("mouse #{} escaped on the rocket at {cell:?}", walker.get());
        }
        Event::MouseKilled {
            walker,
            cell,
            cause,
        } => info!("mouse #{} lost at {cell:?} ({cause:?})", walker.get()),
        Event::CatKilled {
            walker,
            cell,
            cause,
        } => info!("cat #{} lost at {cell:?} ({cause:?})", walker.get()),
        Event::ArrowWorn { cell, arrow } => {
            debug!("arrow at {cell:?} now {:?}", arrow.wear());
        }
        Event::WorldFailed => info!("level failed"),
        Event::GridConfigured { width, height } => debug!("grid is {width}x{height}"),
        Event::WorldReset => debug!("level reset"),
        Event::PlacementRejected { .. } => {}
    }
}
