#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads, runs, and normalises billiard ball scenes.

mod session;
mod settings;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use bbcs_core::StepReport;
use bbcs_world::{query, World};
use clap::{Parser, Subcommand};

use crate::{
    session::{Outcome, Session},
    settings::Settings,
};

/// Billiard ball computer simulator.
#[derive(Debug, Parser)]
#[command(name = "bbcs", version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs a scene for a number of ticks and prints the ball states.
    Run {
        /// Scene file to load.
        scene: PathBuf,
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 8)]
        steps: u64,
        /// Print every ball move as it is committed.
        #[arg(long)]
        trace: bool,
        /// Optional TOML file with clock settings.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validates a scene and prints its entity counts.
    Check {
        /// Scene file to validate.
        scene: PathBuf,
    },
    /// Prints the canonical serialisation of a scene.
    Normalize {
        /// Scene file to normalise.
        scene: PathBuf,
    },
}

/// Entry point for the simulator command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Run {
            scene,
            steps,
            trace,
            config,
        } => {
            let settings = match config {
                Some(path) => Settings::load(&path)?,
                None => Settings::default(),
            };
            let world = load_scene(&scene)?;
            run(world, &settings, steps, trace)
        }
        CliCommand::Check { scene } => {
            let world = load_scene(&scene)?;
            println!("balls: {}", query::ball_view(&world).len());
            println!("walls: {}", query::walls(&world).count());
            println!("texts: {}", query::annotations(&world).len());
            println!("lines: {}", query::connectors(&world).len());
            Ok(())
        }
        CliCommand::Normalize { scene } => {
            let world = load_scene(&scene)?;
            println!("{}", bbcs_scene::serialize(&world));
            Ok(())
        }
    }
}

fn load_scene(path: &Path) -> Result<World> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene at {}", path.display()))?;
    bbcs_scene::deserialize(&contents)
        .with_context(|| format!("failed to load scene {}", path.display()))
}

fn run(world: World, settings: &Settings, steps: u64, trace: bool) -> Result<()> {
    let mut session = Session::new(world, settings);
    let outcome = session.run(steps, |report| {
        if trace {
            print_report(report);
        }
    });

    println!("step {}", query::step_index(session.world()));
    for ball in query::ball_view(session.world()).iter() {
        println!("{} {} {}", ball.id, ball.position, ball.direction);
    }

    match outcome {
        Outcome::Completed { steps } => {
            log::info!("completed {steps} steps");
            Ok(())
        }
        Outcome::Rejected { index, error } => bail!("illegal move on step {index}: {error}"),
    }
}

fn print_report(report: &StepReport) {
    for entry in &report.moves {
        match entry.deflected_by {
            Some(edge) => println!(
                "step {}: {} {} -> {} {} (deflected by {edge})",
                report.index, entry.ball, entry.from, entry.to, entry.direction
            ),
            None => println!(
                "step {}: {} {} -> {} {}",
                report.index, entry.ball, entry.from, entry.to, entry.direction
            ),
        }
    }
}
