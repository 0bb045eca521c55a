//! Tilt Maze headless runner
//!
//! Runs a demo session with the autopilot steering, logging wins as they
//! happen. See `tilt-maze --help` for options.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tilt_maze::autopilot::Autopilot;
use tilt_maze::sim::{ControlMode, GameEvent, MazeLayout};
use tilt_maze::{Session, Tuning};

/// Host frame rate the demo simulates
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Debug, Parser)]
#[command(name = "tilt-maze")]
#[command(about = "Run a headless tilt-maze demo driven by the autopilot")]
struct Options {
    /// Maze layout file (ASCII, or JSON rows of cell codes)
    #[arg(long)]
    maze: Option<PathBuf>,

    /// Tuning overrides (JSON)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Autopilot jitter seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn run(options: Options) -> tilt_maze::Result<()> {
    let layout = match &options.maze {
        Some(path) => MazeLayout::load(path)?,
        None => MazeLayout::reference(),
    };
    let tuning = match &options.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    log::info!("Maze:\n{layout}");

    let Some(mut pilot) = Autopilot::new(&layout, options.seed) else {
        log::warn!("Goal is unreachable from the start; nothing to demo");
        return Ok(());
    };

    let (mut session, input) = Session::start(layout.clone(), tuning, ControlMode::Tilt)?;
    let frames = (options.seconds / FRAME_DT).ceil() as u64;
    for _ in 0..frames {
        let controller = session.controller();
        let sample = pilot.steer(&layout, controller.ball_position(), controller.ball_velocity());
        input.send(sample)?;

        let snapshot = session.frame(FRAME_DT);
        for event in session.drain_events() {
            match event {
                GameEvent::Won { elapsed } => {
                    log::info!("Won at frame {} in {elapsed:.2}s", snapshot.frame)
                }
                GameEvent::Respawned => log::info!("Back at the start"),
                GameEvent::OutOfBounds => log::warn!("Ball left the maze"),
            }
        }
    }

    let summary = session.end();
    log::info!(
        "Demo finished: {} frames, {} win(s)",
        summary.frames,
        summary.wins
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Options::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let options = Options::try_parse_from(["tilt-maze"]).unwrap();
        assert!(options.maze.is_none());
        assert!(options.tuning.is_none());
        assert_eq!(options.seconds, 120.0);
        assert_eq!(options.seed, 1);
    }

    #[test]
    fn test_cli_flags() {
        let options = Options::try_parse_from([
            "tilt-maze",
            "--maze",
            "mazes/small.txt",
            "--seconds",
            "30",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(options.maze, Some(PathBuf::from("mazes/small.txt")));
        assert_eq!(options.seconds, 30.0);
        assert_eq!(options.seed, 9);
        assert!(Options::try_parse_from(["tilt-maze", "--seconds", "soon"]).is_err());
        assert!(Options::try_parse_from(["tilt-maze", "--bogus"]).is_err());
    }
}
