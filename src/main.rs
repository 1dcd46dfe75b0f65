//! # Forecast Periods Application Entry Point
//!
//! Loads the model runs and configuration, mounts the terminal map, and runs
//! a line-oriented event loop on stdin. Each line is one user interaction
//! (map click, key press, period or run choice); the canvas is printed after
//! every interaction.
//!
//! Usage: `forecast-periods <runs.json> [forecast-config.toml]`

// Test modules
#[cfg(test)]
mod tests;

mod commands;

use anyhow::Context;
use chrono::Utc;
use commands::{apply, parse_command, Command, HELP};
use forecast_periods_lib::app::AppController;
use forecast_periods_lib::renderer::{FrameBuffer, FrameRenderer};
use forecast_periods_lib::{config::Config, metadata, terminal::TerminalMap};
use log::{error, info};
use std::env;
use std::io::{self, BufRead};

fn print_canvas(app: &AppController<FrameBuffer>) {
    println!("{}", app.canvas().to_ascii());
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let runs_path = args
        .first()
        .context("usage: forecast-periods <runs.json> [forecast-config.toml]")?;

    let config = match args.get(1) {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let policy = config
        .selection_policy()
        .context("invalid period configuration")?;
    let (width, height) = config
        .display_size()
        .context("invalid display configuration")?;
    let runs = metadata::load_runs(runs_path)
        .with_context(|| format!("failed to load forecast runs from {runs_path}"))?;

    let mut map = TerminalMap::new(width, height);
    let mut app = AppController::new(
        runs,
        &mut map,
        Box::new(FrameRenderer::new()),
        policy,
        Utc::now,
    )?;
    print_canvas(&app);
    eprintln!("{HELP}");

    for line in io::stdin().lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(err) = apply(&mut app, command) {
                    error!("{err}");
                    eprintln!("{err}");
                }
                print_canvas(&app);
            }
            Err(message) => eprintln!("{message}"),
        }
    }

    info!("bye");
    Ok(())
}
