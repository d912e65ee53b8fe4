//! stagehand - build-and-launch sequencer for two-process desktop apps.

#![allow(dead_code)]

mod bundle;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod sequencer;
mod shell;
mod stage;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{AppConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(AppConfig::load(cli)?);

    match &cli.command {
        Commands::Build { .. } => cli::build::build_all(&config),
        Commands::Dev { .. } => cli::dev::run_dev(&config),
    }
}
