//! Kettle - a file-system routed web engine with hot reload.

mod actor;
mod cli;
mod compiler;
mod config;
mod context;
mod core;
mod embed;
mod logger;
mod reload;
mod render;
mod route;
mod sandbox;
mod sync;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = AppConfig::load(&cli)?;

    match &cli.command {
        Commands::Serve { .. } => cli::serve::serve(config),
        Commands::Routes { .. } => cli::routes::list_routes(&config),
    }
}
