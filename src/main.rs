//! Callscope CLI - Compliance-Annotated Call Playback
//!
//! Command-line interface for replaying review sessions and inspecting call
//! records.

use clap::Parser;
use env_logger::Env;
use log::info;

use callscope::cli::{commands, Cli, Commands};
use callscope::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Callscope v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Callscope v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Replay { script } => commands::replay(&script),
        Commands::Layout {
            config,
            duration,
            zoom,
        } => commands::layout(&config, duration, zoom),
        Commands::Calls { file, status } => commands::calls(&file, status.as_deref()),
        Commands::CallRegions { file } => commands::call_regions(&file),
    }
}
