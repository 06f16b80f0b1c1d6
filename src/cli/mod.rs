//! CLI Module
//!
//! Command-line interface for replaying review sessions and inspecting call
//! records.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Callscope - compliance-annotated call playback
#[derive(Parser, Debug)]
#[command(name = "callscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scripted session and print the report
    #[command(name = "replay")]
    Replay {
        /// Path to the replay script (JSON)
        script: PathBuf,
    },

    /// Print the pixel layout of a configuration's regions
    #[command(name = "layout")]
    Layout {
        /// Path to the controller configuration (JSON)
        config: PathBuf,

        /// Audio duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Zoom in pixels per second (defaults to the fitted zoom)
        #[arg(short, long)]
        zoom: Option<f64>,
    },

    /// List calls, newest first
    #[command(name = "calls")]
    Calls {
        /// Path to the call list (JSON array)
        file: PathBuf,

        /// Only show calls with this status, e.g. "pending-review"
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Print review regions derived from a call's flagged transcript
    #[command(name = "call-regions")]
    CallRegions {
        /// Path to the call detail record (JSON)
        file: PathBuf,
    },
}
