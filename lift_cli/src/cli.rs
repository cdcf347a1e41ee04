//! CLI argument definitions.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lift_cli", version, about = "Desk lift elevation CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/lift.toml")]
    pub config: PathBuf,

    /// Travel calibration CSV (strict header); overrides [calibration] in the config
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Emit one JSON result line on stdout and log as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to [logging].level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Move to a height: nearest preset, then a timed up/down nudge
    SetElevation {
        /// Target height in percent (0..=100)
        #[arg(long, allow_negative_numbers = true)]
        percent: i64,
    },
    /// Press one of the four memory presets
    SelectPreset {
        /// Preset number (1 = 0%, 2 = 33%, 3 = 66%, 4 = 100%)
        #[arg(long, allow_negative_numbers = true)]
        mode: i64,
    },
    /// Show the pulses set-elevation would issue, without moving
    Plan {
        /// Target height in percent (0..=100)
        #[arg(long, allow_negative_numbers = true)]
        percent: i64,
    },
    /// Report channel wiring and calibration
    SelfCheck {
        /// Also pulse every mapped channel in turn (the lift will move)
        #[arg(long, action = ArgAction::SetTrue)]
        walk: bool,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::SetElevation { .. } => "set-elevation",
            Commands::SelectPreset { .. } => "select-preset",
            Commands::Plan { .. } => "plan",
            Commands::SelfCheck { .. } => "self-check",
        }
    }
}
