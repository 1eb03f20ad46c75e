//! Command line arguments for the application

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// inspect and play back drill files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// path to a drill file (JSON)
    pub drill: PathBuf,

    /// path to a settings file (JSON); defaults are used when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// display debug information
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// list keyframes, timings and labels
    Info,
    /// print every entity's pose at one moment
    At {
        /// seconds from the start of the drill
        #[arg(long)]
        time: f64,
        /// print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// print poses for every frame of the drill
    Play {
        #[arg(long, default_value_t = 10.0)]
        fps: f64,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// print the preview path of every entity leaving a keyframe
    Path {
        /// index of the keyframe the paths start at
        #[arg(long)]
        from: usize,
        /// polyline segments per path; the settings value when omitted
        #[arg(long)]
        samples: Option<usize>,
    },
}
