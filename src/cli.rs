// Command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::messages::{Joint, Motion};

#[derive(Debug, Parser)]
#[command(
    name = "quadbot-runtime",
    version,
    about = "Drive, arm and camera control for a four-wheel GPIO robot"
)]
pub struct Cli {
    /// JSON config file (pins, timings, camera); defaults are used for missing fields
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log hardware commands instead of driving GPIO
    #[arg(long, global = true)]
    pub simulate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Forward, backward, left, right, stop, then arm initialization and a few joint moves
    Demo,

    /// Drive one canonical movement
    Drive {
        #[arg(value_enum)]
        motion: Motion,
        #[arg(long, short)]
        ticks: Option<u32>,
    },

    /// Drive with one raw direction (1, 0, -1) per motor
    DriveRaw {
        #[arg(num_args = 4, required = true, allow_negative_numbers = true)]
        directions: Vec<i64>,
        #[arg(long, short)]
        ticks: Option<u32>,
    },

    /// Stop all motors
    Stop,

    /// Set one joint angle in degrees
    Arm {
        #[arg(value_enum)]
        joint: Joint,
        #[arg(allow_negative_numbers = true)]
        angle: i32,
    },

    /// Set every joint to 0 degrees
    ArmInit,

    /// Capture one frame to the given path
    Capture { path: PathBuf },

    /// Print the tick schedule of a movement as JSON without touching hardware
    Plan {
        #[arg(value_enum)]
        motion: Motion,
        #[arg(long, short)]
        ticks: Option<u32>,
    },
}
