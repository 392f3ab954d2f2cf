//! CLI argument parsing

use crate::programmers;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate dynamic help text for the programmer argument
fn programmer_help() -> String {
    format!(
        "Programmer port to use [available: {}]",
        programmers::programmer_names_short()
    )
}

#[derive(Parser)]
#[command(name = "avrisp")]
#[command(author, version, about = "Bit-banged AVR ISP programmer", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Target options shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct TargetArgs {
    /// Programmer port to use
    #[arg(short, long, help = programmer_help())]
    pub programmer: String,

    /// Target chip name
    #[arg(short, long, default_value = "attiny13")]
    pub chip: String,

    /// Fail the session if the device signature does not match the chip
    #[arg(long)]
    pub strict_signature: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Program a firmware image into flash and verify it
    Program {
        #[command(flatten)]
        target: TargetArgs,

        /// Intel HEX firmware image
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Enter programming mode and read the device signature
    Probe {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Erase the whole flash
    Erase {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Verify flash contents against a firmware image without writing
    Verify {
        #[command(flatten)]
        target: TargetArgs,

        /// Intel HEX firmware image to compare against
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List supported programmer ports
    ListProgrammers,

    /// List supported chips
    ListChips,
}
