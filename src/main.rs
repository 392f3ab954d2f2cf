//! avrisp - a bit-banged AVR in-system programmer
//!
//! Talks the AVR serial programming protocol over four GPIO lines
//! (SCK, MOSI, MISO, RESET) to write, verify and erase the flash of
//! small AVR parts such as the ATtiny13.
//!
//! Programmer ports are pluggable: a Linux GPIO character-device
//! backend drives real hardware, and an in-memory dummy target lets
//! the whole pipeline run without wires.

mod cli;
mod commands;
mod hex;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let result = match &cli.command {
        Commands::Program { target, input } => commands::program::run(target, input),
        Commands::Probe { target } => commands::probe::run(target),
        Commands::Erase { target } => commands::erase::run(target),
        Commands::Verify { target, input } => commands::verify::run(target, input),
        Commands::ListProgrammers => {
            commands::list::run_programmers();
            Ok(())
        }
        Commands::ListChips => {
            commands::list::run_chips();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
