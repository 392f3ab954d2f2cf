//! Erase command implementation

use avrisp_core::session;

use crate::cli::TargetArgs;
use crate::commands;

/// Run the erase command
pub fn run(target: &TargetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (chip, mut port, config) = commands::resolve_target(target)?;

    println!("Erasing {}", chip.name);
    let report = session::erase_chip(&mut *port, chip, &config);

    commands::finish_report(&report)
}
