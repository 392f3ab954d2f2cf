//! Probe command implementation

use avrisp_core::session;

use crate::cli::TargetArgs;
use crate::commands;

/// Run the probe command
pub fn run(target: &TargetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (chip, mut port, config) = commands::resolve_target(target)?;

    println!("Probing for {}", chip.name);
    let report = session::probe(&mut *port, chip, &config);

    if let Some(fuses) = report.fuses {
        println!("Low fuse:  0x{:02X}", fuses.low);
        println!("High fuse: 0x{:02X}", fuses.high);
        println!("Lock bits: 0x{:02X}", fuses.lock);
    }

    if let Some(matches) = report.signature_matches {
        if matches {
            println!("Device matches {}", chip.name);
        } else {
            println!(
                "Device does NOT match {} (expected {:02X} {:02X} {:02X})",
                chip.name, chip.signature[0], chip.signature[1], chip.signature[2]
            );
        }
    }

    commands::finish_report(&report)
}
