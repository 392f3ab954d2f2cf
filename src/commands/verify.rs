//! Verify command implementation

use std::path::Path;

use avrisp_core::session;

use crate::cli::TargetArgs;
use crate::commands;
use crate::commands::program::IndicatifProgress;

/// Run the verify command
pub fn run(target: &TargetArgs, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (chip, mut port, config) = commands::resolve_target(target)?;
    let image = commands::load_image(input, chip)?;

    println!(
        "Verifying {} byte(s) at 0x{:04X} against {}",
        image.padded_len(),
        image.base_address(),
        chip.name
    );

    let mut progress = IndicatifProgress::new();
    let report = session::verify(&mut *port, chip, &image, &config, &mut progress);
    drop(progress);

    commands::finish_report(&report)
}
