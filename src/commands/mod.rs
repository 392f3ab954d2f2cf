//! Command implementations

pub mod erase;
pub mod list;
pub mod probe;
pub mod program;
pub mod verify;

use std::fs;
use std::path::Path;

use avrisp_core::chip::{self, AvrChip};
use avrisp_core::image::FirmwareImage;
use avrisp_core::programmer::IspPort;
use avrisp_core::session::{SessionConfig, SessionReport};

use crate::cli::TargetArgs;
use crate::hex;
use crate::programmers;

/// Resolve the shared target arguments into a chip, an open port and a
/// session configuration
pub fn resolve_target(
    target: &TargetArgs,
) -> Result<(&'static AvrChip, Box<dyn IspPort + Send>, SessionConfig), Box<dyn std::error::Error>>
{
    let chip = chip::find(&target.chip).ok_or_else(|| {
        let names: Vec<&str> = chip::CHIPS.iter().map(|c| c.name).collect();
        format!(
            "unknown chip '{}' (supported: {})",
            target.chip,
            names.join(", ")
        )
    })?;

    let port = programmers::open_port(&target.programmer)?;

    let config = SessionConfig {
        strict_signature: target.strict_signature,
        ..SessionConfig::default()
    };

    Ok((chip, port, config))
}

/// Read an Intel HEX file and turn it into a page-aligned firmware image
///
/// HEX records may start anywhere; the image base is rounded down to the
/// containing page boundary and the gap filled with 0xFF.
pub fn load_image(path: &Path, chip: &AvrChip) -> Result<FirmwareImage, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let parsed = hex::parse(&text)?;

    let aligned_base = parsed.base - parsed.base % chip.page_size;
    let mut bytes = vec![0xFF; (parsed.base - aligned_base) as usize];
    bytes.extend_from_slice(&parsed.data);

    let image = FirmwareImage::new(bytes, aligned_base, chip.page_size)?;
    image.check_fits(chip)?;

    log::info!(
        "loaded {}: {} bytes at 0x{:04X} ({} page(s))",
        path.display(),
        image.len(),
        image.base_address(),
        image.page_count()
    );
    Ok(image)
}

/// Print the report and convert it to a process-level result
pub fn finish_report(report: &SessionReport) -> Result<(), Box<dyn std::error::Error>> {
    if let Some([s0, s1, s2]) = report.signature {
        println!("Signature: {:02X} {:02X} {:02X}", s0, s1, s2);
    }
    println!("{}", report.summary());

    if report.success() {
        Ok(())
    } else {
        for m in report.mismatches.iter().take(20) {
            println!(
                "  mismatch at 0x{:04X}: expected 0x{:02X}, read 0x{:02X}",
                m.address, m.expected, m.actual
            );
        }
        if report.mismatches.len() > 20 {
            println!("  ... {} more", report.mismatches.len() - 20);
        }
        Err(report.summary().into())
    }
}
