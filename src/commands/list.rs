//! List commands implementation

use avrisp_core::chip;

use crate::programmers;

/// List programmer port backends enabled at compile time
pub fn run_programmers() {
    println!("Supported programmers:");
    for info in programmers::available_programmers() {
        println!("  {:<12} {}", info.name, info.description);
    }
}

/// List known chip descriptors
pub fn run_chips() {
    println!("Supported chips:");
    println!(
        "  {:<12} {:<12} {:>8} {:>6}",
        "Name", "Signature", "Flash", "Page"
    );
    for chip in chip::CHIPS {
        println!(
            "  {:<12} {:02X} {:02X} {:02X}     {:>8} {:>6}",
            chip.name,
            chip.signature[0],
            chip.signature[1],
            chip.signature[2],
            chip.flash_size,
            chip.page_size
        );
    }
}
